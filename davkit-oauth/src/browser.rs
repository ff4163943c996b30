//! Opening the authorization URL in the user's browser.

use crate::error::OAuthError;

/// Ask the OS default handler to open `url`.
///
/// A failure here never aborts an authorization attempt; the URL is always
/// printed so the user can navigate manually while the listener keeps
/// waiting.
pub fn open_in_browser(url: &str) -> Result<(), OAuthError> {
    open::that(url).map_err(|err| OAuthError::Browser(err.to_string()))
}
