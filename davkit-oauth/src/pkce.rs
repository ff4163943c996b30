//! PKCE code verifier and challenge generation (RFC 7636).

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A fresh verifier/challenge pair for one authorization attempt.
///
/// Never persisted; the verifier is sent only to the token endpoint.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    pub fn generate() -> Self {
        let verifier = generate_verifier();
        let challenge = derive_challenge(&verifier);
        PkceChallenge {
            verifier,
            challenge,
        }
    }
}

/// Generate a 128-character code verifier from 768 bits of CSPRNG entropy.
///
/// base64url output stays within the unreserved set `[A-Za-z0-9-._~]` that
/// token endpoints accept.
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; 96];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of the verifier, base64url-encoded without padding.
pub fn derive_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_length_and_charset() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), 128);
        assert!(
            verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-._~".contains(c))
        );
    }

    #[test]
    fn test_verifiers_are_unique() {
        assert_ne!(generate_verifier(), generate_verifier());
    }

    #[test]
    fn test_challenge_matches_rfc7636_vector() {
        // RFC 7636 appendix B.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            derive_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_challenge_is_deterministic() {
        let pair = PkceChallenge::generate();
        assert_eq!(derive_challenge(&pair.verifier), pair.challenge);
    }
}
