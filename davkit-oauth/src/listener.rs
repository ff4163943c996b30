//! Ephemeral HTTP listener that catches the OAuth redirect.
//!
//! One listener serves exactly one authorization attempt: the first request
//! carrying `code` or `error` (or the timeout) is the terminal outcome, and
//! the socket is released on every exit path.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::error::OAuthError;

/// Hard cap on how long the listener waits for the redirect.
pub const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(120);

const SUCCESS_PAGE: &str = "<html><body>\
    <h1>Authorization successful</h1>\
    <p>You can close this window and return to the terminal.</p>\
    </body></html>";

const DENIED_PAGE: &str = "<html><body>\
    <h1>Authorization denied</h1>\
    <p>You can close this window.</p>\
    </body></html>";

const MISSING_CODE_PAGE: &str = "<html><body>\
    <h1>Missing authorization code</h1>\
    </body></html>";

/// What a single incoming request amounted to.
enum Redirect {
    Code(String),
    Denied(String),
    /// Not an OAuth redirect (favicon probe, stray request); keep waiting.
    Ignored,
}

/// Bind an anonymous local listener just to learn a free port, then release
/// it.
pub async fn reserve_local_port() -> Result<u16, OAuthError> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(OAuthError::PortAllocation)?;
    let port = listener
        .local_addr()
        .map_err(OAuthError::PortAllocation)?
        .port();
    Ok(port)
}

/// Serve `127.0.0.1:{port}` until the redirect arrives or `timeout` elapses.
///
/// A request with `error` fails with [`OAuthError::Denied`], one with `code`
/// returns the code, anything else gets a 400 and the wait continues.
pub async fn await_authorization_code(port: u16, timeout: Duration) -> Result<String, OAuthError> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(OAuthError::Listener)?;

    match tokio::time::timeout(timeout, serve_one_redirect(&listener)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(OAuthError::Timeout(timeout.as_secs())),
    }
}

async fn serve_one_redirect(listener: &TcpListener) -> Result<String, OAuthError> {
    loop {
        let (stream, _) = listener.accept().await.map_err(OAuthError::Listener)?;
        match handle_request(stream).await {
            Ok(Redirect::Code(code)) => return Ok(code),
            Ok(Redirect::Denied(reason)) => return Err(OAuthError::Denied(reason)),
            Ok(Redirect::Ignored) => continue,
            // A client that hung up mid-request is not a terminal outcome.
            Err(_) => continue,
        }
    }
}

async fn handle_request(stream: TcpStream) -> std::io::Result<Redirect> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let params = query_params(&request_line);

    let (redirect, status_line, page) =
        if let Some(reason) = params.as_ref().and_then(|p| p.get("error")) {
            (
                Redirect::Denied(reason.clone()),
                "400 Bad Request",
                DENIED_PAGE,
            )
        } else if let Some(code) = params.as_ref().and_then(|p| p.get("code")) {
            (Redirect::Code(code.clone()), "200 OK", SUCCESS_PAGE)
        } else {
            (Redirect::Ignored, "400 Bad Request", MISSING_CODE_PAGE)
        };

    let response = format!(
        "HTTP/1.1 {status_line}\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        {page}"
    );

    // Best effort: a browser closing early must not discard a received code.
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.flush().await;

    Ok(redirect)
}

fn query_params(request_line: &str) -> Option<HashMap<String, String>> {
    let path = request_line.split_whitespace().nth(1)?;
    let url = url::Url::parse(&format!("http://127.0.0.1{path}")).ok()?;
    Some(url.query_pairs().into_owned().collect())
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    async fn send_request(port: u16, target: &str) -> String {
        // Give the listener a moment to bind.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut stream = TcpStream::connect(("127.0.0.1", port))
            .await
            .expect("listener should be accepting");
        stream
            .write_all(format!("GET {target} HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n").as_bytes())
            .await
            .expect("request write should succeed");

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("response read should succeed");
        response
    }

    #[tokio::test]
    async fn test_redirect_with_code_resolves_the_wait() {
        let port = reserve_local_port().await.expect("port should be free");

        let (outcome, response) = tokio::join!(
            await_authorization_code(port, Duration::from_secs(5)),
            send_request(port, "/?code=abc123&scope=calendar"),
        );

        assert_eq!(outcome.expect("code should be returned"), "abc123");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Authorization successful"));
    }

    #[tokio::test]
    async fn test_redirect_with_error_fails_the_wait() {
        let port = reserve_local_port().await.expect("port should be free");

        let (outcome, response) = tokio::join!(
            await_authorization_code(port, Duration::from_secs(5)),
            send_request(port, "/?error=access_denied"),
        );

        match outcome {
            Err(OAuthError::Denied(reason)) => assert_eq!(reason, "access_denied"),
            other => panic!("expected denial, got {other:?}"),
        }
        assert!(response.starts_with("HTTP/1.1 400 Bad Request"));
        assert!(response.contains("Authorization denied"));
    }

    #[tokio::test]
    async fn test_stray_request_keeps_the_listener_waiting() {
        let port = reserve_local_port().await.expect("port should be free");

        let requests = async {
            let stray = send_request(port, "/favicon.ico").await;
            let redirect = send_request(port, "/?code=after-stray").await;
            (stray, redirect)
        };
        let (outcome, (stray, redirect)) =
            tokio::join!(await_authorization_code(port, Duration::from_secs(5)), requests);

        assert_eq!(outcome.expect("code should be returned"), "after-stray");
        assert!(stray.starts_with("HTTP/1.1 400 Bad Request"));
        assert!(stray.contains("Missing authorization code"));
        assert!(redirect.starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test]
    async fn test_timeout_fails_the_wait_and_releases_the_port() {
        let port = reserve_local_port().await.expect("port should be free");

        let outcome = await_authorization_code(port, Duration::from_millis(100)).await;
        match outcome {
            Err(OAuthError::Timeout(_)) => {}
            other => panic!("expected timeout, got {other:?}"),
        }

        // The socket was torn down, so the port can be bound again.
        TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("port should be released after timeout");
    }
}
