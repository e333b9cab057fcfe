//! Hand-written HTTP responses for cases wiremock cannot produce
//!
//! wiremock always sets a `Content-Type` and always sends complete bodies,
//! so responses without headers or with a truncated body come from here.

#![allow(dead_code)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Response with no `Server` and no `Content-Type` header
pub const BARE_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\nConnection: close\r\n\r\nraw bytes";

/// Response promising 100 body bytes and closing after 5
pub const TRUNCATED_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nhello";

/// Serves `response` verbatim to the first connection and closes it
///
/// Returns the URL to fetch.
pub async fn serve_once(response: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("Failed to accept");

        // Drain the request head before answering
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let _ = socket.write_all(response).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{}/", addr)
}
