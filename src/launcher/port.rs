//! Loopback port probe.

use std::time::Duration;

/// Whether something already accepts TCP connections on `host:port`.
///
/// Resolution failures and timeouts count as "not in use".
pub async fn port_in_use(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, tokio::net::TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}
