//! Client IP extraction for per-client rate limiting
//!
//! The site normally runs behind a reverse proxy on the same host. Only in that
//! case is `X-Forwarded-For` trusted; any other peer could put arbitrary values
//! there and spread its OTP requests across fake client keys.

use actix_web::HttpRequest;
use log::warn;
use solarlead_commons::ConnectionInfo;

/// Extract the client address used to key rate-limit buckets.
///
/// - Peer is loopback (local reverse proxy): first `X-Forwarded-For` entry, if present
/// - Otherwise: the peer address itself
pub fn extract_client_ip(req: &HttpRequest) -> ConnectionInfo {
    let peer_addr = req.peer_addr().map(|addr| addr.ip());

    if peer_addr.is_some_and(|ip| ip.is_loopback()) {
        if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
            if let Ok(header_value) = forwarded_for.to_str() {
                // Take first IP in comma-separated list (original client)
                let first_ip = header_value.split(',').next().unwrap_or("").trim();
                if !first_ip.is_empty() {
                    return ConnectionInfo::new(Some(first_ip.to_string()));
                }
            }
        }
    } else if req.headers().contains_key("X-Forwarded-For") {
        warn!("Ignoring X-Forwarded-For from non-loopback peer {:?}", peer_addr);
    }

    peer_addr
        .map(|ip| ConnectionInfo::new(Some(ip.to_string())))
        .unwrap_or_else(|| ConnectionInfo::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::net::SocketAddr;

    #[test]
    fn test_forwarded_for_trusted_from_loopback_proxy() {
        let req = TestRequest::default()
            .peer_addr("127.0.0.1:50000".parse::<SocketAddr>().unwrap())
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.2"))
            .to_http_request();

        let info = extract_client_ip(&req);
        assert_eq!(info.remote_addr.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_forwarded_for_ignored_from_remote_peer() {
        let req = TestRequest::default()
            .peer_addr("198.51.100.4:443".parse::<SocketAddr>().unwrap())
            .insert_header(("X-Forwarded-For", "203.0.113.7"))
            .to_http_request();

        let info = extract_client_ip(&req);
        assert_eq!(info.remote_addr.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_no_peer_address() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(extract_client_ip(&req).remote_addr, None);
    }
}
