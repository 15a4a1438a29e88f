use std::net::SocketAddr;

use axum::http::HeaderMap;

// Rate key - authenticated identity plus path, or client IP plus path
pub fn rate_key(identity: Option<&str>, ip: &str, path: &str) -> String {
    match identity {
        Some(id) => format!("user:{id}:{path}"),
        None => format!("ip:{ip}:{path}"),
    }
}

// Client IP policy: first non-empty of the forwarding headers, then the
// transport remote address, then loopback
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    for name in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    match remote {
        Some(addr) => addr.ip().to_string(),
        None => "127.0.0.1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn identity_takes_precedence_over_ip() {
        assert_eq!(
            rate_key(Some("42"), "10.0.0.1", "/api/v1/auth/login"),
            "user:42:/api/v1/auth/login"
        );
        assert_eq!(
            rate_key(None, "10.0.0.1", "/api/v1/auth/login"),
            "ip:10.0.0.1:/api/v1/auth/login"
        );
    }

    #[test]
    fn forwarded_for_wins_over_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, None), "203.0.113.9");
    }

    #[test]
    fn real_ip_wins_over_remote_addr() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        let remote = "192.0.2.1:5000".parse().ok();
        assert_eq!(client_ip(&headers, remote), "198.51.100.2");
    }

    #[test]
    fn empty_header_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        let remote = "192.0.2.1:5000".parse().ok();
        assert_eq!(client_ip(&headers, remote), "192.0.2.1");
    }

    #[test]
    fn falls_back_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new(), None), "127.0.0.1");
    }
}
