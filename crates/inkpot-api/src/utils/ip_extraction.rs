//! Client IP resolution behind reverse proxies
//!
//! X-Forwarded-For is attacker-controlled except for the entries appended by
//! our own proxies. With N trusted proxies, the real client is the Nth entry
//! from the right; anything further left is hearsay.

use std::net::IpAddr;

use axum::http::HeaderMap;

const UNSPECIFIED: IpAddr = IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED);

pub fn extract_client_ip(headers: &HeaderMap, trusted_proxy_count: usize) -> IpAddr {
    if trusted_proxy_count > 0 {
        if let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
        {
            let entries: Vec<&str> = forwarded.split(',').map(str::trim).collect();
            if entries.len() >= trusted_proxy_count {
                let candidate = entries[entries.len() - trusted_proxy_count];
                if let Ok(ip) = candidate.parse::<IpAddr>() {
                    return ip;
                }
            }
        }
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<IpAddr>().ok())
        {
            return ip;
        }
    }
    UNSPECIFIED
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn test_no_proxies_ignores_forwarded_headers() {
        let headers = headers_with("x-forwarded-for", "203.0.113.7");
        assert_eq!(extract_client_ip(&headers, 0), UNSPECIFIED);
    }

    #[test]
    fn test_single_proxy_takes_last_entry() {
        let headers = headers_with("x-forwarded-for", "198.51.100.9, 203.0.113.7");
        assert_eq!(
            extract_client_ip(&headers, 1),
            "203.0.113.7".parse::<IpAddr>().expect("ip")
        );
    }

    #[test]
    fn test_two_proxies_skips_own_hop() {
        let headers = headers_with("x-forwarded-for", "198.51.100.9, 203.0.113.7, 10.0.0.2");
        assert_eq!(
            extract_client_ip(&headers, 2),
            "203.0.113.7".parse::<IpAddr>().expect("ip")
        );
    }

    #[test]
    fn test_garbage_entry_falls_through() {
        let headers = headers_with("x-forwarded-for", "not-an-ip");
        assert_eq!(extract_client_ip(&headers, 1), UNSPECIFIED);
    }

    #[test]
    fn test_real_ip_fallback() {
        let headers = headers_with("x-real-ip", "203.0.113.7");
        assert_eq!(
            extract_client_ip(&headers, 1),
            "203.0.113.7".parse::<IpAddr>().expect("ip")
        );
    }
}
