//! Client address extraction
//!
//! Operation records carry an IPv4 literal when one can be found anywhere in
//! the raw peer-address string (this covers plain IPv4 socket addresses and
//! IPv4-mapped IPv6 like `::ffff:192.0.2.1`). IPv6-only or malformed peers
//! get the `"Unknown IPv4"` sentinel; that is documented behavior, not an
//! error.

use std::sync::OnceLock;

use regex::Regex;

use depot_common::UNKNOWN_IPV4;

fn ipv4_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").expect("ipv4 pattern is valid")
    })
}

/// Extract the first IPv4 literal from a peer-address string
///
/// Falls back to the [`UNKNOWN_IPV4`] sentinel when none is present.
#[must_use]
pub fn extract_ipv4(peer: &str) -> String {
    match ipv4_pattern().find(peer) {
        Some(m) => m.as_str().to_string(),
        None => UNKNOWN_IPV4.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_socket_address() {
        assert_eq!(extract_ipv4("203.0.113.5:51000"), "203.0.113.5");
    }

    #[test]
    fn test_bare_address() {
        assert_eq!(extract_ipv4("192.0.2.1"), "192.0.2.1");
    }

    #[test]
    fn test_ipv4_mapped_ipv6() {
        assert_eq!(extract_ipv4("[::ffff:192.0.2.1]:8080"), "192.0.2.1");
    }

    #[test]
    fn test_pure_ipv6_is_unknown() {
        assert_eq!(extract_ipv4("[2001:db8::1]:443"), UNKNOWN_IPV4);
    }

    #[test]
    fn test_garbage_is_unknown() {
        assert_eq!(extract_ipv4(""), UNKNOWN_IPV4);
        assert_eq!(extract_ipv4("localhost"), UNKNOWN_IPV4);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(extract_ipv4("10.0.0.1 via 10.0.0.2"), "10.0.0.1");
    }
}
