//! Syntax checks for allow-list / block-list entries.

use crate::net::classifier::parse_ipv4_literal;

/// True if `entry` is an IPv4 literal or a DNS hostname.
pub fn is_valid_entry(entry: &str) -> bool {
    is_valid_ipv4(entry) || is_valid_hostname(entry)
}

pub fn is_valid_ipv4(entry: &str) -> bool {
    parse_ipv4_literal(entry).is_some()
}

/// Labels of ASCII alphanumerics and hyphens, no hyphen at either end of a
/// label, last label at least two characters. Digits-and-dots strings are
/// never hostnames.
pub fn is_valid_hostname(entry: &str) -> bool {
    if entry.is_empty() || entry.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }

    let labels: Vec<&str> = entry.split('.').collect();
    let Some(tld) = labels.last() else {
        return false;
    };
    tld.len() >= 2 && labels.iter().all(|label| is_valid_label(label))
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostnames() {
        assert!(is_valid_hostname("api.twitter.com"));
        assert!(is_valid_hostname("lunar.dev"));
        assert!(is_valid_hostname("my-service.internal-zone.io"));
        assert!(is_valid_hostname("httpbinmock"));
        assert!(is_valid_hostname("Host.com"));

        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("a.b.c.d.e"));
        assert!(!is_valid_hostname("-bad.com"));
        assert!(!is_valid_hostname("bad-.com"));
        assert!(!is_valid_hostname("double..dot.com"));
        assert!(!is_valid_hostname("trailing.dot."));
        assert!(!is_valid_hostname("under_score.com"));
        assert!(!is_valid_hostname("http://lunar.dev"));
        assert!(!is_valid_hostname("lunar.dev:8080"));
        assert!(!is_valid_hostname("1.2.3.4"));
        assert!(!is_valid_hostname("999.1"));
    }

    #[test]
    fn test_ipv4() {
        assert!(is_valid_ipv4("1.2.3.4"));
        assert!(is_valid_ipv4("192.168.4.12"));
        assert!(!is_valid_ipv4("1.2.3"));
        assert!(!is_valid_ipv4("256.1.1.1"));
        assert!(!is_valid_ipv4("1.2.3.4.5"));
    }

    #[test]
    fn test_entries() {
        assert!(is_valid_entry("a.com"));
        assert!(is_valid_entry("1.2.3.4"));
        assert!(!is_valid_entry("1.2.3"));
        assert!(!is_valid_entry("not a host"));
    }
}
