//! Newline-delimited IP allow-list parsing.
//!
//! The grammar is intentionally loose and must stay that way: IPv4 only
//! checks for four groups of 1-3 digits (so `999.999.999.999` passes) and
//! IPv6 only accepts the fully expanded 8-group form (so `::1` fails).
//! Existing tokens on the server were written under these rules.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

// `[0-9]` rather than `\d`: the regex crate's `\d` matches any Unicode digit.
static IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:[0-9]{1,3}\.){3}[0-9]{1,3})$").expect("static IPv4 pattern")
});

static IPV6: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$").expect("static IPv6 pattern")
});

pub fn is_valid_ip(candidate: &str) -> bool {
    IPV4.is_match(candidate) || IPV6.is_match(candidate)
}

/// Trimmed, non-empty, validated, de-duplicated IP literals in first-seen
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedList(Vec<String>);

impl NormalizedList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The textarea rendering: one address per line.
    pub fn to_text(&self) -> String {
        self.0.join("\n")
    }

    /// `None` when nothing is left, which means "no whitelist".
    pub fn into_whitelist(self) -> Option<Vec<String>> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0)
        }
    }
}

/// Lines that matched neither grammar, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAddresses(pub Vec<String>);

/// Split, trim (whitespace and byte-order marks), drop blanks, validate
/// every line, then de-duplicate.
///
/// Validation runs before de-duplication, so a repeated bad line is
/// reported once per occurrence.
pub fn normalize(raw: &str) -> Result<NormalizedList, InvalidAddresses> {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}'))
        .filter(|line| !line.is_empty())
        .collect();

    let invalid: Vec<String> = lines
        .iter()
        .filter(|line| !is_valid_ip(line))
        .map(|line| line.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(InvalidAddresses(invalid));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    let unique = lines
        .into_iter()
        .filter(|line| seen.insert(*line))
        .map(String::from)
        .collect();
    Ok(NormalizedList(unique))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_digit_groups_only() {
        assert!(is_valid_ip("192.168.1.10"));
        assert!(is_valid_ip("0.0.0.0"));
        // octet range is not checked
        assert!(is_valid_ip("999.999.999.999"));
        assert!(!is_valid_ip("1.2.3"));
        assert!(!is_valid_ip("1.2.3.4.5"));
        assert!(!is_valid_ip("1234.1.1.1"));
        assert!(!is_valid_ip("10.0.0.1/24"));
    }

    #[test]
    fn test_ipv6_requires_eight_groups() {
        assert!(is_valid_ip("2001:0db8:0000:0000:0000:0000:0000:0001"));
        assert!(is_valid_ip("2001:db8:0:0:0:0:0:1"));
        assert!(is_valid_ip("FE80:0:0:0:0:0:0:ABCD"));
        assert!(!is_valid_ip("::1"));
        assert!(!is_valid_ip("2001:db8::1"));
        assert!(!is_valid_ip("2001:db8:0:0:0:0:0:0:1"));
        assert!(!is_valid_ip("2001:db8:0:0:0:0:0:g"));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits are Unicode `\d` but not accepted here.
        assert!(!is_valid_ip("١.١.١.١"));
    }

    #[test]
    fn test_normalize_trims_and_drops_blank_lines() {
        let list = normalize("  10.0.0.1  \n\n\t\n10.0.0.2\r\n").unwrap();
        assert_eq!(list.as_slice(), ["10.0.0.1", "10.0.0.2"]);
        assert_eq!(list.to_text(), "10.0.0.1\n10.0.0.2");
    }

    #[test]
    fn test_normalize_strips_byte_order_mark() {
        let list = normalize("\u{FEFF}1.1.1.1\n2.2.2.2\u{FEFF}").unwrap();
        assert_eq!(list.as_slice(), ["1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn test_normalize_dedups_in_first_seen_order() {
        let list = normalize("2.2.2.2\n1.1.1.1\n2.2.2.2\n1.1.1.1").unwrap();
        assert_eq!(list.as_slice(), ["2.2.2.2", "1.1.1.1"]);
    }

    #[test]
    fn test_normalize_reports_every_invalid_line() {
        let err = normalize("1.1.1.1\nlocalhost\n::1\n2.2.2.2").unwrap_err();
        assert_eq!(err.0, vec!["localhost".to_string(), "::1".to_string()]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "1.1.1.1\n1.1.1.1\n2.2.2.2",
            "  3.3.3.3\n\n 4.4.4.4 \n3.3.3.3 ",
            "2001:db8:0:0:0:0:0:1\n10.1.1.1",
            "",
            "\n \n",
        ];
        for raw in inputs {
            let once = normalize(raw).unwrap();
            let twice = normalize(&once.to_text()).unwrap();
            assert_eq!(once, twice, "input {:?}", raw);
        }
    }

    #[test]
    fn test_blank_input_means_no_whitelist() {
        assert_eq!(normalize(" \n \n").unwrap().into_whitelist(), None);
        assert_eq!(
            normalize("5.5.5.5").unwrap().into_whitelist(),
            Some(vec!["5.5.5.5".to_string()])
        );
    }
}
