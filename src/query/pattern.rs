//! Wildcard patterns for IS comparisons
//!
//! `*` is only allowed as the first and/or last character:
//! - `x`   exact match
//! - `x*`  prefix match
//! - `*x`  suffix match
//! - `*x*` substring match
//!
//! Matching is case-sensitive.

use std::fmt;

/// A validated IS pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WildcardPattern {
    /// No wildcard
    Exact(String),
    /// Trailing wildcard
    Prefix(String),
    /// Leading wildcard
    Suffix(String),
    /// Leading and trailing wildcard
    Contains(String),
}

impl WildcardPattern {
    /// Parses a raw IS value. Returns None if `*` appears anywhere
    /// other than the first or last position.
    pub fn parse(raw: &str) -> Option<Self> {
        let leading = raw.starts_with('*');
        // A lone "*" is both the leading and the trailing wildcard.
        let trailing = raw.len() > 1 && raw.ends_with('*');

        let start = usize::from(leading);
        let end = raw.len() - usize::from(trailing);
        let inner = if start <= end { &raw[start..end] } else { "" };

        if inner.contains('*') {
            return None;
        }

        let inner = inner.to_string();
        Some(match (leading, trailing) {
            (false, false) => WildcardPattern::Exact(inner),
            (false, true) => WildcardPattern::Prefix(inner),
            (true, false) if raw.len() == 1 => WildcardPattern::Contains(inner),
            (true, false) => WildcardPattern::Suffix(inner),
            (true, true) => WildcardPattern::Contains(inner),
        })
    }

    /// Checks whether a field value satisfies the pattern
    pub fn matches(&self, value: &str) -> bool {
        match self {
            WildcardPattern::Exact(s) => value == s,
            WildcardPattern::Prefix(s) => value.starts_with(s.as_str()),
            WildcardPattern::Suffix(s) => value.ends_with(s.as_str()),
            WildcardPattern::Contains(s) => value.contains(s.as_str()),
        }
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WildcardPattern::Exact(s) => write!(f, "{}", s),
            WildcardPattern::Prefix(s) => write!(f, "{}*", s),
            WildcardPattern::Suffix(s) => write!(f, "*{}", s),
            WildcardPattern::Contains(s) => write!(f, "*{}*", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn satisfy(value: &str, raw: &str) -> bool {
        WildcardPattern::parse(raw).unwrap().matches(value)
    }

    #[test]
    fn test_wildcard_positions() {
        assert!(satisfy("CPSC310", "CPSC*"));
        assert!(satisfy("CPSC310", "*310"));
        assert!(satisfy("CPSC310", "*SC3*"));
        assert!(satisfy("CPSC310", "CPSC310"));
        assert!(!satisfy("CPSC310", "CPSC31"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!satisfy("CPSC310", "cpsc*"));
    }

    #[test]
    fn test_lone_and_double_star_match_everything() {
        assert!(satisfy("anything", "*"));
        assert!(satisfy("", "*"));
        assert!(satisfy("anything", "**"));
    }

    #[test]
    fn test_empty_pattern_is_exact() {
        assert!(satisfy("", ""));
        assert!(!satisfy("x", ""));
    }

    #[test]
    fn test_internal_wildcard_rejected() {
        assert!(WildcardPattern::parse("CP*SC").is_none());
        assert!(WildcardPattern::parse("*C*S*").is_none());
        assert!(WildcardPattern::parse("***").is_none());
    }

    #[test]
    fn test_display_round_trips_shape() {
        assert_eq!(WildcardPattern::parse("*ab").unwrap().to_string(), "*ab");
        assert_eq!(WildcardPattern::parse("ab*").unwrap().to_string(), "ab*");
    }
}
