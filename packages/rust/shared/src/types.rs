//! Core domain types shared across daf crates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

/// Locator for a unit or sub-unit of a text, e.g. `Berakhot 2a:5` or
/// `Rashi on Berakhot 2a:5:1`.
///
/// Opaque apart from two operations: prefix comparison and extraction of the
/// colon-delimited segment that follows a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// The decimal segment immediately after `prefix`, up to the next colon.
    ///
    /// `Berakhot 2a:7:3` with prefix `Berakhot 2a:` yields `Some(7)`. Ranges such
    /// as `5-6` yield their leading number. Returns `None` when the prefix does
    /// not match or no digits follow it.
    pub fn segment_after(&self, prefix: &str) -> Option<usize> {
        let rest = self.0.strip_prefix(prefix)?;
        let segment = rest.split(':').next().unwrap_or_default();
        let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }

    /// Everything before the first colon, i.e. the reference with its segment
    /// numbers stripped. References without a colon are returned whole.
    pub fn unit(&self) -> &str {
        match self.0.find(':') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Reference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Reference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_after_prefix() {
        let r = Reference::new("Berakhot 2a:7:3");
        assert_eq!(r.segment_after("Berakhot 2a:"), Some(7));
        assert_eq!(r.segment_after("Berakhot 3a:"), None);
    }

    #[test]
    fn segment_after_handles_ranges_and_garbage() {
        assert_eq!(Reference::new("X:5-6").segment_after("X:"), Some(5));
        assert_eq!(Reference::new("X:").segment_after("X:"), None);
        assert_eq!(Reference::new("X:abc").segment_after("X:"), None);
    }

    #[test]
    fn unit_strips_segments() {
        assert_eq!(
            Reference::new("Rashi on Berakhot 2a:5:1").unit(),
            "Rashi on Berakhot 2a"
        );
        assert_eq!(Reference::new("Berakhot 2a").unit(), "Berakhot 2a");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Reference::new("Shabbat 31a:4")).unwrap();
        assert_eq!(json, "\"Shabbat 31a:4\"");
    }
}
