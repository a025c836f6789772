//! Page locators: which tractate and amud (page side) a request is for.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use daf_shared::{DafError, Result, canonical_masechet_name};

static AMUD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[ab]$").expect("valid regex"));
static MULTIPLE_SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"  +").expect("valid regex"));
// `2.` is shorthand for 2a, `2:` for 2b.
static AMUD_ALEPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\.").expect("valid regex"));
static AMUD_BET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d):").expect("valid regex"));

/// One amud of one tractate, e.g. `Berakhot 2a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmudLocator {
    masechet: &'static str,
    amud: String,
}

impl AmudLocator {
    /// Resolve `masechet` to its canonical name and validate `amud`.
    pub fn new(masechet: &str, amud: &str) -> Result<Self> {
        let canonical = canonical_masechet_name(masechet)
            .ok_or_else(|| DafError::invalid_locator(format!("unknown masechet: {masechet}")))?;
        let amud = amud.trim().to_ascii_lowercase();
        if !AMUD_RE.is_match(&amud) {
            return Err(DafError::invalid_locator(format!("invalid amud: {amud}")));
        }
        if amud[..amud.len() - 1].parse::<u32>().is_err() {
            return Err(DafError::invalid_locator(format!("amud out of range: {amud}")));
        }
        Ok(Self {
            masechet: canonical,
            amud,
        })
    }

    pub fn masechet(&self) -> &'static str {
        self.masechet
    }

    pub fn amud(&self) -> &str {
        &self.amud
    }

    /// Reference to request upstream: `Berakhot.2a`.
    pub fn upstream_ref(&self) -> String {
        format!("{}.{}", self.masechet, self.amud)
    }

    pub fn document_id(&self) -> &str {
        &self.amud
    }
}

impl fmt::Display for AmudLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.masechet, self.amud)
    }
}

/// An inclusive run of amudim in one tractate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeLocator {
    pub start: AmudLocator,
    pub end: AmudLocator,
}

impl RangeLocator {
    pub fn new(masechet: &str, start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: AmudLocator::new(masechet, start)?,
            end: AmudLocator::new(masechet, end)?,
        })
    }

    pub fn single(locator: AmudLocator) -> Self {
        Self {
            start: locator.clone(),
            end: locator,
        }
    }

    /// Every amud in the range, in order.
    pub fn amudim(&self) -> Vec<AmudLocator> {
        amudim_in_range(self.start.amud(), self.end.amud())
            .into_iter()
            .map(|amud| AmudLocator {
                masechet: self.start.masechet,
                amud,
            })
            .collect()
    }
}

/// The amud after `amud`: `2a` → `2b`, `2b` → `3a`.
pub fn next_amud(amud: &str) -> String {
    match amud.strip_suffix('a') {
        Some(number) => format!("{number}b"),
        None => format!("{}a", amud_number(amud).saturating_add(1)),
    }
}

fn amud_number(amud: &str) -> u32 {
    amud.trim_end_matches(['a', 'b']).parse().unwrap_or(0)
}

/// Position of an amud in page order: `2a` < `2b` < `3a`.
fn amud_position(amud: &str) -> (u32, bool) {
    (amud_number(amud), amud.ends_with('b'))
}

/// Inclusive list of amudim from `start` to `end`.
///
/// Equal or inverted bounds yield just `start`.
pub fn amudim_in_range(start: &str, end: &str) -> Vec<String> {
    let last = amud_position(end);
    if amud_position(start) >= last {
        return vec![start.to_string()];
    }
    let mut amudim = Vec::new();
    let mut current = start.to_string();
    while amud_position(&current) < last {
        let next = next_amud(&current);
        amudim.push(current);
        current = next;
    }
    amudim.push(end.to_string());
    amudim
}

/// Parse a free-form search like `berachot 2:`, `Shabbat 2a-3b` or
/// `Shabbat 2a to 3b`.
pub fn parse_search_term(term: &str) -> Result<RangeLocator> {
    let term = MULTIPLE_SPACES_RE.replace_all(term.trim(), " ");
    let term = AMUD_ALEPH_RE.replace_all(&term, "${1}a");
    let term = AMUD_BET_RE.replace_all(&term, "${1}b");
    let words: Vec<&str> = term.split(' ').collect();

    // Tractate names may be several words long; the amud part starts at the
    // first word beginning with a digit.
    let split = words
        .iter()
        .position(|w| w.starts_with(|c: char| c.is_ascii_digit()))
        .filter(|&i| i > 0)
        .ok_or_else(|| DafError::invalid_locator(format!("no amud in search: {term}")))?;
    let masechet = words[..split].join(" ");
    let rest = &words[split..];

    match rest {
        [single] => match single.split_once('-') {
            Some((start, end)) => RangeLocator::new(&masechet, start, end),
            None => AmudLocator::new(&masechet, single).map(RangeLocator::single),
        },
        [start, "to", end] => RangeLocator::new(&masechet, start, end),
        _ => Err(DafError::invalid_locator(format!("unrecognized search: {term}"))),
    }
}

#[cfg(test)]
mod tests {
    use daf_shared::ErrorCode;

    use super::*;

    #[test]
    fn canonicalizes_and_validates() {
        let locator = AmudLocator::new("brachot", "2A").unwrap();
        assert_eq!(locator.masechet(), "Berakhot");
        assert_eq!(locator.upstream_ref(), "Berakhot.2a");
        assert_eq!(locator.document_id(), "2a");
        assert_eq!(locator.to_string(), "Berakhot 2a");

        let err = AmudLocator::new("Nowhere", "2a").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLocator);
        assert!(AmudLocator::new("Berakhot", "2c").is_err());
        assert!(AmudLocator::new("Berakhot", "a").is_err());

        let err = AmudLocator::new("Berakhot", "99999999999a").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLocator);
    }

    #[test]
    fn next_amud_alternates_sides() {
        assert_eq!(next_amud("2a"), "2b");
        assert_eq!(next_amud("2b"), "3a");
        assert_eq!(next_amud("99b"), "100a");
    }

    #[test]
    fn range_enumeration() {
        assert_eq!(amudim_in_range("2a", "3b"), vec!["2a", "2b", "3a", "3b"]);
        assert_eq!(amudim_in_range("2b", "3a"), vec!["2b", "3a"]);
        assert_eq!(amudim_in_range("5a", "5a"), vec!["5a"]);
        assert_eq!(amudim_in_range("7a", "3b"), vec!["7a"]);
        assert_eq!(amudim_in_range("2b", "2a"), vec!["2b"]);
    }

    #[test]
    fn range_locator_keeps_masechet() {
        let range = RangeLocator::new("Shabbos", "2a", "2b").unwrap();
        let amudim = range.amudim();
        assert_eq!(amudim.len(), 2);
        assert!(amudim.iter().all(|a| a.masechet() == "Shabbat"));
    }

    #[test]
    fn search_terms() {
        let single = parse_search_term("  berachot   2: ").unwrap();
        assert_eq!(single.start, single.end);
        assert_eq!(single.start.upstream_ref(), "Berakhot.2b");

        let dot = parse_search_term("Shabbat 31.").unwrap();
        assert_eq!(dot.start.amud(), "31a");

        let dash = parse_search_term("Shabbat 2a-3b").unwrap();
        assert_eq!((dash.start.amud(), dash.end.amud()), ("2a", "3b"));

        let to = parse_search_term("Bava Kamma 2a to 2b").unwrap();
        assert_eq!(to.start.masechet(), "Bava Kamma");
        assert_eq!(to.end.amud(), "2b");

        assert!(parse_search_term("Shabbat").is_err());
        assert!(parse_search_term("2a").is_err());
        assert!(parse_search_term("Shabbat 2a 3b").is_err());
    }
}
