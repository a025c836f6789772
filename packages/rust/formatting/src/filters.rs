//! Individual text-reformatting passes.
//!
//! Each pass is a function `&str -> String` with no knowledge of where the text
//! came from. [`crate`] composes them into per-language pipelines.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Secondary-language passes
// ---------------------------------------------------------------------------

/// Unwrap `<a>` elements, keeping their inner text.
///
/// Upstream wraps cross-references in links even when asked not to.
pub fn sanitize_links(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)<a\b[^>]*>(.*?)</a>").expect("valid regex")
    });

    LINK_RE.replace_all(text, "$1").to_string()
}

/// Drop `§` markers and the whitespace that follows them.
pub fn remove_section_symbols(text: &str) -> String {
    static SECTION_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"§\s*").expect("valid regex"));

    SECTION_RE.replace_all(text, "").to_string()
}

/// Jastrow entries arrive with footnote markers and stacked line breaks.
pub fn reformat_jastrow(text: &str) -> String {
    static SUP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<sup>.*?</sup>").expect("valid regex"));
    static BREAKS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?:<br\s*/?>\s*){2,}").expect("valid regex"));

    let without_notes = SUP_RE.replace_all(text, "");
    BREAKS_RE
        .replace_all(&without_notes, "<br>")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Primary-language passes
// ---------------------------------------------------------------------------

/// Rewrite `<small>` runs as emphasis spans so the front end can style them.
pub fn small_to_emphasis(text: &str) -> String {
    static SMALL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<small>(.*?)</small>").expect("valid regex"));

    SMALL_RE
        .replace_all(text, r#"<span class="hebrew-emphasis">$1</span>"#)
        .to_string()
}

/// Commentaries whose entries open with a quoted lemma ("dibur hamatchil").
const DIBUR_HAMATCHIL_KINDS: &[&str] = &[
    "Rashi",
    "Tosafot",
    "Ramban",
    "Rashba",
    "Ritva",
    "Rosh",
    "Maharsha",
    "Maharshal",
    "Meir Lublin",
];

/// Bold the lemma that precedes the first dash in a commentary entry.
///
/// Only applies to kinds in [`DIBUR_HAMATCHIL_KINDS`], and leaves entries that
/// already open with bold markup alone.
pub fn bold_dibur_hamatchil(text: &str, kind: &str) -> String {
    static LEMMA_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([^<>]+?)\s+[-–]\s+").expect("valid regex"));

    if !DIBUR_HAMATCHIL_KINDS.contains(&kind) || text.starts_with("<b>") {
        return text.to_string();
    }

    LEMMA_RE.replace(text, "<b>$1</b> - ").to_string()
}

/// Strip the leading label that says which layer of the page an entry refers
/// to (`גמ'`, `מתני'` and their spelled-out forms).
pub fn strip_commentary_prefix(text: &str) -> String {
    static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(?:<b>)?(?:גמ'|גמרא|מתני'|משנה)[.:]?(?:</b>)?\s+").expect("valid regex")
    });

    PREFIX_RE.replace(text, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_unwrapped() {
        let input = r#"See <a class="refLink" href="/Genesis.1.1" data-ref="Genesis 1:1">Genesis 1:1</a>."#;
        assert_eq!(sanitize_links(input), "See Genesis 1:1.");
    }

    #[test]
    fn section_symbols_are_removed() {
        assert_eq!(remove_section_symbols("§ 12 The law"), "12 The law");
        assert_eq!(remove_section_symbols("no symbol"), "no symbol");
    }

    #[test]
    fn jastrow_notes_and_breaks_collapse() {
        let input = "אָב<sup>1</sup> father<br><br> <br>see also";
        assert_eq!(reformat_jastrow(input), "אָב father<br>see also");
    }

    #[test]
    fn small_becomes_emphasis() {
        assert_eq!(
            small_to_emphasis("א <small>ב</small> ג"),
            r#"א <span class="hebrew-emphasis">ב</span> ג"#
        );
    }

    #[test]
    fn dibur_hamatchil_bolded_for_rashi_only() {
        let text = "מאימתי - תנא היכא קאי";
        assert_eq!(
            bold_dibur_hamatchil(text, "Rashi"),
            "<b>מאימתי</b> - תנא היכא קאי"
        );
        assert_eq!(bold_dibur_hamatchil(text, "Verses"), text);
    }

    #[test]
    fn dibur_hamatchil_leaves_bold_entries() {
        let text = "<b>מאימתי</b> - תנא";
        assert_eq!(bold_dibur_hamatchil(text, "Tosafot"), text);
    }

    #[test]
    fn commentary_prefix_stripped() {
        assert_eq!(strip_commentary_prefix("גמ' אמר רבא"), "אמר רבא");
        assert_eq!(strip_commentary_prefix("<b>מתני'</b> תנן"), "תנן");
        assert_eq!(strip_commentary_prefix("אמר רבא"), "אמר רבא");
    }
}
