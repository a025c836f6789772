//! Special cases applied once placement is done.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::commentary::CommentaryTree;
use crate::dedupe::resolve_duplicates;
use crate::document::Section;
use crate::sections::is_end_of_unit;
use crate::warnings::WarningSink;

pub const STEINSALTZ: &str = "Steinsaltz";

/// Steinsaltz opens a new topic with an enlarged first Hebrew letter.
static SUGYA_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<big>[א-ת]").expect("valid regex"));

/// Reference given to stand-in sections.
pub const SYNTHETIC_REF: &str = "synthetic";

/// Units upstream has no primary text for: (masechet, amud, primary, secondary).
const MISSING_CONTENT: &[(&str, &str, &str, &str)] = &[(
    "Nazir",
    "33b",
    "אין גמרא לנזיר ל״ג ע״א, רק תוספות (שהם קשורים לדפים אחרים)",
    "Nazir 33b has no Gemara, just Tosafot (which are linked to other pages).",
)];

/// Per-section pass: dedupe, then the start-of-topic flag, then the
/// end-of-chapter rewrite.
pub fn post_process_section(section: &mut Section, sink: &dyn WarningSink) {
    resolve_duplicates(section, sink);
    mark_start_of_sugya(section);
    apply_hadran(section);
}

/// Flag the section if a top-level Steinsaltz comment opens a new topic.
pub fn mark_start_of_sugya(section: &mut Section) {
    if section
        .commentary
        .comments()
        .any(|c| c.kind == STEINSALTZ && SUGYA_START_RE.is_match(&c.he))
    {
        section.steinsaltz_start_of_sugya = true;
    }
}

/// Reduce an end-of-chapter section to the bare formula.
pub fn apply_hadran(section: &mut Section) {
    if !is_end_of_unit(&section.he) {
        return;
    }
    debug!(reference = %section.reference, "end of chapter");
    section.he = section.he.replace("<br>", "");
    section.en.clear();
    section.commentary = CommentaryTree::new();
    section.hadran = true;
}

/// Whole-document pass: swap in stand-in content for units known to be
/// missing upstream.
pub fn post_process_all(sections: Vec<Section>, masechet: &str, amud: &str) -> Vec<Section> {
    match MISSING_CONTENT
        .iter()
        .find(|(m, a, _, _)| *m == masechet && *a == amud)
    {
        Some((_, _, he, en)) => {
            debug!(masechet, amud, "substituting synthetic section");
            let mut section = Section::new(SYNTHETIC_REF, he.to_string(), en.to_string());
            section.synthetic = true;
            vec![section]
        }
        None => sections,
    }
}
