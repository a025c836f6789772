//! Section assembly from parallel primary/secondary text arrays.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use daf_shared::{DafError, Result};

use crate::document::Section;

/// Phrase that opens the closing formula of a chapter.
const HADRAN_PHRASE: &str = "הדרן עלך";

/// The closing formula as upstream marks it up at the start of a segment.
static HADRAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(<br>)+<big><strong>הדרן עלך .*").expect("valid regex")
});

/// Whether a primary-text segment is a marked-up end-of-chapter formula.
pub fn is_end_of_unit(text: &str) -> bool {
    HADRAN_RE.is_match(text)
}

/// Pair primary and secondary segments into sections `{prefix}.1`, `{prefix}.2`, ...
///
/// Upstream has no translation for a trailing end-of-chapter formula, so a
/// primary array exactly one longer than the secondary one, ending in that
/// formula, is padded with an empty translation. Any other length mismatch is
/// an error.
pub fn assemble(
    primary: Vec<String>,
    mut secondary: Vec<String>,
    ref_prefix: &str,
) -> Result<Vec<Section>> {
    if primary.len() == secondary.len() + 1
        && primary.last().is_some_and(|last| last.contains(HADRAN_PHRASE))
    {
        debug!(ref_prefix, "padding missing translation of end-of-chapter formula");
        secondary.push(String::new());
    }

    if primary.len() != secondary.len() {
        return Err(DafError::UnequalLengths {
            primary: primary.len(),
            secondary: secondary.len(),
        });
    }

    Ok(primary
        .iter()
        .zip(&secondary)
        .enumerate()
        .map(|(i, (he, en))| {
            Section::new(
                format!("{ref_prefix}.{}", i + 1),
                daf_formatting::primary_text(he),
                daf_formatting::secondary_text(en),
            )
        })
        .collect())
}
