//! Aggregation engine for daf.
//!
//! Turns one amud's primary text, its link summaries and the detail of each
//! linked comment into a [`Document`]: sections paired from the bilingual
//! text, each carrying a two-level tree of classified commentary.

pub mod classifier;
pub mod commentary;
pub mod dedupe;
pub mod document;
pub mod locator;
pub mod pipeline;
pub mod placement;
pub mod postprocess;
pub mod sections;
pub mod warnings;

pub use classifier::{Classifier, CommentaryKind};
pub use commentary::{Comment, CommentaryTree};
pub use document::{Document, Section};
pub use locator::{AmudLocator, RangeLocator, parse_search_term};
pub use pipeline::{ProgressReporter, SilentProgress, build_document, handle_range, handle_request};
pub use warnings::{CollectingSink, PlacementWarning, TracingSink, WarningSink};

#[cfg(test)]
pub(crate) mod test_support {
    use daf_fetcher::{CollectiveTitle, LinkRecord, TextFragment};

    use crate::commentary::Comment;
    use crate::document::Section;

    /// A formatted comment of `kind`; its source ref is `"{reference} (source)"`.
    pub fn comment(kind: &str, reference: &str, he: &str) -> Comment {
        Comment {
            he: he.to_string(),
            en: String::new(),
            reference: reference.into(),
            source_ref: format!("{reference} (source)").into(),
            source_he_ref: Default::default(),
            kind: kind.to_string(),
        }
    }

    /// An upstream annotation titled `title` with some primary text.
    pub fn link(title: &str, reference: &str, anchors: &[&str]) -> LinkRecord {
        LinkRecord {
            reference: reference.into(),
            source_ref: reference.into(),
            anchor_refs: anchors.iter().map(|a| (*a).into()).collect(),
            collective_title: CollectiveTitle {
                en: title.to_string(),
                he: String::new(),
            },
            he: TextFragment::Text(format!("text of {reference}")),
            ..LinkRecord::default()
        }
    }

    /// `n` empty sections `X.1..=X.n`.
    pub fn sections(n: usize) -> Vec<Section> {
        (1..=n)
            .map(|i| Section::new(format!("X.{i}"), format!("p{i}"), format!("e{i}")))
            .collect()
    }
}
