//! Anchor-based placement of comments into sections.

use tracing::trace;

use daf_fetcher::{LinkRecord, TextResponse};
use daf_shared::Reference;

use crate::classifier::Classifier;
use crate::commentary::Comment;
use crate::document::Section;
use crate::warnings::{DropReason, PlacementWarning, WarningSink};

/// Zero-based section index for the first anchor under `prefix`.
///
/// Only the first anchor starting with `prefix` is considered, even when a
/// comment spans several sections. Segment `0` or a non-numeric segment
/// resolves to nothing.
pub fn resolve_section_index(anchors: &[Reference], prefix: &str) -> Option<usize> {
    anchors
        .iter()
        .find(|anchor| anchor.has_prefix(prefix))?
        .segment_after(prefix)?
        .checked_sub(1)
}

/// Whether any anchor points into the same text as `parent`: comments on
/// `Rashi on Berakhot 2a:5:1` are anchored under `Rashi on Berakhot 2a`.
pub fn anchored_on(anchors: &[Reference], parent: &Reference) -> bool {
    anchors.iter().any(|anchor| anchor.unit() == parent.unit())
}

/// Inserts comments into sections, reporting drops to a [`WarningSink`].
pub struct CommentPlacer<'a> {
    classifier: &'a Classifier,
    sink: &'a dyn WarningSink,
}

impl<'a> CommentPlacer<'a> {
    pub fn new(classifier: &'a Classifier, sink: &'a dyn WarningSink) -> Self {
        Self { classifier, sink }
    }

    /// Place `link` at the top level of the section its anchor names.
    ///
    /// Returns the index of the section the comment went into. Unclassified
    /// annotations are dropped without a warning.
    pub fn place(
        &self,
        link: &LinkRecord,
        sections: &mut [Section],
        prefix: &str,
    ) -> Option<usize> {
        if link.he.is_empty() && link.text.is_empty() {
            self.drop_comment(link, prefix, None, DropReason::EmptyText);
            return None;
        }

        let index = self.resolve(link, sections.len(), prefix, None)?;

        let Some(kind) = self.classifier.classify_link(link) else {
            trace!(reference = %link.reference, "unclassified comment");
            return None;
        };

        sections[index]
            .commentary
            .add_comment(Comment::from_link(link, kind.name()));
        Some(index)
    }

    /// Place `link` in the nested tree of `parent_kind` in the section its
    /// anchor names. Fails unless that section already holds a top-level
    /// comment of `parent_kind`.
    pub fn place_nested(
        &self,
        link: &LinkRecord,
        sections: &mut [Section],
        prefix: &str,
        parent_kind: &str,
    ) -> bool {
        let Some(index) = self.resolve(link, sections.len(), prefix, Some(parent_kind)) else {
            return false;
        };

        let Some(kind) = self.classifier.classify_link(link) else {
            trace!(reference = %link.reference, "unclassified nested comment");
            return false;
        };

        let inserted = sections[index]
            .commentary
            .add_nested_comment(parent_kind, Comment::from_link(link, kind.name()));
        if !inserted {
            self.drop_comment(link, prefix, Some(parent_kind), DropReason::MissingParent);
        }
        inserted
    }

    /// Place the commentary found in a parent comment's detail response as
    /// nested comments under `parent_kind`, in the section the parent itself
    /// was placed in. Returns how many were inserted.
    ///
    /// The nested anchors only locate the parent's own text, never a section
    /// of the page, so the section comes from the parent's placement.
    pub fn place_details(
        &self,
        parent: &Reference,
        parent_kind: &str,
        parent_section: usize,
        detail: &TextResponse,
        sections: &mut [Section],
    ) -> usize {
        let Some(section) = sections.get_mut(parent_section) else {
            return 0;
        };
        detail
            .commentary
            .iter()
            .filter(|link| self.place_detail(link, parent, parent_kind, section))
            .count()
    }

    fn place_detail(
        &self,
        link: &LinkRecord,
        parent: &Reference,
        parent_kind: &str,
        section: &mut Section,
    ) -> bool {
        let prefix = parent.as_str();
        if !anchored_on(&link.anchor_refs, parent) {
            self.drop_comment(link, prefix, Some(parent_kind), DropReason::NoMatchingAnchor);
            return false;
        }

        let Some(kind) = self.classifier.classify_link(link) else {
            trace!(reference = %link.reference, "unclassified nested comment");
            return false;
        };

        let holds_parent = section
            .commentary
            .bucket(parent_kind)
            .is_some_and(|bucket| bucket.comments().iter().any(|c| &c.reference == parent));
        if !holds_parent {
            self.drop_comment(link, prefix, Some(parent_kind), DropReason::MissingParent);
            return false;
        }

        section
            .commentary
            .add_nested_comment(parent_kind, Comment::from_link(link, kind.name()))
    }

    fn resolve(
        &self,
        link: &LinkRecord,
        len: usize,
        prefix: &str,
        parent_kind: Option<&str>,
    ) -> Option<usize> {
        let reason = match resolve_section_index(&link.anchor_refs, prefix) {
            Some(index) if index < len => return Some(index),
            Some(index) => DropReason::OutOfRange { index, len },
            None => DropReason::NoMatchingAnchor,
        };
        self.drop_comment(link, prefix, parent_kind, reason);
        None
    }

    fn drop_comment(
        &self,
        link: &LinkRecord,
        prefix: &str,
        parent_kind: Option<&str>,
        reason: DropReason,
    ) {
        self.sink.warn(PlacementWarning::Unplaceable {
            reference: link.reference.clone(),
            source_ref: link.source_ref.clone(),
            prefix: prefix.to_string(),
            parent_kind: parent_kind.map(str::to_string),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use daf_fetcher::TextFragment;

    use super::*;
    use crate::test_support::{link, sections};
    use crate::warnings::CollectingSink;

    #[test]
    fn resolves_first_matching_anchor() {
        let anchors: Vec<Reference> = vec!["Y:9".into(), "X:3:1".into(), "X:5".into()];
        assert_eq!(resolve_section_index(&anchors, "X:"), Some(2));
        assert_eq!(resolve_section_index(&anchors, "Z:"), None);
        assert_eq!(resolve_section_index(&["X:0".into()], "X:"), None);
        assert_eq!(resolve_section_index(&["X:abc".into()], "X:"), None);
        assert_eq!(resolve_section_index(&[], "X:"), None);
    }

    #[test]
    fn anchored_on_compares_units() {
        let parent: Reference = "Rashi on Berakhot 2a:5:1".into();
        assert!(anchored_on(&["Rashi on Berakhot 2a:5:1".into()], &parent));
        assert!(anchored_on(&["Y:1".into(), "Rashi on Berakhot 2a:5".into()], &parent));
        assert!(!anchored_on(&["Tosafot on Berakhot 2a:5:1".into()], &parent));
        assert!(!anchored_on(&[], &parent));
    }

    #[test]
    fn places_by_anchor_under_kind() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(3);

        let rashi = link("Rashi", "Rashi on X:2:1", &["X:2:4"]);
        assert_eq!(placer.place(&rashi, &mut secs, "X:"), Some(1));

        assert!(secs[0].commentary.is_empty());
        let bucket = secs[1].commentary.bucket("Rashi").unwrap();
        assert_eq!(bucket.comments().len(), 1);
        assert_eq!(bucket.comments()[0].reference.as_str(), "Rashi on X:2:1");
        assert!(sink.is_empty());
    }

    #[test]
    fn index_equal_to_len_is_dropped() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(2);

        assert_eq!(placer.place(&link("Rashi", "R", &["X:3"]), &mut secs, "X:"), None);
        assert!(secs.iter().all(|s| s.commentary.is_empty()));
        assert!(matches!(
            sink.warnings()[0],
            PlacementWarning::Unplaceable {
                reason: DropReason::OutOfRange { index: 2, len: 2 },
                ..
            }
        ));
    }

    #[test]
    fn empty_and_unanchored_comments_are_dropped_with_warnings() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(2);

        let mut empty = link("Rashi", "R1", &["X:1"]);
        empty.he = TextFragment::Text(String::new());
        empty.text = TextFragment::List(vec![]);
        assert!(placer.place(&empty, &mut secs, "X:").is_none());
        assert!(placer.place(&link("Rashi", "R2", &["Y:1"]), &mut secs, "X:").is_none());

        let reasons: Vec<DropReason> = sink
            .warnings()
            .into_iter()
            .map(|w| match w {
                PlacementWarning::Unplaceable { reason, .. } => reason,
                other => panic!("unexpected warning {other:?}"),
            })
            .collect();
        assert_eq!(reasons, vec![DropReason::EmptyText, DropReason::NoMatchingAnchor]);
    }

    #[test]
    fn unclassified_comments_drop_silently() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(1);

        assert!(placer.place(&link("Sefer HaChinukh", "S", &["X:1"]), &mut secs, "X:").is_none());
        assert!(secs[0].commentary.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn nested_without_parent_is_refused() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(2);
        placer.place(&link("Tosafot", "T", &["X:2"]), &mut secs, "X:");

        let maharsha = link("Chidushei Agadot", "M", &["X:2:1"]);
        assert!(!placer.place_nested(&maharsha, &mut secs, "X:", "Rashi"));

        assert!(secs[1].commentary.nested("Rashi").is_none());
        assert_eq!(secs[1].commentary.comments().count(), 1);
        assert!(matches!(
            &sink.warnings()[0],
            PlacementWarning::Unplaceable {
                reason: DropReason::MissingParent,
                parent_kind: Some(parent),
                ..
            } if parent == "Rashi"
        ));
    }

    fn detail(reference: &str, commentator: &str, commentary: Vec<LinkRecord>) -> TextResponse {
        TextResponse {
            reference: reference.into(),
            title: String::new(),
            he: TextFragment::default(),
            text: TextFragment::default(),
            commentary,
            commentator: Some(commentator.into()),
        }
    }

    #[test]
    fn details_attach_under_parent_kind() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(3);
        let parent = link("Rashi", "Rashi on X 2a:3:1", &["X 2a:3"]);
        let index = placer.place(&parent, &mut secs, "X 2a:").unwrap();
        assert_eq!(index, 2);

        let detail = detail(
            "Rashi on X 2a:3:1",
            "Rashi",
            vec![
                link("Chidushei Agadot", "Maharsha 1", &["Rashi on X 2a:3:1"]),
                link("Unknown Work", "U", &["Rashi on X 2a:3:1"]),
                link("Maharam", "Maharam 1", &["Tosafot on X 2a:3:1"]),
            ],
        );

        let placed = placer.place_details(&parent.reference, "Rashi", index, &detail, &mut secs);
        assert_eq!(placed, 1);

        let nested = secs[2].commentary.nested("Rashi").unwrap();
        assert_eq!(nested.bucket("Maharsha").unwrap().comments().len(), 1);
        // The one anchored elsewhere warned, the unknown one did not.
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            &sink.warnings()[0],
            PlacementWarning::Unplaceable {
                reason: DropReason::NoMatchingAnchor,
                ..
            }
        ));
    }

    #[test]
    fn details_follow_their_parent_across_same_kind_parents() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(3);
        let exodus = link("Verses", "Exodus 12:2", &["X:1"]);
        let genesis = link("Verses", "Genesis 1:1", &["X:3"]);
        assert_eq!(placer.place(&exodus, &mut secs, "X:"), Some(0));
        let index = placer.place(&genesis, &mut secs, "X:").unwrap();
        assert_eq!(index, 2);

        let detail = detail(
            "Genesis 1:1",
            "Verses",
            vec![link("Rashi", "Rashi on Genesis 1:1:1", &["Genesis 1:1"])],
        );
        let placed = placer.place_details(&genesis.reference, "Verses", index, &detail, &mut secs);
        assert_eq!(placed, 1);

        let nested = secs[2].commentary.nested("Verses").unwrap();
        let rashi = nested.bucket("Rashi").unwrap().comments();
        assert_eq!(rashi[0].reference.as_str(), "Rashi on Genesis 1:1:1");
        assert!(secs[0].commentary.nested("Verses").is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn details_need_the_parent_in_its_section() {
        let sink = CollectingSink::new();
        let placer = CommentPlacer::new(Classifier::builtin(), &sink);
        let mut secs = sections(2);
        placer.place(&link("Verses", "Exodus 12:2", &["X:1"]), &mut secs, "X:");

        // Genesis 1:1 was never placed, so section 0 holds another verse only.
        let detail = detail(
            "Genesis 1:1",
            "Verses",
            vec![link("Rashi", "Rashi on Genesis 1:1:1", &["Genesis 1:1"])],
        );
        assert_eq!(
            placer.place_details(&"Genesis 1:1".into(), "Verses", 0, &detail, &mut secs),
            0
        );
        assert_eq!(placer.place_details(&"Genesis 1:1".into(), "Verses", 7, &detail, &mut secs), 0);

        assert!(secs[0].commentary.nested("Verses").is_none());
        assert!(matches!(
            &sink.warnings()[0],
            PlacementWarning::Unplaceable {
                reason: DropReason::MissingParent,
                ..
            }
        ));
        assert_eq!(sink.len(), 1);
    }
}
