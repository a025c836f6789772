//! Reconciliation of comments that appear both at the top level and nested.
//!
//! Upstream links a comment both to the page and to the commentary it sits on,
//! so after placement the same reference can show up twice in a section. A
//! fixed table over (top kind, nested kind) decides which copy goes.

use std::collections::HashMap;

use daf_shared::Reference;

use crate::document::Section;
use crate::warnings::{PlacementWarning, WarningSink};

/// Verses are quoted everywhere; the top-level copy is the useful one.
pub const VERSE_KIND: &str = "Verses";

/// Kinds upstream tends to link at the second level as well as the first.
pub const OVER_DUPLICATED_NESTED_KINDS: &[&str] = &["Maharsha", "Maharshal", "Meir Lublin"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalStrategy {
    RemoveTopLevel,
    RemoveNested,
    /// Keep both and report the conflict.
    KeepBoth,
}

/// Decide which copy of a duplicated comment to drop.
pub fn removal_strategy(top_kind: &str, nested_kind: &str) -> RemovalStrategy {
    if top_kind == VERSE_KIND {
        RemovalStrategy::RemoveNested
    } else if OVER_DUPLICATED_NESTED_KINDS.contains(&nested_kind) {
        RemovalStrategy::RemoveTopLevel
    } else {
        RemovalStrategy::KeepBoth
    }
}

enum Removal {
    TopLevel(Reference),
    Nested { parent_kind: String, reference: Reference },
}

/// Apply [`removal_strategy`] to every top-level/nested collision in `section`.
///
/// Collisions are matched against the earliest-added top-level comment
/// carrying each reference, whatever its kind. Returns the number of
/// collisions found.
pub fn resolve_duplicates(section: &mut Section, sink: &dyn WarningSink) -> usize {
    let tree = &section.commentary;

    let mut top_level: HashMap<&Reference, (&str, &Reference)> = HashMap::new();
    for comment in tree.comments_by_arrival() {
        top_level
            .entry(&comment.reference)
            .or_insert((comment.kind.as_str(), &comment.source_ref));
    }

    let mut removals = Vec::new();
    let mut collisions = 0;
    for bucket in tree.buckets() {
        let Some(nested) = bucket.nested() else {
            continue;
        };
        for nested_comment in nested.comments() {
            let Some(&(top_kind, top_source_ref)) = top_level.get(&nested_comment.reference)
            else {
                continue;
            };
            collisions += 1;
            match removal_strategy(top_kind, &nested_comment.kind) {
                RemovalStrategy::RemoveTopLevel => {
                    removals.push(Removal::TopLevel(nested_comment.reference.clone()));
                }
                RemovalStrategy::RemoveNested => removals.push(Removal::Nested {
                    parent_kind: bucket.kind().to_string(),
                    reference: nested_comment.reference.clone(),
                }),
                RemovalStrategy::KeepBoth => sink.warn(PlacementWarning::DuplicateConflict {
                    section: section.reference.clone(),
                    reference: nested_comment.reference.clone(),
                    top_kind: top_kind.to_string(),
                    top_source_ref: top_source_ref.clone(),
                    nested_kind: nested_comment.kind.clone(),
                    nested_source_ref: nested_comment.source_ref.clone(),
                }),
            }
        }
    }

    for removal in removals {
        match removal {
            Removal::TopLevel(reference) => section.commentary.remove_comment_with_ref(&reference),
            Removal::Nested {
                parent_kind,
                reference,
            } => section
                .commentary
                .remove_nested_comment_with_ref(&parent_kind, &reference),
        }
    }
    collisions
}
