//! Comments and the per-section commentary tree.
//!
//! A [`CommentaryTree`] groups comments by kind, in the order kinds first
//! appear. Any kind may carry one nested tree holding second-level commentary
//! on that kind's comments.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use daf_fetcher::LinkRecord;
use daf_shared::{Reference, is_masechet_ref};

/// Kind whose source locators get truncated to the page.
pub const MESORAT_HASHAS: &str = "Mesorat Hashas";

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// One classified, formatted annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Primary-language text.
    pub he: String,
    /// Secondary-language text.
    pub en: String,
    #[serde(rename = "ref")]
    pub reference: Reference,
    #[serde(rename = "sourceRef")]
    pub source_ref: Reference,
    #[serde(rename = "sourceHeRef")]
    pub source_he_ref: Reference,
    /// Canonical kind name; the tree key, not part of the comment's JSON.
    #[serde(skip)]
    pub kind: String,
}

impl Comment {
    /// Build a comment of `kind` from an upstream annotation, running both
    /// texts through the formatting filters for that kind.
    pub fn from_link(link: &LinkRecord, kind: &str) -> Self {
        let he = link.he.flatten();
        let mut en = link.text.flatten();
        // Upstream occasionally repeats the primary text in the secondary slot.
        if he == en {
            en.clear();
        }

        let mut comment = Self {
            he: daf_formatting::primary_comment_text(&he, kind),
            en: daf_formatting::secondary_comment_text(&en, kind),
            reference: link.reference.clone(),
            source_ref: link.source_ref.clone(),
            source_he_ref: link.source_he_ref.clone(),
            kind: kind.to_string(),
        };
        if kind == MESORAT_HASHAS {
            truncate_mesorat_hashas_refs(&mut comment);
        }
        comment
    }
}

/// Mesorat Hashas cross-references into other tractates point at the whole
/// page rather than one segment of it.
pub fn truncate_mesorat_hashas_refs(comment: &mut Comment) {
    if !is_masechet_ref(comment.source_ref.as_str()) {
        return;
    }
    comment.source_ref = Reference::new(comment.source_ref.unit());
    comment.source_he_ref = Reference::new(comment.source_he_ref.unit());
}

// ---------------------------------------------------------------------------
// CommentaryTree
// ---------------------------------------------------------------------------

/// Comments of one kind, plus optional commentary on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bucket {
    #[serde(skip)]
    kind: String,
    comments: Vec<Comment>,
    /// Arrival sequence number of each entry in `comments`.
    #[serde(skip)]
    arrivals: Vec<u64>,
    #[serde(rename = "commentary", skip_serializing_if = "nested_is_empty")]
    nested: Option<CommentaryTree>,
}

fn nested_is_empty(nested: &Option<CommentaryTree>) -> bool {
    nested.as_ref().is_none_or(CommentaryTree::is_empty)
}

impl Bucket {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn nested(&self) -> Option<&CommentaryTree> {
        self.nested.as_ref()
    }
}

/// Per-section grouping of comments by kind, insertion-ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentaryTree {
    buckets: Vec<Bucket>,
    next_arrival: u64,
}

impl CommentaryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `comment` under its kind.
    pub fn add_comment(&mut self, comment: Comment) {
        let arrival = self.next_arrival;
        self.next_arrival += 1;
        let bucket = self.bucket_mut(&comment.kind);
        bucket.comments.push(comment);
        bucket.arrivals.push(arrival);
    }

    /// Append `comment` to the nested tree of `parent_kind`.
    ///
    /// Refuses (returns `false`, inserts nothing) unless this tree already holds
    /// at least one top-level comment of `parent_kind`.
    pub fn add_nested_comment(&mut self, parent_kind: &str, comment: Comment) -> bool {
        let Some(parent) = self
            .buckets
            .iter_mut()
            .find(|b| b.kind == parent_kind && !b.comments.is_empty())
        else {
            return false;
        };
        parent
            .nested
            .get_or_insert_with(CommentaryTree::new)
            .add_comment(comment);
        true
    }

    /// Remove every top-level comment with this reference, whatever its kind.
    pub fn remove_comment_with_ref(&mut self, reference: &Reference) {
        for bucket in &mut self.buckets {
            let comments = std::mem::take(&mut bucket.comments);
            let arrivals = std::mem::take(&mut bucket.arrivals);
            (bucket.comments, bucket.arrivals) = comments
                .into_iter()
                .zip(arrivals)
                .filter(|(c, _)| &c.reference != reference)
                .unzip();
        }
    }

    /// Remove every comment with this reference from `parent_kind`'s nested tree.
    pub fn remove_nested_comment_with_ref(&mut self, parent_kind: &str, reference: &Reference) {
        if let Some(nested) = self
            .buckets
            .iter_mut()
            .find(|b| b.kind == parent_kind)
            .and_then(|b| b.nested.as_mut())
        {
            nested.remove_comment_with_ref(reference);
        }
    }

    /// All top-level comments, grouped by kind in first-appearance order.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.buckets.iter().flat_map(|b| b.comments.iter())
    }

    /// All top-level comments in the order they were added, across kinds.
    pub fn comments_by_arrival(&self) -> Vec<&Comment> {
        let mut entries: Vec<(u64, &Comment)> = self
            .buckets
            .iter()
            .flat_map(|b| b.arrivals.iter().copied().zip(&b.comments))
            .collect();
        entries.sort_by_key(|(arrival, _)| *arrival);
        entries.into_iter().map(|(_, comment)| comment).collect()
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket(&self, kind: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.kind == kind)
    }

    /// Nested tree under `parent_kind`, if one was ever created.
    pub fn nested(&self, parent_kind: &str) -> Option<&CommentaryTree> {
        self.bucket(parent_kind).and_then(Bucket::nested)
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.bucket(kind).is_some_and(|b| !b.comments.is_empty())
    }

    /// True when the tree would serialize to `{}`.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.comments.is_empty())
    }

    fn bucket_mut(&mut self, kind: &str) -> &mut Bucket {
        let idx = match self.buckets.iter().position(|b| b.kind == kind) {
            Some(idx) => idx,
            None => {
                self.buckets.push(Bucket::new(kind));
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[idx]
    }
}

impl Serialize for CommentaryTree {
    /// `{kind: {comments: [...], commentary?: {...}}}`, skipping kinds with no
    /// top-level comments even if their nested tree has content.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let visible: Vec<&Bucket> = self
            .buckets
            .iter()
            .filter(|b| !b.comments.is_empty())
            .collect();
        let mut map = serializer.serialize_map(Some(visible.len()))?;
        for bucket in visible {
            map.serialize_entry(&bucket.kind, bucket)?;
        }
        map.end()
    }
}
