//! The request-scoped output model.

use serde::Serialize;

use daf_shared::Reference;

use crate::commentary::CommentaryTree;

/// One aggregated unit (an amud), ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub sections: Vec<Section>,
}

/// One segment of the primary text with its commentary.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// Primary-language text.
    pub he: String,
    /// Secondary-language text.
    pub en: String,
    #[serde(rename = "ref")]
    pub reference: Reference,
    pub commentary: CommentaryTree,
    /// The section is the closing "hadran" formula of a chapter.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hadran: bool,
    /// A Steinsaltz comment marks this section as opening a new topic.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub steinsaltz_start_of_sugya: bool,
    /// Stand-in content; nothing here came from upstream.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl Section {
    pub fn new(reference: impl Into<Reference>, he: String, en: String) -> Self {
        Self {
            he,
            en,
            reference: reference.into(),
            commentary: CommentaryTree::new(),
            hadran: false,
            steinsaltz_start_of_sugya: false,
            synthetic: false,
        }
    }
}
