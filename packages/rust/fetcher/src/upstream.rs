//! Wire types for the upstream text provider.
//!
//! Only the fields the aggregation engine reads are modeled; everything else in
//! the upstream payload is ignored.

use serde::Deserialize;

use daf_shared::Reference;

/// Separator used when a nested text value has to be collapsed into one string.
const FRAGMENT_JOINER: &str = "<br>";

// ---------------------------------------------------------------------------
// TextFragment
// ---------------------------------------------------------------------------

/// A text value as upstream sends it: a plain string, or an array of fragments
/// (nested arbitrarily deep for multi-level references).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TextFragment {
    Text(String),
    List(Vec<TextFragment>),
}

impl Default for TextFragment {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl TextFragment {
    /// The top-level fragments, each collapsed to a single string.
    ///
    /// A bare non-empty string counts as one fragment; an empty string as none.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::Text(text) if text.is_empty() => Vec::new(),
            Self::Text(text) => vec![text.clone()],
            Self::List(items) => items.iter().map(Self::flatten).collect(),
        }
    }

    /// Collapse the whole value into one string.
    pub fn flatten(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::flatten)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(FRAGMENT_JOINER),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.iter().all(Self::is_empty),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Body of `GET /texts/{ref}`, for both the primary document and comment details.
#[derive(Debug, Clone, Deserialize)]
pub struct TextResponse {
    /// Normalized reference of what was returned (e.g. `Berakhot 2a`).
    #[serde(rename = "ref")]
    pub reference: Reference,

    #[serde(default)]
    pub title: String,

    /// Primary-language text.
    #[serde(default)]
    pub he: TextFragment,

    /// Secondary-language text.
    #[serde(default)]
    pub text: TextFragment,

    /// Comments anchored on this text.
    #[serde(default)]
    pub commentary: Vec<LinkRecord>,

    /// Set on comment-detail responses.
    #[serde(default)]
    pub commentator: Option<String>,
}

/// One annotation, as found in `GET /links/{ref}` or a text's `commentary` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "ref")]
    pub reference: Reference,

    #[serde(rename = "sourceRef", default)]
    pub source_ref: Reference,

    #[serde(rename = "sourceHeRef", default)]
    pub source_he_ref: Reference,

    /// Every segment reference the annotation is anchored to.
    #[serde(rename = "anchorRefExpanded", default)]
    pub anchor_refs: Vec<Reference>,

    #[serde(rename = "collectiveTitle", default)]
    pub collective_title: CollectiveTitle,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(rename = "type", default)]
    pub link_type: Option<String>,

    #[serde(default)]
    pub he: TextFragment,

    #[serde(default)]
    pub text: TextFragment,
}

/// Display name of the work an annotation belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectiveTitle {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub he: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_fragment_shapes() {
        let flat: TextFragment = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(flat.segments(), vec!["abc".to_string()]);

        let list: TextFragment = serde_json::from_value(json!(["a", ["b", "c"], ""])).unwrap();
        assert_eq!(list.segments(), vec!["a", "b<br>c", ""]);
        assert_eq!(list.flatten(), "a<br>b<br>c");

        let empty: TextFragment = serde_json::from_value(json!([])).unwrap();
        assert!(empty.is_empty());
        assert!(TextFragment::default().segments().is_empty());
    }

    #[test]
    fn link_record_defaults_missing_fields() {
        let link: LinkRecord = serde_json::from_value(json!({
            "ref": "Rashi on Berakhot 2a:1:1",
            "anchorRefExpanded": ["Berakhot 2a:1"],
            "collectiveTitle": {"en": "Rashi", "he": "רש\"י"},
            "type": "commentary",
        }))
        .unwrap();
        assert_eq!(link.reference.as_str(), "Rashi on Berakhot 2a:1:1");
        assert_eq!(link.collective_title.en, "Rashi");
        assert_eq!(link.link_type.as_deref(), Some("commentary"));
        assert!(link.category.is_none());
        assert!(link.he.is_empty());
    }

    #[test]
    fn text_response_parses() {
        let response: TextResponse = serde_json::from_value(json!({
            "ref": "Berakhot 2a",
            "title": "Berakhot 2a",
            "he": ["א", "ב"],
            "text": ["a", "b"],
            "commentary": [],
            "sections": [2],
        }))
        .unwrap();
        assert_eq!(response.he.segments().len(), 2);
        assert!(response.commentator.is_none());
    }
}
