//! Commentary classification.
//!
//! Maps an annotation's collective title and tags to a canonical commentary
//! kind. Kinds are held in priority order and the first match wins, so the
//! order of [`Classifier::new`]'s catalog is load-bearing.

use std::sync::LazyLock;

use regex::Regex;

use daf_fetcher::LinkRecord;

// ---------------------------------------------------------------------------
// CommentaryKind
// ---------------------------------------------------------------------------

/// One catalog entry: a canonical name plus the rules that select it.
#[derive(Debug, Clone)]
pub struct CommentaryKind {
    name: &'static str,
    category: Option<&'static str>,
    kind_type: Option<&'static str>,
    name_pattern: Option<Regex>,
}

impl CommentaryKind {
    /// A kind matched only by its exact canonical name.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            category: None,
            kind_type: None,
            name_pattern: None,
        }
    }

    /// Also match annotations whose `category` tag equals `category`.
    pub fn with_category(mut self, category: &'static str) -> Self {
        self.category = Some(category);
        self
    }

    /// Also match annotations whose `type` tag equals `kind_type`.
    pub fn with_type(mut self, kind_type: &'static str) -> Self {
        self.kind_type = Some(kind_type);
        self
    }

    /// Also match annotation names containing a match for `pattern`.
    ///
    /// Patterns are compile-time constants; an invalid one is a programming error.
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.name_pattern = Some(Regex::new(pattern).expect("valid commentary pattern"));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, name: &str, category: Option<&str>, kind_type: Option<&str>) -> bool {
        name == self.name
            || both_equal(self.category, category)
            || both_equal(self.kind_type, kind_type)
            || self
                .name_pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(name))
    }
}

/// True only when both sides define the property and agree on it.
fn both_equal(ours: Option<&str>, theirs: Option<&str>) -> bool {
    matches!((ours, theirs), (Some(a), Some(b)) if a == b)
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Holds commentary kinds in priority order.
#[derive(Debug, Clone)]
pub struct Classifier {
    kinds: Vec<CommentaryKind>,
}

static BUILTIN: LazyLock<Classifier> = LazyLock::new(Classifier::new);

impl Classifier {
    /// The built-in catalog.
    pub fn new() -> Self {
        Self::with_kinds(vec![
            CommentaryKind::named("Translation"),
            CommentaryKind::named("Verses").with_category("Tanakh"),
            CommentaryKind::named("Mishnah").with_category("Mishnah"),
            CommentaryKind::named("Tosefta").with_pattern("^Tosefta "),
            CommentaryKind::named("Rashi"),
            CommentaryKind::named("Tosafot"),
            CommentaryKind::named("Rabbeinu Chananel").with_pattern("^Rabbeinu Chananel on .*"),
            CommentaryKind::named("Ramban"),
            CommentaryKind::named("Rashba"),
            CommentaryKind::named("Maharsha")
                .with_pattern("(Chidushei Halachot|Chidushei Agadot)"),
            CommentaryKind::named("Maharshal")
                .with_pattern("(Chokhmat Shlomo on .*|Chokhmat Shlomo)"),
            CommentaryKind::named("Meir Lublin").with_pattern("^Maharam$"),
            CommentaryKind::named("Rosh").with_pattern("^Rosh on "),
            CommentaryKind::named("Ritva"),
            CommentaryKind::named("Rav Nissim Gaon").with_pattern("^Rav Nissim Gaon on "),
            CommentaryKind::named("Shulchan Arukh").with_pattern("^Shulchan Arukh, "),
            CommentaryKind::named("Mishneh Torah").with_pattern("^Mishneh Torah, "),
            CommentaryKind::named("Mesorat Hashas").with_type("mesorat hashas"),
            CommentaryKind::named("Jastrow"),
            CommentaryKind::named("Steinsaltz"),
        ])
    }

    /// A classifier over a caller-supplied catalog, evaluated in the given order.
    pub fn with_kinds(kinds: Vec<CommentaryKind>) -> Self {
        Self { kinds }
    }

    /// Shared instance of the built-in catalog.
    pub fn builtin() -> &'static Classifier {
        &BUILTIN
    }

    /// First kind whose rules match, or `None` if the annotation is not wanted.
    pub fn classify(
        &self,
        name: &str,
        category: Option<&str>,
        kind_type: Option<&str>,
    ) -> Option<&CommentaryKind> {
        self.kinds
            .iter()
            .find(|kind| kind.matches(name, category, kind_type))
    }

    /// Classify an upstream annotation by its collective title and tags.
    pub fn classify_link(&self, link: &LinkRecord) -> Option<&CommentaryKind> {
        self.classify(
            &link.collective_title.en,
            link.category.as_deref(),
            link.link_type.as_deref(),
        )
    }

    pub fn kinds(&self) -> &[CommentaryKind] {
        &self.kinds
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
