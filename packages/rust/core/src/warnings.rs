//! Non-fatal diagnostics raised while building a document.
//!
//! Placement and dedupe report through a [`WarningSink`] instead of failing
//! the request. The default sink writes to `tracing`; tests collect warnings.

use std::fmt;
use std::sync::Mutex;

use tracing::warn;

use daf_shared::Reference;

/// Why a comment could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// No anchor starts with the section prefix, or its segment is not a positive number.
    NoMatchingAnchor,
    /// Both text fields are empty.
    EmptyText,
    /// The anchor resolved past the last section.
    OutOfRange { index: usize, len: usize },
    /// The section holds no top-level comment of the parent kind.
    MissingParent,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingAnchor => f.write_str("no matching anchor"),
            Self::EmptyText => f.write_str("empty text"),
            Self::OutOfRange { index, len } => {
                write!(f, "section index {index} out of range ({len} sections)")
            }
            Self::MissingParent => f.write_str("no top-level comment of the parent kind"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementWarning {
    /// A comment was dropped.
    Unplaceable {
        reference: Reference,
        source_ref: Reference,
        prefix: String,
        /// Set for nested placement.
        parent_kind: Option<String>,
        reason: DropReason,
    },
    /// The same reference sits at both levels and no rule says which to keep.
    DuplicateConflict {
        section: Reference,
        reference: Reference,
        top_kind: String,
        top_source_ref: Reference,
        nested_kind: String,
        nested_source_ref: Reference,
    },
    /// Post-processing left a document with no sections.
    EmptyDocument { locator: String },
}

impl fmt::Display for PlacementWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unplaceable {
                reference,
                source_ref,
                prefix,
                parent_kind,
                reason,
            } => {
                write!(f, "dropped comment {reference} (source {source_ref}) under {prefix}")?;
                if let Some(parent) = parent_kind {
                    write!(f, " nested in {parent}")?;
                }
                write!(f, ": {reason}")
            }
            Self::DuplicateConflict {
                section,
                reference,
                top_kind,
                top_source_ref,
                nested_kind,
                nested_source_ref,
            } => write!(
                f,
                "unresolved duplicate {reference} in {section}: \
                 top-level {top_kind} ({top_source_ref}) vs nested {nested_kind} ({nested_source_ref})"
            ),
            Self::EmptyDocument { locator } => write!(f, "document {locator} has no sections"),
        }
    }
}

/// Receives non-fatal warnings. Shared across a request, hence `Sync`.
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: PlacementWarning);
}

/// Logs every warning at `WARN` level.
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, warning: PlacementWarning) {
        match &warning {
            PlacementWarning::Unplaceable {
                reference, reason, ..
            } => warn!(reference = %reference, reason = %reason, "{warning}"),
            PlacementWarning::DuplicateConflict { reference, .. } => {
                warn!(reference = %reference, "{warning}")
            }
            PlacementWarning::EmptyDocument { locator } => warn!(locator, "{warning}"),
        }
    }
}

/// Keeps warnings in memory, in arrival order.
#[derive(Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<PlacementWarning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<PlacementWarning> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PlacementWarning>> {
        // A panicking writer cannot leave a Vec half-pushed.
        self.warnings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl WarningSink for CollectingSink {
    fn warn(&self, warning: PlacementWarning) {
        self.lock().push(warning);
    }
}
