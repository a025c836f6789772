//! End-to-end request pipeline: locator → fetch → assemble → place → post-process.

use std::time::Instant;

use tracing::{debug, info, instrument};

use daf_fetcher::{Fetcher, LinkRecord, TextResponse};
use daf_shared::{Reference, Result};

use crate::classifier::Classifier;
use crate::document::Document;
use crate::locator::{AmudLocator, RangeLocator};
use crate::placement::CommentPlacer;
use crate::postprocess::{post_process_all, post_process_section};
use crate::sections::assemble;
use crate::warnings::{PlacementWarning, WarningSink};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each amud of a range is requested.
    fn amud_started(&self, locator: &AmudLocator, current: usize, total: usize);
    /// Called when the wave-2 detail fetch has completed.
    fn details_fetched(&self, count: usize);
    /// Called when every requested amud has been built.
    fn done(&self, documents: &[Document]);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn amud_started(&self, _locator: &AmudLocator, _current: usize, _total: usize) {}
    fn details_fetched(&self, _count: usize) {}
    fn done(&self, _documents: &[Document]) {}
}

/// Fetch and build the document for one amud.
///
/// Fails on any upstream or decode error, or when the primary and secondary
/// texts cannot be paired. Comments that cannot be placed only produce
/// warnings on `sink`.
pub async fn handle_request(
    fetcher: &Fetcher,
    locator: &AmudLocator,
    sink: &dyn WarningSink,
) -> Result<Document> {
    handle_request_with_progress(fetcher, locator, sink, &SilentProgress).await
}

#[instrument(skip_all, fields(locator = %locator))]
async fn handle_request_with_progress(
    fetcher: &Fetcher,
    locator: &AmudLocator,
    sink: &dyn WarningSink,
    progress: &dyn ProgressReporter,
) -> Result<Document> {
    let start = Instant::now();
    let classifier = Classifier::builtin();

    progress.phase("Fetching text and links");
    let primary = fetcher.fetch_primary(&locator.upstream_ref()).await?;

    let candidates: Vec<LinkRecord> = primary
        .links
        .into_iter()
        .filter(|link| classifier.classify_link(link).is_some())
        .collect();
    let references: Vec<Reference> = candidates.iter().map(|l| l.reference.clone()).collect();

    progress.phase("Fetching commentary");
    let details = fetcher.fetch_details(&references).await?;
    progress.details_fetched(details.len());

    let document = build_document(locator, primary.text, candidates, details, sink)?;
    info!(
        sections = document.sections.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "document built"
    );
    Ok(document)
}

/// Build a document from already-fetched upstream data.
///
/// `candidates` and `details` are parallel: `details[i]` is the detail
/// response for `candidates[i]`. Deterministic for identical input.
pub fn build_document(
    locator: &AmudLocator,
    text: TextResponse,
    mut candidates: Vec<LinkRecord>,
    details: Vec<TextResponse>,
    sink: &dyn WarningSink,
) -> Result<Document> {
    let classifier = Classifier::builtin();
    let placer = CommentPlacer::new(classifier, sink);

    // Summary links carry no text; take it from the detail responses.
    for (link, detail) in candidates.iter_mut().zip(&details) {
        link.he = detail.he.clone();
        link.text = detail.text.clone();
    }

    let main_ref = text.reference.as_str();
    let mut sections = assemble(text.he.segments(), text.text.segments(), main_ref)?;
    let prefix = format!("{main_ref}:");

    // Top-level placement waits for wave 2: empty summary links would all be
    // dropped as textless otherwise.
    let parent_sections: Vec<Option<usize>> = candidates
        .iter()
        .map(|link| placer.place(link, &mut sections, &prefix))
        .collect();
    let inline = text
        .commentary
        .iter()
        .filter_map(|link| placer.place(link, &mut sections, &prefix))
        .count();
    let placed = parent_sections.iter().flatten().count() + inline;

    let mut nested = 0;
    for ((link, detail), section) in candidates.iter().zip(&details).zip(&parent_sections) {
        let (Some(index), Some(kind)) = (section, classifier.classify_link(link)) else {
            continue;
        };
        nested += placer.place_details(&link.reference, kind.name(), *index, detail, &mut sections);
    }
    debug!(placed, nested, "comments placed");

    for section in &mut sections {
        post_process_section(section, sink);
    }
    let sections = post_process_all(sections, locator.masechet(), locator.amud());
    if sections.is_empty() {
        sink.warn(PlacementWarning::EmptyDocument {
            locator: locator.to_string(),
        });
    }

    Ok(Document {
        id: locator.document_id().to_string(),
        title: text.title,
        sections,
    })
}

/// Fetch every amud in `range`, one after another.
#[instrument(skip_all, fields(start = %range.start, end = %range.end.amud()))]
pub async fn handle_range(
    fetcher: &Fetcher,
    range: &RangeLocator,
    sink: &dyn WarningSink,
    progress: &dyn ProgressReporter,
) -> Result<Vec<Document>> {
    let amudim = range.amudim();
    let total = amudim.len();
    let mut documents = Vec::with_capacity(total);

    for (i, locator) in amudim.iter().enumerate() {
        progress.amud_started(locator, i + 1, total);
        documents.push(handle_request_with_progress(fetcher, locator, sink, progress).await?);
    }

    progress.done(&documents);
    Ok(documents)
}
