//! Two-wave fan-out/fan-in fetching against the upstream text provider.
//!
//! Wave 1 fetches the primary text and its link summaries concurrently. Wave 2
//! fetches full detail for a list of comment references, in sequential batches
//! of at most `max_concurrent_comments` concurrent requests. Results always come
//! back in request order. Any failure aborts the whole wave; nothing is retried.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use daf_shared::{DafError, FetchConfig, Reference, Result};

use crate::upstream::{LinkRecord, TextResponse};

/// User-Agent string for upstream requests.
const USER_AGENT: &str = concat!("daf/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Output of wave 1.
#[derive(Debug, Clone)]
pub struct PrimaryFetch {
    /// The primary document, including its inline comments.
    pub text: TextResponse,
    /// Summary annotations (no text) for the same reference.
    pub links: Vec<LinkRecord>,
}

/// Status and body of one upstream call, before validation.
#[derive(Debug, Clone)]
struct RawResponse {
    status: u16,
    body: String,
}

impl RawResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Drives both fetch waves. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct Fetcher {
    config: FetchConfig,
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DafError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Wave 1: primary text and link summaries, fetched concurrently.
    #[instrument(skip_all, fields(reference = %reference))]
    pub async fn fetch_primary(&self, reference: &str) -> Result<PrimaryFetch> {
        let text_url = self.endpoint(
            "texts",
            reference,
            &[("context", "0"), ("commentary", "0"), ("wrapLinks", "0")],
        )?;
        let links_url = self.endpoint("links", reference, &[("with_text", "0")])?;

        let (text, links) = tokio::join!(
            get(&self.client, text_url),
            get(&self.client, links_url)
        );
        let responses = [text?, links?];
        ensure_success(&responses)?;

        let [text, links] = responses;
        let text: TextResponse = decode(text)?;
        let links: Vec<LinkRecord> = decode(links)?;

        info!(
            resolved = %text.reference,
            inline_comments = text.commentary.len(),
            links = links.len(),
            "primary text fetched"
        );

        Ok(PrimaryFetch { text, links })
    }

    /// Wave 2: full detail for each reference, in input order.
    ///
    /// At most `max_concurrent_comments` requests are in flight at once: each
    /// batch runs fully concurrently, and the next batch starts only after the
    /// previous one has completed.
    #[instrument(skip_all, fields(count = references.len()))]
    pub async fn fetch_details(&self, references: &[Reference]) -> Result<Vec<TextResponse>> {
        let batch_size = self.config.max_concurrent_comments.max(1);
        let mut results = Vec::with_capacity(references.len());

        for (batch_index, batch) in references.chunks(batch_size).enumerate() {
            debug!(batch = batch_index, size = batch.len(), "fetching comment batch");

            let mut handles = Vec::with_capacity(batch.len());
            for reference in batch {
                let url = self.endpoint(
                    "texts",
                    reference.as_str(),
                    &[("context", "0"), ("commentary", "1"), ("wrapLinks", "0")],
                )?;
                let client = self.client.clone();
                handles.push(tokio::spawn(async move { get(&client, url).await }));
            }

            let mut responses = Vec::with_capacity(handles.len());
            for handle in handles {
                let response = handle
                    .await
                    .map_err(|e| DafError::transport(None, format!("fetch task failed: {e}")))??;
                responses.push(response);
            }

            ensure_success(&responses)?;
            for response in responses {
                results.push(decode(response)?);
            }
        }

        info!(fetched = results.len(), "comment details fetched");
        Ok(results)
    }

    /// `{base_url}/{api}/{reference}?{params}`, with the reference percent-encoded
    /// as a single path segment.
    fn endpoint(&self, api: &str, reference: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            DafError::config(format!("invalid base_url '{}': {e}", self.config.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DafError::config(format!("base_url '{}' cannot be a base", self.config.base_url))
            })?
            .pop_if_empty()
            .push(api)
            .push(reference);
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn get(client: &Client, url: Url) -> Result<RawResponse> {
    debug!(%url, "GET");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| DafError::transport(None, format!("{url}: {e}")))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| DafError::transport(Some(status), format!("{url}: body read failed: {e}")))?;

    Ok(RawResponse { status, body })
}

/// Fail with every non-2xx body in the wave, so one error shows them all.
fn ensure_success(responses: &[RawResponse]) -> Result<()> {
    let failed: Vec<&RawResponse> = responses.iter().filter(|r| !r.is_success()).collect();
    let Some(first) = failed.first() else {
        return Ok(());
    };

    let body = failed
        .iter()
        .map(|r| r.body.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Err(DafError::transport(Some(first.status), body))
}

fn decode<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    serde_json::from_str(&response.body)
        .map_err(|e| DafError::decode(e.to_string(), response.body))
}
