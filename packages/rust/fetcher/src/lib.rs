//! Upstream access for daf.
//!
//! This crate provides:
//! - [`upstream`]: wire types for the text provider's JSON responses
//! - [`orchestrator`]: the two-wave, bounded-concurrency [`Fetcher`]
//!
//! It is the only daf crate that performs I/O.

pub mod orchestrator;
pub mod upstream;

pub use orchestrator::{Fetcher, PrimaryFetch};
pub use upstream::{CollectiveTitle, LinkRecord, TextFragment, TextResponse};
