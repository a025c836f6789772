//! Shared types, error model, and configuration for daf.
//!
//! This crate is the foundation depended on by all other daf crates.
//! It provides:
//! - [`DafError`]: the unified error type, with stable codes and severities
//! - Domain types ([`Reference`]) and the tractate catalog ([`books`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod books;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use books::{MASECHTOT, Masechet, canonical_masechet_name, is_masechet_ref};
pub use config::{
    AppConfig, FetchConfig, FetchLimitsConfig, UpstreamConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate,
};
pub use error::{DafError, ErrorCode, Result, Severity};
pub use types::Reference;
