//! Error types for daf.
//!
//! Library crates use [`DafError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all daf operations.
#[derive(Debug, thiserror::Error)]
pub enum DafError {
    /// Upstream answered with a non-2xx status, or could not be reached at all.
    ///
    /// `body` holds the bodies of every failing response in the wave, newline-joined.
    #[error("upstream error{}: {body}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport { status: Option<u16>, body: String },

    /// An upstream body was not the structured data we expected.
    #[error("decode error: {message}")]
    Decode { message: String, body: String },

    /// Primary and secondary text arrays could not be paired.
    #[error("primary length ({primary}) != secondary length ({secondary})")]
    UnequalLengths { primary: usize, secondary: usize },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A tractate/amud locator could not be understood.
    #[error("invalid locator: {message}")]
    InvalidLocator { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DafError>;

/// Stable internal codes for downstream branching.
///
/// The numeric values are part of the public contract and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    UpstreamHttp = 1,
    UnequalLengths = 2,
    Decode = 3,
    Config = 4,
    Io = 5,
    InvalidLocator = 6,
}

/// How a caller should treat a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Upstream may recover; retrying the whole request is reasonable.
    Retryable,
    /// Retrying with the same input will fail the same way.
    Fatal,
}

impl DafError {
    /// Create a transport error from a status and the failing body text.
    pub fn transport(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error, keeping the offending body for diagnosis.
    pub fn decode(msg: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
            body: body.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a locator error from any displayable message.
    pub fn invalid_locator(msg: impl Into<String>) -> Self {
        Self::InvalidLocator {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::UpstreamHttp,
            Self::UnequalLengths { .. } => ErrorCode::UnequalLengths,
            Self::Decode { .. } => ErrorCode::Decode,
            Self::Config { .. } => ErrorCode::Config,
            Self::Io { .. } => ErrorCode::Io,
            Self::InvalidLocator { .. } => ErrorCode::InvalidLocator,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Transport { .. } => Severity::Retryable,
            _ => Severity::Fatal,
        }
    }

    /// Status a presentation layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidLocator { .. } => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DafError::config("missing base_url");
        assert_eq!(err.to_string(), "config error: missing base_url");

        let err = DafError::transport(Some(503), "busy\ndown");
        assert_eq!(err.to_string(), "upstream error (HTTP 503): busy\ndown");

        let err = DafError::transport(None, "connection refused");
        assert_eq!(err.to_string(), "upstream error: connection refused");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(DafError::transport(Some(500), "").code() as u8, 1);
        let unequal = DafError::UnequalLengths {
            primary: 3,
            secondary: 1,
        };
        assert_eq!(unequal.code() as u8, 2);
        assert_eq!(DafError::decode("bad json", "<html>").code() as u8, 3);
    }

    #[test]
    fn only_transport_is_retryable() {
        assert_eq!(
            DafError::transport(Some(502), "").severity(),
            Severity::Retryable
        );
        assert_eq!(DafError::decode("x", "").severity(), Severity::Fatal);
        assert_eq!(DafError::decode("x", "").http_status(), 500);
    }
}
