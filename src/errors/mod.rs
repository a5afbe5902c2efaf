//! Unified error handling module
use crate::formats::Format;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fetching, parsing or caching element sets
#[derive(Debug, Error)]
pub enum ElementsError {
    /// The payload does not have the structure its format requires
    #[error("malformed {format} input: {reason}")]
    MalformedInput { format: Format, reason: String },

    /// One field of one record could not be decoded or validated
    #[error("field {field} could not be decoded from {value:?}: {reason}")]
    FieldDecode {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("could not read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store I/O error at {}: {source}", path.display())]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store encoding error: {0}")]
    StoreEncode(#[from] serde_json::Error),

    #[error("invalid store entry name {0:?}")]
    InvalidEntryName(String),

    /// The entry claims to have been produced after the current time
    #[error("store entry {name:?} is dated in the future ({modified})")]
    FutureModification {
        name: String,
        modified: DateTime<Utc>,
    },

    #[error("no usable cache directory on this platform")]
    NoCacheDir,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("request to {url} timed out after {}s", after.as_secs())]
    Timeout { url: String, after: Duration },

    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
}

impl ElementsError {
    pub fn malformed(format: Format, reason: impl Into<String>) -> Self {
        ElementsError::MalformedInput {
            format,
            reason: reason.into(),
        }
    }

    pub fn field(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ElementsError::FieldDecode {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ElementsError::StoreIo {
            path: path.into(),
            source,
        }
    }

    /// Whether repeating the same request later could succeed.
    /// The crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            ElementsError::Timeout { .. } => true,
            ElementsError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ElementsError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised by the magnitude and orbit helpers
#[derive(Debug, Error)]
pub enum AstroError {
    #[error("propagation failed: {0}")]
    Propagation(String),

    #[error("no intrinsic magnitude known for NORAD {0}")]
    IntrinsicMagnitudeNotFound(u32),

    #[error("no area and albedo known for NORAD {0}")]
    AreaAndAlbedoNotFound(u32),

    #[error("could not calculate orbit path: {0}")]
    OrbitPath(String),
}

/// Type alias for element results
pub type ElementsResult<T> = Result<T, ElementsError>;
