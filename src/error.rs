use thiserror::Error;

use crate::util::backend::StorageBackend;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no storage backend selected")]
    NoBackendSelected,

    #[error("storage is disconnected")]
    Disconnected,

    #[error("failed to connect to {backend}: {message}")]
    Connection {
        backend: StorageBackend,
        message: String,
    },

    #[error("failed to {operation} at: {target}, {message}")]
    Backend {
        operation: &'static str,
        target: String,
        message: String,
    },

    #[error("failed to parse backend of: {0}")]
    InvalidUri(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("prefix not found: {bucket}/{prefix}")]
    PrefixNotFound { bucket: String, prefix: String },

    #[error("failed to decode content of: {key}, {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("content of: {0} is empty")]
    EmptyContent(String),

    #[error("failed to encode content: {0}")]
    Encode(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out")]
    Timeout,
}

impl Error {
    pub fn backend(operation: &'static str, target: impl Into<String>, err: impl ToString) -> Self {
        Error::Backend {
            operation,
            target: target.into(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::PrefixNotFound { .. })
    }

    /// True for both content decode failures, empty or malformed.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::EmptyContent(_))
    }
}
