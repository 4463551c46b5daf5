use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in the audit, remediation, definitions,
/// analysis and payment flows. None of these are fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// The platform refused to open or keep reading a directory.
    #[error("access denied: {path}: {reason}")]
    AccessDenied { path: PathBuf, reason: String },

    /// A single entry could not be deleted.
    #[error("failed to remove {path}: {reason}")]
    RemovalFailed { path: PathBuf, reason: String },

    /// Another audit of the same root has not finished yet.
    #[error("an audit of {0} is already running")]
    AuditInProgress(PathBuf),

    /// The remote definitions version could not be determined.
    #[error("definitions check failed: {0}")]
    UpdateCheckFailed(String),

    /// New definitions could not be fetched or stored.
    #[error("definitions update failed: {0}")]
    UpdateDownloadFailed(String),

    /// The document-analysis endpoint failed or answered with garbage.
    #[error("document analysis failed: {0}")]
    AnalysisFailed(String),

    /// User input rejected (e.g. a malformed transaction code).
    #[error("{0}")]
    ValidationFailed(String),

    /// Missing or invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Preference store could not be read or written.
    #[error("preference store error at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Store {
            path: path.into(),
            source,
        }
    }

    pub fn access_denied(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::AccessDenied {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
