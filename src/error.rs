//! Error types for UI schema import, reference resolution and merging.

use std::path::PathBuf;
use thiserror::Error;

/// A `$ref` pointer that could not be inlined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("unable to resolve reference: {pointer}")]
    Unresolved { pointer: String },

    #[error("cyclic reference: {pointer}")]
    Cyclic { pointer: String },
}

impl ReferenceError {
    /// The pointer string that failed to resolve.
    pub fn pointer(&self) -> &str {
        match self {
            Self::Unresolved { pointer } | Self::Cyclic { pointer } => pointer,
        }
    }

    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Invariant violations surfaced while merging two UI schema trees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("ui:order at {path} is not a list (found {found})")]
    OrderNotSequence { path: String, found: &'static str },

    #[error("ui:order at {path} contains non-string entry {entry}")]
    InvalidOrderEntry { path: String, entry: String },
}

impl MergeError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors at the import boundary.
///
/// Nothing is applied to a [`Session`](crate::Session) when any of these
/// is returned.
#[derive(Debug, Error)]
pub enum ImportError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Document errors (exit code 2)
    #[error("invalid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("missing top-level `{field}`: document must have `schema` and `ui-schema` fields")]
    MissingField { field: &'static str },

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl ImportError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::FileNotFound { .. } | ImportError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            ImportError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Rejected widget edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("widget \"{widget}\" is not allowed for field type {field_type}")]
    NotAllowed { widget: String, field_type: String },

    #[error("no UI schema node at {path}")]
    NotANode { path: String },
}

impl WidgetError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors loading a generation options file.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("cannot read options {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl OptionsError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            OptionsError::Read { .. } => 3,
            OptionsError::Invalid { .. } => 2,
        }
    }
}
