//! Document loading from various sources.
//!
//! Handles loading JSON documents (schemas, UI schemas, import bundles) from
//! files, strings, and HTTP URLs.

use std::path::Path;

use serde_json::Value;

use crate::error::ImportError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Per-request timeout for remote documents.
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `ImportError::FileNotFound` if the file doesn't exist,
/// or `ImportError::Parse` if the file isn't valid JSON.
pub fn load_document(path: &Path) -> Result<Value, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ImportError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `ImportError::Parse` if the string isn't valid JSON.
pub fn load_document_str(content: &str) -> Result<Value, ImportError> {
    serde_json::from_str(content).map_err(|source| ImportError::Parse { source })
}

/// Load a JSON document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `ImportError::NetworkError` if the request fails or the body
/// isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, ImportError> {
    let network = |source: reqwest::Error| ImportError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    log::debug!("fetching {}", url);
    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network)
}

/// Whether `s` should be fetched over HTTP rather than read from disk.
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns the error of whichever loader the source was routed to.
pub fn load_document_auto(source: &str) -> Result<Value, ImportError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ImportError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}
