//! Error taxonomy shared by the catalog, search and transport layers.

use std::{error::Error as StdError, path::PathBuf};

use thiserror::Error;

/// Opaque failure reported by a transport collaborator.
///
/// The catalog never inspects the source; it only propagates it.
#[derive(Error, Debug)]
#[error("failed to fetch {url}: {source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl FetchError {
    pub fn new(url: impl Into<String>, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Rejected input. Always raised before any fetch happens.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A key that was looked up in a real listing does not exist.
    #[error("{kind} '{key}' not found in {path}")]
    NotFound {
        kind: &'static str,
        key: String,
        path: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("API token is missing. Set LAADS_API_TOKEN to download files")]
    MissingToken,

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}
