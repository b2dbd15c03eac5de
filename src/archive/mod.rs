//! # Archive Transport Module
//!
//! This module defines the boundary between the catalog and the remote
//! archive. The catalog never performs HTTP itself: it asks a [`Transport`]
//! for the already-parsed listing of a directory and a [`Downloader`] for
//! files it has resolved.
//!
//! ```text
//! Catalog (lazy nodes, caches, search)
//!          ↓
//! Transport / Downloader traits
//!          ↓
//! HttpTransport (reqwest, blocking)
//!          ↓
//! LAADS archive  (<base>/<collection>/<product>/<year>/<day>.json)
//! ```
//!
//! ## Listing endpoints
//!
//! A directory's listing lives at the directory URL with `.json` appended.
//! See [`url_join`] and [`url_json_file`].
//!
//! ## Authentication
//!
//! Browsing works anonymously. Downloads need a bearer token, which is
//! configured once on the transport and never seen by the catalog.

mod http;

use std::{
    fmt,
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
};

pub use http::HttpTransport;

use crate::{
    error::{CatalogError, FetchError},
    types::Record,
};

pub const DEFAULT_ARCHIVE_URL: &str = "https://ladsweb.modaps.eosdis.nasa.gov/archive/allData/";

/// Supplies directory listings to the catalog.
pub trait Transport {
    /// Root URL every archive path is relative to.
    fn base_url(&self) -> &str;

    /// Returns the entries of the directory at `path`.
    fn fetch_listing(&self, path: &ArchivePath) -> Result<Vec<Record>, FetchError>;

    fn url_for(&self, path: &ArchivePath) -> String {
        url_join(self.base_url(), path.segments())
    }
}

/// Writes a resolved archive file into a local directory.
pub trait Downloader {
    fn download(&self, url: &str, destination: &Path) -> Result<PathBuf, CatalogError>;
}

/// Position of a directory in the archive, as a sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ArchivePath {
    segments: Vec<String>,
}

impl ArchivePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl<S: Into<String>> FromIterator<S> for ArchivePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn url_join<S: AsRef<str>>(base_url: &str, segments: &[S]) -> String {
    let suffix = segments
        .iter()
        .map(|s| s.as_ref().trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if suffix.is_empty() {
        return base_url.to_string();
    }

    if base_url.ends_with('/') {
        format!("{}{}", base_url, suffix)
    } else {
        format!("{}/{}", base_url, suffix)
    }
}

pub fn url_json_file(url: &str) -> String {
    format!("{}.json", url.trim_end_matches('/'))
}

/// Streams `reader` into a new file at `output`.
///
/// If the stream breaks off, the partial file is removed before the error
/// is returned, so `output` either holds the whole body or does not exist.
pub fn save_stream(mut reader: impl Read, output: &Path) -> Result<u64, CatalogError> {
    let io_error = |source: io::Error| CatalogError::Io {
        path: output.to_path_buf(),
        source,
    };

    let mut file = File::create(output).map_err(io_error)?;
    match io::copy(&mut reader, &mut file) {
        Ok(written) => Ok(written),
        Err(source) => {
            drop(file);
            if let Err(cleanup) = fs::remove_file(output) {
                tracing::warn!(
                    output = %output.display(),
                    %cleanup,
                    "cannot remove partial download"
                );
            }
            Err(io_error(source))
        }
    }
}
