use std::{
    fs,
    path::{Path, PathBuf},
    thread::sleep,
    time::Duration,
};

use reqwest::{
    StatusCode,
    blocking::{Client, RequestBuilder, Response},
};

use crate::{
    archive::{ArchivePath, Downloader, Transport, save_stream, url_json_file},
    config::Settings,
    error::{CatalogError, FetchError},
    types::{ListingPayload, Record},
};

const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Blocking HTTP client for the LAADS archive.
///
/// Holds the token for its whole lifetime; browsing without one is allowed
/// but logs a warning, since every later download will be refused.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Self {
        let token = settings
            .api_token
            .clone()
            .filter(|token| !token.trim().is_empty());

        if token.is_none() {
            tracing::warn!("API token is missing; browsing works but downloads will fail");
        }

        Self {
            client: Client::new(),
            base_url: settings.archive_url.clone(),
            token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a GET, waiting out `429 Too Many Requests` when the server says
    /// how long to wait.
    fn get(&self, url: &str) -> Result<Response, FetchError> {
        let mut attempt = 1;
        loop {
            let response = self
                .authorize(self.client.get(url))
                .send()
                .map_err(|e| FetchError::new(url, e))?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(0);

                if retry_after <= MAX_RETRY_AFTER_SECS {
                    tracing::debug!(url, retry_after, attempt, "rate limited, retrying");
                    sleep(Duration::from_secs(retry_after));
                    attempt += 1;
                    continue;
                }
            }

            return response
                .error_for_status()
                .map_err(|e| FetchError::new(url, e));
        }
    }
}

impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch_listing(&self, path: &ArchivePath) -> Result<Vec<Record>, FetchError> {
        let url = url_json_file(&self.url_for(path));
        let payload = self
            .get(&url)?
            .json::<ListingPayload>()
            .map_err(|e| FetchError::new(&url, e))?;

        Ok(payload.into_records())
    }
}

impl Downloader for HttpTransport {
    fn download(&self, url: &str, destination: &Path) -> Result<PathBuf, CatalogError> {
        if self.token.is_none() {
            return Err(CatalogError::MissingToken);
        }

        let file_name = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CatalogError::validation(format!("'{}' has no file name", url)))?;

        fs::create_dir_all(destination).map_err(|source| CatalogError::Io {
            path: destination.to_path_buf(),
            source,
        })?;
        let output = destination.join(file_name);

        let response = self.get(url)?;
        save_stream(response, &output)?;

        tracing::debug!(url, output = %output.display(), "downloaded");
        Ok(output)
    }
}
