//! Configuration management for the MODIS catalog.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults
//!
//! Nothing here is global state: [`Settings::from_env`] produces a plain
//! value which is handed to the transport when it is built.

use std::{env, fs, path::PathBuf};

use crate::archive::DEFAULT_ARCHIVE_URL;

pub const ARCHIVE_URL_VAR: &str = "LAADS_ARCHIVE_URL";
pub const API_TOKEN_VAR: &str = "LAADS_API_TOKEN";
pub const DOWNLOAD_DIR_VAR: &str = "MODISCAT_DOWNLOAD_DIR";
pub const LOG_VAR: &str = "MODISCAT_LOG";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is looked up in:
/// - Linux: `~/.local/share/modiscat/.env`
/// - macOS: `~/Library/Application Support/modiscat/.env`
/// - Windows: `%LOCALAPPDATA%/modiscat/.env`
///
/// A missing file is fine; a file that cannot be parsed is an error.
pub fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("modiscat/.env");
    path
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub archive_url: String,
    pub api_token: Option<String>,
    pub download_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            api_token: None,
            download_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            archive_url: non_empty_var(ARCHIVE_URL_VAR).unwrap_or(defaults.archive_url),
            api_token: non_empty_var(API_TOKEN_VAR),
            download_dir: non_empty_var(DOWNLOAD_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
