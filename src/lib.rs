//! MODIS Archive Catalog Library
//!
//! This library mirrors the LAADS archive's directory tree
//! (collection → product → year → day → tile) as lazily fetched, cached
//! nodes, and finds product days and grid tiles by date and position
//! without hand-building archive URLs.
//!
//! # Modules
//!
//! - `archive` - Transport contract and the HTTP client for the archive
//! - `catalog` - Lazy node hierarchy and its caches
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `dates` - Calendar / day-of-year conversion and date ranges
//! - `error` - Error types
//! - `search` - Query validation and matching
//! - `tile` - Grid tile addressing and granule names
//! - `types` - Data structures and type definitions
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use modiscat::{archive::HttpTransport, catalog::Catalog, config::Settings, search::SearchQuery};
//!
//! let transport = Rc::new(HttpTransport::new(&Settings::from_env()));
//! let catalog = Catalog::new(transport);
//! let query = SearchQuery::new("61", "MOD09A1").with_date("2020-08-01");
//! for found in catalog.search(&query)? {
//!     println!("{}", found.url());
//! }
//! ```

pub mod archive;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod search;
pub mod tile;
pub mod types;

/// A convenient Result type alias for the command-line layer.
///
/// Library operations return [`error::CatalogError`]; the CLI collects
/// those and setup failures behind one boxed error.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching collections...");
/// info!("Found {} days", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for failures the command cannot recover from; code after the macro
/// does not run.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
