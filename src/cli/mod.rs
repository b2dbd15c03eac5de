//! # CLI Module
//!
//! Command implementations behind the `modiscat` binary. Each command opens
//! a [`Session`], walks the catalog, and renders the result as a table.
//!
//! ## Commands
//!
//! - [`collections`], [`products`], [`years`], [`days`], [`images`] - browse
//!   one level of the archive; `--refresh` forces a re-fetch
//! - [`search`] - date / range / year search with optional tile position,
//!   and optional download of the matched tiles
//!
//! ## Usage
//!
//! ```bash
//! modiscat products 61
//! modiscat days 61 MOD09A1 2020
//! modiscat search --collection 61 --product MOD09A1 \
//!     --start-date 2020-08-01 --end-date 2020-08-31 --position 15,0
//! ```
//!
//! Failures are reported with the output macros; fatal ones exit with 1.

mod browse;
mod search;

use std::{rc::Rc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

pub use browse::{DaySelector, collections, days, images, products, years};
pub use search::search;

use crate::{
    archive::{HttpTransport, Transport},
    catalog::Catalog,
    config::Settings,
    warning,
};

/// Transport and catalog for one command invocation.
pub struct Session {
    pub settings: Settings,
    pub transport: Rc<HttpTransport>,
    pub catalog: Catalog,
}

pub fn connect(settings: Settings) -> Session {
    let transport = Rc::new(HttpTransport::new(&settings));
    if !transport.has_token() {
        warning!("API token is missing. Browsing works, but downloads will fail.");
    }

    let shared: Rc<dyn Transport> = transport.clone();
    Session {
        catalog: Catalog::new(shared),
        transport,
        settings,
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
