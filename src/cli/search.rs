use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::{Session, spinner},
    error, info,
    search::{Match, SearchQuery},
    success,
    types::MatchTableRow,
    warning,
};

pub fn search(session: &Session, query: SearchQuery, download: Option<PathBuf>) {
    let pb = spinner("Searching the archive...");
    let matches = session.catalog.search(&query);
    pb.finish_and_clear();

    let matches = match matches {
        Ok(matches) => matches,
        Err(e) => error!("Search failed. Err: {}", e),
    };

    if matches.is_empty() {
        warning!("No matching days found.");
        return;
    }

    let rows: Vec<MatchTableRow> = matches.iter().map(table_row).collect();
    println!("{}", Table::new(rows));
    info!("{} result(s)", matches.len());

    if let Some(destination) = download {
        download_matches(session, &matches, destination);
    }
}

fn table_row(found: &Match) -> MatchTableRow {
    let day = found.day();
    MatchTableRow {
        date: day.date().map(|d| d.to_string()).unwrap_or_default(),
        day: found.year_day().to_string(),
        name: found
            .image()
            .map(|image| image.name().to_string())
            .unwrap_or_else(|| "-".to_string()),
        url: found.url(),
    }
}

fn download_matches(session: &Session, matches: &[Match], destination: PathBuf) {
    let tiles: Vec<&Match> = matches.iter().filter(|m| m.image().is_some()).collect();
    if tiles.is_empty() {
        warning!("Downloads need a tile position. Re-run the search with --position H,V.");
        return;
    }

    let pb = ProgressBar::new(tiles.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30.blue} {pos}/{len} {msg}") {
        pb.set_style(style);
    }

    let mut failed = 0;
    for found in tiles {
        let Match::Tile { day, image } = found else {
            continue;
        };
        pb.set_message(image.name().to_string());
        if let Err(e) = day.download(image, session.transport.as_ref(), &destination) {
            pb.suspend(|| warning!("Cannot download {}. Err: {}", image.name(), e));
            failed += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if failed == 0 {
        success!("Downloaded into {}", destination.display());
    } else {
        warning!("{} download(s) failed", failed);
    }
}
