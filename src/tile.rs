//! Grid tile addressing and granule file-name parsing.
//!
//! Tiled products embed their sinusoidal grid cell in the file name as
//! `hHHvVV`, e.g. `MOD09A1.A2020214.h15v00.006.2020224043621.hdf`.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{dates, error::CatalogError, types::Image};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u8, u8)", into = "(u8, u8)")]
pub struct TilePosition {
    pub horizontal: u8,
    pub vertical: u8,
}

impl TilePosition {
    pub fn new(horizontal: u8, vertical: u8) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

impl From<(u8, u8)> for TilePosition {
    fn from((horizontal, vertical): (u8, u8)) -> Self {
        TilePosition::new(horizontal, vertical)
    }
}

impl From<TilePosition> for (u8, u8) {
    fn from(position: TilePosition) -> Self {
        (position.horizontal, position.vertical)
    }
}

impl fmt::Display for TilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{:02}v{:02}", self.horizontal, self.vertical)
    }
}

/// Accepts `H,V` or the file-name form `hHHvVV`.
impl FromStr for TilePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((h, v)) = s.split_once(',') {
            let horizontal = h
                .trim()
                .parse()
                .map_err(|_| format!("invalid horizontal index '{}'", h.trim()))?;
            let vertical = v
                .trim()
                .parse()
                .map_err(|_| format!("invalid vertical index '{}'", v.trim()))?;
            return Ok(TilePosition::new(horizontal, vertical));
        }

        match parse_position(s) {
            Some(position) if s.len() == 6 => Ok(position),
            _ => Err(format!("'{}' is neither H,V nor hHHvVV", s)),
        }
    }
}

/// Finds the first `hNNvMM` marker in an image name.
///
/// Either both indices are recovered or none is.
pub fn parse_position(image_name: &str) -> Option<TilePosition> {
    let bytes = image_name.as_bytes();
    bytes.windows(6).find_map(|w| {
        let digits = |a: u8, b: u8| {
            (a.is_ascii_digit() && b.is_ascii_digit()).then(|| (a - b'0') * 10 + (b - b'0'))
        };
        if w[0] != b'h' || w[3] != b'v' {
            return None;
        }
        let horizontal = digits(w[1], w[2])?;
        let vertical = digits(w[4], w[5])?;
        Some(TilePosition::new(horizontal, vertical))
    })
}

/// First image in listing order whose parsed position equals `position`.
pub fn match_tile<'a>(
    images: &'a [Image],
    position: TilePosition,
) -> Result<&'a Image, CatalogError> {
    images
        .iter()
        .find(|image| image.position == Some(position))
        .ok_or_else(|| CatalogError::NotFound {
            kind: "tile",
            key: position.to_string(),
            path: "image listing".to_string(),
        })
}

/// Fields encoded in a standard granule name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranuleName {
    pub product: String,
    pub acquired: NaiveDate,
    pub position: Option<TilePosition>,
    pub collection: String,
    pub produced: String,
}

impl GranuleName {
    /// `PRODUCT.AYYYYDDD.XXXX.CCC.PRODUCTION.ext`, where the third part is
    /// either a tile (`hHHvVV`) or an acquisition time. `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() < 5 {
            return None;
        }

        let acquisition = parts[1].strip_prefix('A')?;
        if acquisition.len() != 7 || !acquisition.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = acquisition[..4].parse().ok()?;
        let day: u16 = acquisition[4..].parse().ok()?;
        let acquired = dates::day_of_year_to_calendar(year, day).ok()?;

        let position = match parse_position(parts[2]) {
            Some(position) if parts[2].len() == 6 => Some(position),
            _ => None,
        };

        Some(GranuleName {
            product: parts[0].to_string(),
            acquired,
            position,
            collection: parts[3].to_string(),
            produced: parts[4].to_string(),
        })
    }
}
