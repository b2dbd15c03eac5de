//! Date and tile search over the catalog.
//!
//! A [`SearchQuery`] names a product and exactly one way of picking dates:
//! a single `date`, an inclusive `start_date`..`end_date` range, or a `year`
//! with an optional `day_of_year`. The query is fully validated before the
//! first fetch.
//!
//! In range and whole-year searches, days (and tiles, when `position` is
//! given) the archive does not have are skipped, so a gappy range still
//! returns what exists. A single `date` or `year` + `day_of_year` names
//! exactly one day, and a missing year, day or tile is `NotFound`.

use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, ProductDay},
    dates::{self, YearDay},
    error::CatalogError,
    tile::TilePosition,
    types::Image,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchQuery {
    pub collection: Option<String>,
    pub product: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub year: Option<i32>,
    pub day_of_year: Option<u16>,
    pub position: Option<TilePosition>,
}

impl SearchQuery {
    pub fn new(collection: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            product: Some(product.into()),
            ..Self::default()
        }
    }

    /// Builds a query from a key/value mapping such as a parsed JSON object.
    pub fn from_mapping(mapping: serde_json::Value) -> Result<Self, CatalogError> {
        serde_json::from_value(mapping).map_err(|e| CatalogError::validation(e.to_string()))
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_range(
        mut self,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_day_of_year(mut self, day_of_year: u16) -> Self {
        self.day_of_year = Some(day_of_year);
        self
    }

    pub fn with_position(mut self, position: TilePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn validate(&self) -> Result<ValidatedQuery, CatalogError> {
        let collection = required(&self.collection, "collection")?;
        let product = required(&self.product, "product")?;

        let by_date = self.date.is_some();
        let by_range = self.start_date.is_some() || self.end_date.is_some();
        let by_year = self.year.is_some() || self.day_of_year.is_some();

        let selection = match (by_date, by_range, by_year) {
            (true, false, false) => {
                let date = self.date.as_deref().unwrap_or_default();
                DateSelection::Date(dates::parse_date(date)?)
            }
            (false, true, false) => {
                let (Some(start), Some(end)) = (&self.start_date, &self.end_date) else {
                    return Err(CatalogError::validation(
                        "start_date and end_date must be given together",
                    ));
                };
                let start = dates::parse_date(start)?;
                let end = dates::parse_date(end)?;
                dates::date_range(start, end)?;
                DateSelection::Range { start, end }
            }
            (false, false, true) => {
                let Some(year) = self.year else {
                    return Err(CatalogError::validation("day_of_year requires a year"));
                };
                if let Some(day) = self.day_of_year {
                    dates::check_day_of_year(year, day)?;
                }
                DateSelection::Year {
                    year,
                    day_of_year: self.day_of_year,
                }
            }
            (false, false, false) => {
                return Err(CatalogError::validation(
                    "one of date, start_date/end_date or year is required",
                ));
            }
            _ => {
                return Err(CatalogError::validation(
                    "only one of date, start_date/end_date or year/day_of_year may be given",
                ));
            }
        };

        Ok(ValidatedQuery {
            collection,
            product,
            selection,
            position: self.position,
        })
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, CatalogError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CatalogError::validation(format!("{} is required", field)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    Date(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
    Year { year: i32, day_of_year: Option<u16> },
}

impl DateSelection {
    /// Range and whole-year selections may legitimately match nothing on
    /// some days; a single day either exists or is an error.
    pub fn is_multiple(&self) -> bool {
        matches!(
            self,
            DateSelection::Range { .. }
                | DateSelection::Year {
                    day_of_year: None,
                    ..
                }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub collection: String,
    pub product: String,
    pub selection: DateSelection,
    pub position: Option<TilePosition>,
}

/// One search result: a whole day, or the tile picked from it.
#[derive(Debug, Clone)]
pub enum Match {
    Day(Rc<ProductDay>),
    Tile { day: Rc<ProductDay>, image: Image },
}

impl Match {
    pub fn day(&self) -> &Rc<ProductDay> {
        match self {
            Match::Day(day) => day,
            Match::Tile { day, .. } => day,
        }
    }

    pub fn image(&self) -> Option<&Image> {
        match self {
            Match::Day(_) => None,
            Match::Tile { image, .. } => Some(image),
        }
    }

    pub fn year_day(&self) -> YearDay {
        self.day().year_day()
    }

    pub fn url(&self) -> String {
        match self {
            Match::Day(day) => day.url(),
            Match::Tile { image, .. } => image.url.clone(),
        }
    }
}

pub struct SearchMatcher<'a> {
    catalog: &'a Catalog,
}

impl<'a> SearchMatcher<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn run(&self, query: &SearchQuery) -> Result<Vec<Match>, CatalogError> {
        let query = query.validate()?;
        let product = self
            .catalog
            .find_product(&query.collection, &query.product)?;

        let days = match query.selection {
            DateSelection::Date(date) => vec![product.date(date)?],
            DateSelection::Range { start, end } => {
                product.existing_days(dates::date_range(start, end)?)?
            }
            DateSelection::Year {
                year,
                day_of_year: Some(day),
            } => vec![product.find_year(year)?.find_day(day)?],
            DateSelection::Year {
                year,
                day_of_year: None,
            } => match product.find_year(year) {
                Ok(product_year) => {
                    let mut days: Vec<Rc<ProductDay>> =
                        product_year.days()?.iter().cloned().collect();
                    days.sort_by_key(|day| day.year_day());
                    days
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(product = %query.product, year, "year not in archive");
                    Vec::new()
                }
                Err(e) => return Err(e),
            },
        };

        let Some(position) = query.position else {
            return Ok(days.into_iter().map(Match::Day).collect());
        };

        let mut matches = Vec::with_capacity(days.len());
        for day in days {
            match day.image_tile(position) {
                Ok(image) => matches.push(Match::Tile { day, image }),
                Err(e) if e.is_not_found() && query.selection.is_multiple() => {
                    tracing::debug!(day = %day.year_day(), tile = %position, "no tile, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(matches)
    }
}
