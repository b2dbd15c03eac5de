//! The four archive levels below the root:
//! `collection / product / year / day-of-year`.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use chrono::NaiveDate;

use crate::{
    archive::{ArchivePath, Downloader, url_join},
    catalog::{
        cache::DerivedCache,
        node::{Children, Directory, Level, Node, NodeList},
    },
    dates::{self, YearDay},
    error::CatalogError,
    tile::{self, GranuleName, TilePosition},
    types::{Image, Record},
};

pub struct CollectionLevel;
pub struct ProductLevel;
pub struct YearLevel;
pub struct DayLevel;

pub type Collection = Node<CollectionLevel>;
pub type Product = Node<ProductLevel>;
pub type ProductYear = Node<YearLevel>;
pub type ProductDay = Node<DayLevel>;

fn named_key(name: &str) -> Option<String> {
    let name = name.trim_matches('/');
    (!name.is_empty()).then(|| name.to_string())
}

impl Level for CollectionLevel {
    type Key = String;
    type Children = Children<ProductLevel>;
    const KIND: &'static str = "collection";

    fn parse_key(_parent: &ArchivePath, name: &str) -> Option<String> {
        named_key(name)
    }

    fn segment(key: &String) -> String {
        key.clone()
    }

    fn children(directory: &Rc<Directory>) -> Self::Children {
        Children::new(Rc::clone(directory))
    }
}

impl Level for ProductLevel {
    type Key = String;
    type Children = Children<YearLevel>;
    const KIND: &'static str = "product";

    fn parse_key(_parent: &ArchivePath, name: &str) -> Option<String> {
        named_key(name)
    }

    fn segment(key: &String) -> String {
        key.clone()
    }

    fn children(directory: &Rc<Directory>) -> Self::Children {
        Children::new(Rc::clone(directory))
    }
}

impl Level for YearLevel {
    type Key = i32;
    type Children = Children<DayLevel>;
    const KIND: &'static str = "year";

    fn parse_key(_parent: &ArchivePath, name: &str) -> Option<i32> {
        let name = name.trim_matches('/');
        if name.len() != 4 || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        name.parse().ok()
    }

    fn segment(key: &i32) -> String {
        key.to_string()
    }

    fn children(directory: &Rc<Directory>) -> Self::Children {
        Children::new(Rc::clone(directory))
    }
}

/// Days are stored as zero-padded `DDD` directories below their year.
impl Level for DayLevel {
    type Key = YearDay;
    type Children = Images;
    const KIND: &'static str = "day";

    fn parse_key(parent: &ArchivePath, name: &str) -> Option<YearDay> {
        let year = YearLevel::parse_key(parent, parent.last()?)?;
        let name = name.trim_matches('/');
        if name.is_empty() || name.len() > 3 || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let day: u16 = name.parse().ok()?;
        dates::check_day_of_year(year, day).ok()?;
        Some(YearDay::new(year, day))
    }

    fn segment(key: &YearDay) -> String {
        format!("{:03}", key.day)
    }

    fn children(directory: &Rc<Directory>) -> Self::Children {
        Images::new(Rc::clone(directory))
    }
}

/// Image records of one day, with URLs and parsed names.
pub struct Images {
    directory: Rc<Directory>,
    listing: DerivedCache<Vec<Record>, Vec<Image>>,
}

impl Images {
    fn new(directory: Rc<Directory>) -> Self {
        Self {
            directory,
            listing: DerivedCache::new(),
        }
    }

    fn list(&self) -> Result<Rc<Vec<Image>>, CatalogError> {
        let entries = self.directory.data()?;
        Ok(self.listing.get_or_build(&entries, || self.build(&entries)))
    }

    fn list_available(&self) -> Result<Rc<Vec<Image>>, CatalogError> {
        let entries = self.directory.data_available()?;
        Ok(self.listing.get_or_build(&entries, || self.build(&entries)))
    }

    fn build(&self, entries: &[Record]) -> Vec<Image> {
        let base = self.directory.url();
        entries
            .iter()
            .map(|record| Image {
                url: url_join(&base, &[&record.name]),
                position: tile::parse_position(&record.name),
                granule: GranuleName::parse(&record.name),
                record: record.clone(),
            })
            .collect()
    }
}

impl Collection {
    /// Products listed under this collection.
    pub fn products(&self) -> Result<NodeList<ProductLevel>, CatalogError> {
        self.children()
    }

    pub fn products_available(&self) -> Result<NodeList<ProductLevel>, CatalogError> {
        self.children_available()
    }

    /// Product node for `name`. Nothing is fetched and nothing is checked;
    /// use [`find_product`](Self::find_product) to confirm it exists.
    pub fn product(&self, name: &str) -> Rc<Product> {
        self.child(name.to_string())
    }

    /// Product node for `name`, or `NotFound` if the collection does not
    /// list it.
    ///
    /// # Example
    ///
    /// ```
    /// let product = catalog.find_collection("61")?.find_product("MOD09A1")?;
    /// ```
    pub fn find_product(&self, name: &str) -> Result<Rc<Product>, CatalogError> {
        self.find_child(&name.to_string())
    }

    pub fn has_product(&self, name: &str) -> Result<bool, CatalogError> {
        self.has_child(&name.to_string())
    }
}

impl Product {
    /// Years the product has data for. Non-year entries are ignored.
    pub fn years(&self) -> Result<NodeList<YearLevel>, CatalogError> {
        self.children()
    }

    pub fn years_available(&self) -> Result<NodeList<YearLevel>, CatalogError> {
        self.children_available()
    }

    /// Year node, built without fetching.
    pub fn year(&self, year: i32) -> Rc<ProductYear> {
        self.child(year)
    }

    /// Year node, or `NotFound` when the product's listing lacks `year`.
    pub fn find_year(&self, year: i32) -> Result<Rc<ProductYear>, CatalogError> {
        self.find_child(&year)
    }

    /// The day directory holding `date`.
    ///
    /// Fails with `NotFound` (kind `year` or `day`) when the archive has no
    /// directory for it.
    pub fn date(&self, date: NaiveDate) -> Result<Rc<ProductDay>, CatalogError> {
        let target = dates::calendar_to_day_of_year(date);
        self.find_year(target.year)?.find_day(target.day)
    }

    /// Days between `start` and `end` inclusive that exist in the archive.
    ///
    /// Missing years and days are skipped; the result is in calendar order.
    ///
    /// # Arguments
    ///
    /// * `start` - First date of the range
    /// * `end` - Last date of the range, not before `start`
    ///
    /// # Errors
    ///
    /// `Validation` when `end` is before `start`, `Fetch` when a listing
    /// cannot be retrieved.
    pub fn days_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Rc<ProductDay>>, CatalogError> {
        let range = dates::date_range(start, end)?;
        self.existing_days(range)
    }

    /// Resolves each target in order, dropping the ones the archive lacks.
    pub(crate) fn existing_days(
        &self,
        targets: impl IntoIterator<Item = YearDay>,
    ) -> Result<Vec<Rc<ProductDay>>, CatalogError> {
        let mut days = Vec::new();
        for target in targets {
            let found = self
                .find_year(target.year)
                .and_then(|year| year.find_day(target.day));
            match found {
                Ok(day) => days.push(day),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(product = %self.key(), day = %target, "no listing, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(days)
    }
}

impl ProductYear {
    /// Day directories of this year in listing order.
    pub fn days(&self) -> Result<NodeList<DayLevel>, CatalogError> {
        self.children()
    }

    pub fn days_available(&self) -> Result<NodeList<DayLevel>, CatalogError> {
        self.children_available()
    }

    /// Day node for `day_of_year`, built without fetching.
    pub fn day(&self, day_of_year: u16) -> Result<Rc<ProductDay>, CatalogError> {
        dates::check_day_of_year(*self.key(), day_of_year)?;
        Ok(self.child(YearDay::new(*self.key(), day_of_year)))
    }

    /// Day node that the year's listing confirms.
    ///
    /// `"001"` and `"1"` in the listing both match `day_of_year` 1.
    pub fn find_day(&self, day_of_year: u16) -> Result<Rc<ProductDay>, CatalogError> {
        dates::check_day_of_year(*self.key(), day_of_year)?;
        self.find_child(&YearDay::new(*self.key(), day_of_year))
    }

    pub fn has_day(&self, day_of_year: u16) -> Result<bool, CatalogError> {
        dates::check_day_of_year(*self.key(), day_of_year)?;
        self.has_child(&YearDay::new(*self.key(), day_of_year))
    }

    /// Existing days from `first` to `last` inclusive.
    pub fn days_range(&self, first: u16, last: u16) -> Result<Vec<Rc<ProductDay>>, CatalogError> {
        if first > last {
            return Err(CatalogError::validation(format!(
                "last day {} is before first day {}",
                last, first
            )));
        }
        dates::check_day_of_year(*self.key(), first)?;
        dates::check_day_of_year(*self.key(), last)?;

        let mut days = Vec::new();
        for day in first..=last {
            match self.find_day(day) {
                Ok(found) => days.push(found),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(days)
    }
}

impl ProductDay {
    pub fn year_day(&self) -> YearDay {
        *self.key()
    }

    /// Calendar date of this day directory.
    pub fn date(&self) -> Result<NaiveDate, CatalogError> {
        dates::day_of_year_to_calendar(self.key().year, self.key().day)
    }

    /// Files of this day with their URLs and parsed tile positions.
    pub fn images(&self) -> Result<Rc<Vec<Image>>, CatalogError> {
        self.contents().list()
    }

    pub fn images_available(&self) -> Result<Rc<Vec<Image>>, CatalogError> {
        self.contents().list_available()
    }

    /// The image with exactly this file name.
    pub fn image(&self, name: &str) -> Result<Image, CatalogError> {
        self.images()?
            .iter()
            .find(|image| image.name() == name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                kind: "image",
                key: name.to_string(),
                path: self.path().to_string(),
            })
    }

    /// The image covering grid cell `position`; first in listing order wins.
    pub fn image_tile(&self, position: TilePosition) -> Result<Image, CatalogError> {
        let images = self.images()?;
        match tile::match_tile(&images, position) {
            Ok(image) => Ok(image.clone()),
            Err(CatalogError::NotFound { kind, key, .. }) => Err(CatalogError::NotFound {
                kind,
                key,
                path: self.path().to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Writes `image` into `destination` and returns the written path.
    ///
    /// # Arguments
    ///
    /// * `image` - An image of this day, as returned by [`images`](Self::images)
    /// * `downloader` - Performs the transfer; the HTTP one needs a token
    /// * `destination` - Directory to write into, created if missing
    pub fn download(
        &self,
        image: &Image,
        downloader: &dyn Downloader,
        destination: &Path,
    ) -> Result<PathBuf, CatalogError> {
        downloader.download(&image.url, destination)
    }

    /// Looks up the tile at `position` and downloads it.
    pub fn download_tile(
        &self,
        position: TilePosition,
        downloader: &dyn Downloader,
        destination: &Path,
    ) -> Result<PathBuf, CatalogError> {
        let image = self.image_tile(position)?;
        self.download(&image, downloader, destination)
    }
}
