#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    rc::Rc,
};

use modiscat::{
    archive::{ArchivePath, Downloader, Transport},
    catalog::Catalog,
    error::{CatalogError, FetchError},
    types::Record,
};

pub const BASE_URL: &str = "https://archive.test/allData/";

/// In-memory archive that records every listing request.
#[derive(Default)]
pub struct MockArchive {
    listings: RefCell<BTreeMap<String, Vec<Record>>>,
    failing: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<String>>,
    downloads: RefCell<Vec<(String, PathBuf)>>,
}

impl MockArchive {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Registers the listing for `path` (segments joined by `/`, root is "").
    pub fn with_listing(self: &Rc<Self>, path: &str, names: &[&str]) -> Rc<Self> {
        let records = names
            .iter()
            .map(|name| Record::new(*name).with_size(100))
            .collect();
        self.listings.borrow_mut().insert(path.to_string(), records);
        Rc::clone(self)
    }

    pub fn set_listing(&self, path: &str, records: Vec<Record>) {
        self.listings.borrow_mut().insert(path.to_string(), records);
    }

    pub fn fail(&self, path: &str) {
        self.failing.borrow_mut().insert(path.to_string());
    }

    pub fn recover(&self, path: &str) {
        self.failing.borrow_mut().remove(path);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == path).count()
    }

    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.borrow().clone()
    }

    pub fn catalog(self: &Rc<Self>) -> Catalog {
        let transport: Rc<dyn Transport> = self.clone();
        Catalog::new(transport)
    }
}

impl Transport for MockArchive {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn fetch_listing(&self, path: &ArchivePath) -> Result<Vec<Record>, FetchError> {
        let key = path.segments().join("/");
        self.calls.borrow_mut().push(key.clone());

        if self.failing.borrow().contains(&key) {
            return Err(FetchError::new(self.url_for(path), "503 Service Unavailable"));
        }

        self.listings
            .borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| FetchError::new(self.url_for(path), "404 Not Found"))
    }
}

impl Downloader for MockArchive {
    fn download(&self, url: &str, destination: &Path) -> Result<PathBuf, CatalogError> {
        self.downloads
            .borrow_mut()
            .push((url.to_string(), destination.to_path_buf()));
        let name = url.rsplit('/').next().unwrap_or_default();
        Ok(destination.join(name))
    }
}

/// Collection 61 / MOD09A1 with a few 2020 days and tiles.
pub fn modis_archive() -> Rc<MockArchive> {
    MockArchive::new()
        .with_listing("", &["5", "6", "61"])
        .with_listing("61", &["MOD09A1", "MYD09A1"])
        .with_listing("61/MOD09A1", &["2019", "2020", "2021"])
        .with_listing("61/MOD09A1/2020", &["214", "215", "217", "366"])
        .with_listing("61/MOD09A1/2019", &["365"])
        .with_listing("61/MOD09A1/2021", &["001", "002"])
        .with_listing(
            "61/MOD09A1/2020/214",
            &[
                "MOD09A1.A2020214.h15v00.061.2020224043621.hdf",
                "MOD09A1.A2020214.h16v00.061.2020224043622.hdf",
            ],
        )
        .with_listing(
            "61/MOD09A1/2020/215",
            &["MOD09A1.A2020215.h16v00.061.2020225043622.hdf"],
        )
        .with_listing(
            "61/MOD09A1/2020/217",
            &[
                "MOD09A1.A2020217.h15v00.061.2020227043621.hdf",
                "MOD09A1.A2020217.h15v00.061.2020228000000.hdf",
            ],
        )
}
