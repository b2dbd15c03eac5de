//! # Catalog Module
//!
//! Lazy, cached mirror of the archive's directory tree:
//!
//! ```text
//! Catalog (root listing)
//!   └── Collection        "61"
//!         └── Product     "MOD09A1"
//!               └── ProductYear  "2020"
//!                     └── ProductDay   "214"
//!                           └── Image records (tiles)
//! ```
//!
//! Every level is the same generic [`Node`] configured by a small [`Level`]
//! type. Nothing is fetched until it is asked for, and every fetch goes
//! through a [`RecordCache`]:
//!
//! - `data()` / `children()` / `record()` fetch at most once and then return
//!   the same cached `Rc`.
//! - `data_available()` / `children_available()` / `record_available()`
//!   always fetch and replace the cached value.
//!
//! Views built from a listing (child records, enumerated children, image
//! lists) sit in a [`DerivedCache`] keyed on the listing snapshot they came
//! from. A forced refresh of a listing therefore reaches all of them on their
//! next access, without another fetch.
//!
//! A failed fetch propagates unchanged and leaves the cache as it was.
//!
//! ## Threading
//!
//! Nodes are `Rc`/`RefCell` based and therefore single-threaded. A
//! multi-threaded port would have to make each cache's check-then-fetch a
//! critical section.

mod cache;
mod levels;
mod node;

use std::rc::Rc;

pub use cache::{DerivedCache, RecordCache};
pub use levels::{
    Collection, CollectionLevel, DayLevel, Images, Product, ProductDay, ProductLevel,
    ProductYear, YearLevel,
};
pub use node::{Children, Directory, Level, Node, NodeList};

use crate::{
    archive::{ArchivePath, Transport},
    error::CatalogError,
    search::{Match, SearchMatcher, SearchQuery},
    types::Record,
};

/// Entry point of the archive hierarchy.
pub struct Catalog {
    directory: Rc<Directory>,
    collections: Children<CollectionLevel>,
}

impl Catalog {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        let directory = Directory::new(ArchivePath::root(), transport);
        Self {
            collections: Children::new(Rc::clone(&directory)),
            directory,
        }
    }

    pub fn url(&self) -> String {
        self.directory.url()
    }

    pub fn data(&self) -> Result<Rc<Vec<Record>>, CatalogError> {
        self.directory.data()
    }

    pub fn data_available(&self) -> Result<Rc<Vec<Record>>, CatalogError> {
        self.directory.data_available()
    }

    pub fn collections(&self) -> Result<NodeList<CollectionLevel>, CatalogError> {
        self.collections.list()
    }

    pub fn collections_available(&self) -> Result<NodeList<CollectionLevel>, CatalogError> {
        self.collections.list_available()
    }

    /// Collection node for `name`, built without fetching.
    pub fn collection(&self, name: &str) -> Rc<Collection> {
        self.collections.child(name.to_string())
    }

    pub fn find_collection(&self, name: &str) -> Result<Rc<Collection>, CatalogError> {
        self.collections.find(&name.to_string())
    }

    /// Resolves `collection/product`, failing with `NotFound` if either is
    /// missing from the archive.
    pub fn find_product(
        &self,
        collection: &str,
        product: &str,
    ) -> Result<Rc<Product>, CatalogError> {
        self.find_collection(collection)?.find_product(product)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Match>, CatalogError> {
        SearchMatcher::new(self).run(query)
    }
}
