use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use serde_json::Value;

use crate::{
    archive::{ArchivePath, Transport},
    catalog::cache::{DerivedCache, RecordCache},
    error::CatalogError,
    types::Record,
};

/// Shape of one hierarchy level: how its keys look in the archive and what
/// it holds underneath.
pub trait Level: Sized + 'static {
    type Key: Clone + Ord + fmt::Display + fmt::Debug;
    type Children;

    /// Used in errors and logs.
    const KIND: &'static str;

    /// Key of a listing entry found under `parent`, or `None` when the entry
    /// does not belong to this level.
    fn parse_key(parent: &ArchivePath, name: &str) -> Option<Self::Key>;

    /// Path segment the key is stored under.
    fn segment(key: &Self::Key) -> String;

    fn children(directory: &Rc<Directory>) -> Self::Children;
}

pub type NodeList<L> = Rc<Vec<Rc<Node<L>>>>;

/// The listing endpoint of one archive directory together with its cache.
pub struct Directory {
    path: ArchivePath,
    transport: Rc<dyn Transport>,
    entries: RecordCache<Vec<Record>>,
}

impl Directory {
    pub(crate) fn new(path: ArchivePath, transport: Rc<dyn Transport>) -> Rc<Self> {
        Rc::new(Self {
            path,
            transport,
            entries: RecordCache::new(),
        })
    }

    pub fn path(&self) -> &ArchivePath {
        &self.path
    }

    /// Browsable URL of the directory (not the `.json` listing endpoint).
    pub fn url(&self) -> String {
        self.transport.url_for(&self.path)
    }

    pub fn transport(&self) -> &Rc<dyn Transport> {
        &self.transport
    }

    /// Whether a listing has been fetched successfully at least once.
    pub fn is_fetched(&self) -> bool {
        self.entries.is_fetched()
    }

    /// Returns the cached listing, fetching it on first use.
    ///
    /// Every call after the first successful one hands out the same `Rc`
    /// until [`data_available`](Self::data_available) replaces it.
    pub fn data(&self) -> Result<Rc<Vec<Record>>, CatalogError> {
        self.entries.get_or_fetch(|| self.fetch())
    }

    /// Fetches the listing again and makes it the cached snapshot.
    ///
    /// Everything derived from the old snapshot is rebuilt on its next
    /// access. On failure the old snapshot stays in place.
    pub fn data_available(&self) -> Result<Rc<Vec<Record>>, CatalogError> {
        self.entries.refresh(|| self.fetch())
    }

    fn fetch(&self) -> Result<Vec<Record>, CatalogError> {
        tracing::debug!(path = %self.path, "fetching listing");
        let entries = self.transport.fetch_listing(&self.path)?;
        tracing::debug!(path = %self.path, entries = entries.len(), "listing fetched");
        Ok(entries)
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("path", &self.path)
            .field("fetched", &self.is_fetched())
            .finish()
    }
}

/// One directory of the archive hierarchy.
///
/// A node *has* a record (its own entry in the parent's listing) and a
/// directory (its own listing). Both are fetched lazily. The parent is only
/// referenced through its listing, never owned.
pub struct Node<L: Level> {
    key: L::Key,
    parent: Rc<Directory>,
    directory: Rc<Directory>,
    record: DerivedCache<Vec<Record>, Record>,
    children: L::Children,
}

impl<L: Level> Node<L> {
    pub(crate) fn new(parent: Rc<Directory>, key: L::Key) -> Self {
        let path = parent.path().join(L::segment(&key));
        let directory = Directory::new(path, Rc::clone(parent.transport()));
        let children = L::children(&directory);

        Self {
            key,
            parent,
            directory,
            record: DerivedCache::new(),
            children,
        }
    }

    /// Key this node was addressed by, e.g. `"61"`, `2020` or `2020/214`.
    pub fn key(&self) -> &L::Key {
        &self.key
    }

    pub fn path(&self) -> &ArchivePath {
        self.directory.path()
    }

    pub fn parent_path(&self) -> &ArchivePath {
        self.parent.path()
    }

    /// Archive URL of this node's directory.
    ///
    /// # Example
    ///
    /// ```
    /// let day = catalog.collection("61").product("MOD09A1").year(2020).day(214)?;
    /// assert!(day.url().ends_with("/61/MOD09A1/2020/214"));
    /// ```
    pub fn url(&self) -> String {
        self.directory.url()
    }

    /// This node's own listing, fetched once.
    pub fn data(&self) -> Result<Rc<Vec<Record>>, CatalogError> {
        self.directory.data()
    }

    /// Re-fetches this node's listing and replaces the cached one.
    pub fn data_available(&self) -> Result<Rc<Vec<Record>>, CatalogError> {
        self.directory.data_available()
    }

    /// Whether this node's own listing has been fetched.
    pub fn is_fetched(&self) -> bool {
        self.directory.is_fetched()
    }

    /// This node's entry in its parent's listing.
    ///
    /// Resolved lazily from the parent's cached listing, so a node that was
    /// enumerated or found through its parent needs no extra fetch. Fails
    /// with `NotFound` when the parent does not list this key.
    pub fn record(&self) -> Result<Rc<Record>, CatalogError> {
        let entries = self.parent.data()?;
        self.record.try_get_or_build(&entries, || self.lookup(&entries))
    }

    /// Re-fetches the parent's listing and returns this node's fresh entry.
    pub fn record_available(&self) -> Result<Rc<Record>, CatalogError> {
        let entries = self.parent.data_available()?;
        self.record.try_get_or_build(&entries, || self.lookup(&entries))
    }

    /// Name as the archive lists it. Days keep their zero padding (`"001"`).
    pub fn name(&self) -> Result<String, CatalogError> {
        Ok(self.record()?.name.clone())
    }

    pub fn last_modified(&self) -> Result<Option<String>, CatalogError> {
        Ok(self.record()?.last_modified.clone())
    }

    pub fn size(&self) -> Result<Option<u64>, CatalogError> {
        Ok(self.record()?.size)
    }

    /// Any attribute of this node's record by its archive name, including
    /// ones without a typed field.
    ///
    /// # Arguments
    ///
    /// * `key` - Attribute name as sent by the archive, e.g. `"size"` or
    ///   `"last-modified"`
    pub fn attribute(&self, key: &str) -> Result<Option<Value>, CatalogError> {
        Ok(self.record()?.attribute(key))
    }

    pub(crate) fn contents(&self) -> &L::Children {
        &self.children
    }

    fn lookup(&self, entries: &[Record]) -> Result<Record, CatalogError> {
        find_entry::<L>(self.parent.path(), entries, &self.key)
            .cloned()
            .ok_or_else(|| not_found::<L>(self.parent.path(), &self.key))
    }
}

impl<L: Level> fmt::Debug for Node<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(L::KIND)
            .field("key", &self.key)
            .field("path", self.path())
            .finish()
    }
}

impl<L, C> Node<L>
where
    L: Level<Children = Children<C>>,
    C: Level,
{
    /// Every child this node's listing names, in listing order.
    ///
    /// Entries that are not valid keys for the child level are skipped.
    /// The list is cached and rebuilt only when the listing is refreshed.
    pub fn children(&self) -> Result<NodeList<C>, CatalogError> {
        self.children.list()
    }

    /// Like [`children`](Self::children), but re-fetches the listing first.
    pub fn children_available(&self) -> Result<NodeList<C>, CatalogError> {
        self.children.list_available()
    }

    /// Node for `key`, built without looking at any listing.
    pub fn child(&self, key: C::Key) -> Rc<Node<C>> {
        self.children.child(key)
    }

    /// Node for `key`, or `NotFound` if this node's listing lacks it.
    pub fn find_child(&self, key: &C::Key) -> Result<Rc<Node<C>>, CatalogError> {
        self.children.find(key)
    }

    /// Whether this node's listing contains `key`. Fetches the listing once.
    pub fn has_child(&self, key: &C::Key) -> Result<bool, CatalogError> {
        self.children.contains(key)
    }
}

/// Child nodes of one directory, memoised by key.
pub struct Children<L: Level> {
    directory: Rc<Directory>,
    nodes: RefCell<BTreeMap<L::Key, Rc<Node<L>>>>,
    listed: DerivedCache<Vec<Record>, Vec<Rc<Node<L>>>>,
}

impl<L: Level> Children<L> {
    pub(crate) fn new(directory: Rc<Directory>) -> Self {
        Self {
            directory,
            nodes: RefCell::new(BTreeMap::new()),
            listed: DerivedCache::new(),
        }
    }

    pub fn child(&self, key: L::Key) -> Rc<Node<L>> {
        let existing = self.nodes.borrow().get(&key).cloned();
        if let Some(node) = existing {
            return node;
        }

        let node = Rc::new(Node::new(Rc::clone(&self.directory), key.clone()));
        self.nodes.borrow_mut().insert(key, Rc::clone(&node));
        node
    }

    pub fn list(&self) -> Result<NodeList<L>, CatalogError> {
        let entries = self.directory.data()?;
        Ok(self.listed.get_or_build(&entries, || self.adopt(&entries)))
    }

    pub fn list_available(&self) -> Result<NodeList<L>, CatalogError> {
        let entries = self.directory.data_available()?;
        Ok(self.listed.get_or_build(&entries, || self.adopt(&entries)))
    }

    pub fn find(&self, key: &L::Key) -> Result<Rc<Node<L>>, CatalogError> {
        let entries = self.directory.data()?;
        let entry = find_entry::<L>(self.directory.path(), &entries, key)
            .ok_or_else(|| not_found::<L>(self.directory.path(), key))?;

        let node = self.child(key.clone());
        node.record.get_or_build(&entries, || entry.clone());
        Ok(node)
    }

    pub fn contains(&self, key: &L::Key) -> Result<bool, CatalogError> {
        let entries = self.directory.data()?;
        Ok(find_entry::<L>(self.directory.path(), &entries, key).is_some())
    }

    // Every listed node gets the entry it was listed with as its record.
    fn adopt(&self, entries: &Rc<Vec<Record>>) -> Vec<Rc<Node<L>>> {
        entries
            .iter()
            .filter_map(|entry| {
                let Some(key) = L::parse_key(self.directory.path(), &entry.name) else {
                    tracing::debug!(kind = L::KIND, name = %entry.name, "skipping entry");
                    return None;
                };
                let node = self.child(key);
                node.record.get_or_build(entries, || entry.clone());
                Some(node)
            })
            .collect()
    }
}

fn find_entry<'a, L: Level>(
    parent: &ArchivePath,
    entries: &'a [Record],
    key: &L::Key,
) -> Option<&'a Record> {
    entries
        .iter()
        .find(|entry| L::parse_key(parent, &entry.name).as_ref() == Some(key))
}

pub(crate) fn not_found<L: Level>(parent: &ArchivePath, key: &L::Key) -> CatalogError {
    CatalogError::NotFound {
        kind: L::KIND,
        key: key.to_string(),
        path: parent.to_string(),
    }
}
