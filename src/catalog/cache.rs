use std::{cell::RefCell, rc::Rc};

/// Memo of the last successful fetch for one node.
///
/// [`get_or_fetch`](Self::get_or_fetch) fetches at most once and then hands
/// out the same `Rc`; [`refresh`](Self::refresh) always fetches. A failed
/// fetch leaves the slot exactly as it was.
#[derive(Debug)]
pub struct RecordCache<T> {
    slot: RefCell<Option<Rc<T>>>,
}

impl<T> Default for RecordCache<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }
}

impl<T> RecordCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<Rc<T>> {
        self.slot.borrow().clone()
    }

    pub fn is_fetched(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn get_or_fetch<E>(&self, fetch: impl FnOnce() -> Result<T, E>) -> Result<Rc<T>, E> {
        match self.cached() {
            Some(value) => Ok(value),
            None => self.refresh(fetch),
        }
    }

    pub fn refresh<E>(&self, fetch: impl FnOnce() -> Result<T, E>) -> Result<Rc<T>, E> {
        let value = fetch()?;
        Ok(self.store(value))
    }

    /// Replaces the cached value with a snapshot obtained elsewhere.
    pub fn store(&self, value: T) -> Rc<T> {
        let value = Rc::new(value);
        *self.slot.borrow_mut() = Some(Rc::clone(&value));
        value
    }
}

/// A value computed from another cache's snapshot.
///
/// Remembers the `Rc` it was built from and rebuilds as soon as the source
/// hands out a different one, so a forced refresh of a listing reaches every
/// view derived from it. Same source, same `Rc` out.
#[derive(Debug)]
pub struct DerivedCache<S, T> {
    slot: RefCell<Option<(Rc<S>, Rc<T>)>>,
}

impl<S, T> Default for DerivedCache<S, T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }
}

impl<S, T> DerivedCache<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value if it was built from `source`.
    pub fn current(&self, source: &Rc<S>) -> Option<Rc<T>> {
        self.slot
            .borrow()
            .as_ref()
            .filter(|(built_from, _)| Rc::ptr_eq(built_from, source))
            .map(|(_, value)| Rc::clone(value))
    }

    pub fn is_built(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn get_or_build(&self, source: &Rc<S>, build: impl FnOnce() -> T) -> Rc<T> {
        match self.current(source) {
            Some(value) => value,
            None => self.store(source, build()),
        }
    }

    /// Like [`get_or_build`](Self::get_or_build); a failed build leaves the
    /// previous value in place.
    pub fn try_get_or_build<E>(
        &self,
        source: &Rc<S>,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<Rc<T>, E> {
        match self.current(source) {
            Some(value) => Ok(value),
            None => Ok(self.store(source, build()?)),
        }
    }

    fn store(&self, source: &Rc<S>, value: T) -> Rc<T> {
        let value = Rc::new(value);
        *self.slot.borrow_mut() = Some((Rc::clone(source), Rc::clone(&value)));
        value
    }
}
