//! Re-entrant, per-instance guard.

use std::cell::RefCell;
use std::fmt;

use parking_lot::ReentrantMutex;

use crate::containers::Collection;
use crate::error::{CollectionError, Result};

/// A collection behind a re-entrant mutex.
///
/// Every call locks for its own duration and releases on every exit path,
/// including panics and error returns. The thread holding the lock may call
/// back into the same `Shared` from inside a closure: nested reads succeed,
/// while a nested access that would alias a live mutable borrow fails with
/// [`CollectionError::ResourceBusy`].
///
/// ```rust
/// use std::sync::Arc;
/// use ordered_collections::{thread::Shared, Value, Vector, TYPE_I32};
///
/// let shared = Arc::new(Shared::new(Vector::new(&TYPE_I32)));
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let shared = Arc::clone(&shared);
///         std::thread::spawn(move || {
///             shared.write(|v| v.add_entry(None, Value::I32(t), None)).unwrap().unwrap();
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(shared.read(|v| v.len()).unwrap(), 4);
/// ```
pub struct Shared<C> {
    inner: ReentrantMutex<RefCell<C>>,
}

impl<C> Shared<C> {
    /// Guard `collection`.
    pub fn new(collection: C) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(collection)),
        }
    }

    /// Run `f` with shared access, blocking until other threads release the lock.
    pub fn read<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&C) -> R,
    {
        let guard = self.inner.lock();
        let collection = guard.try_borrow().map_err(|_| busy("read"))?;
        Ok(f(&collection))
    }

    /// Run `f` with exclusive access, blocking until other threads release the lock.
    pub fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> R,
    {
        let guard = self.inner.lock();
        let mut collection = guard.try_borrow_mut().map_err(|_| busy("write"))?;
        Ok(f(&mut collection))
    }

    /// Like [`Shared::read`], but fails instead of waiting for another thread.
    pub fn try_read<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&C) -> R,
    {
        let guard = self.inner.try_lock().ok_or_else(|| busy("read"))?;
        let collection = guard.try_borrow().map_err(|_| busy("read"))?;
        Ok(f(&collection))
    }

    /// Like [`Shared::write`], but fails instead of waiting for another thread.
    pub fn try_write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> R,
    {
        let guard = self.inner.try_lock().ok_or_else(|| busy("write"))?;
        let mut collection = guard.try_borrow_mut().map_err(|_| busy("write"))?;
        Ok(f(&mut collection))
    }

    /// Direct access; `&mut self` already proves exclusivity.
    pub fn get_mut(&mut self) -> &mut C {
        self.inner.get_mut().get_mut()
    }

    /// Unwrap the collection.
    pub fn into_inner(self) -> C {
        self.inner.into_inner().into_inner()
    }
}

fn busy(access: &str) -> CollectionError {
    log::warn!("shared collection is busy; refusing {} access", access);
    CollectionError::resource_busy(format!("shared collection ({} access)", access))
}

impl<'a, C: Collection<'a>> Shared<C> {
    /// Independently guarded copy, taken under the lock.
    pub fn copy(&self) -> Result<Self> {
        self.read(|collection| Self::new(collection.copy()))
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize> {
        self.read(|collection| collection.len())
    }

    /// True when the collection is empty.
    pub fn is_empty(&self) -> Result<bool> {
        self.read(|collection| collection.is_empty())
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<()> {
        self.write(|collection| collection.clear())
    }

    /// JSON rendering taken under the lock.
    pub fn to_json(&self) -> Result<String> {
        self.read(|collection| collection.to_json())
    }

    /// Wire encoding taken under the lock.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.read(|collection| collection.to_bytes())?
    }
}

impl<C> From<C> for Shared<C> {
    fn from(collection: C) -> Self {
        Self::new(collection)
    }
}

impl<C: fmt::Debug> fmt::Debug for Shared<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => match guard.try_borrow() {
                Ok(collection) => f.debug_struct("Shared").field("collection", &*collection).finish(),
                Err(_) => f.write_str("Shared { <borrowed> }"),
            },
            None => f.write_str("Shared { <locked> }"),
        }
    }
}
