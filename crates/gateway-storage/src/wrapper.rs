//! Blocking facade over an [`AsyncStorage`].
//!
//! Each call issues the asynchronous operation with a completion callback
//! that fulfils a one-shot channel, then blocks on the receiving end. An
//! error delivered to the callback becomes the returned error.

use tokio::sync::oneshot;
use tracing::warn;

use crate::backend::{AsyncStorage, Completion};
use crate::entry::Entry;
use crate::error::{Result, StorageError};

/// Synchronous wrapper around a callback-based storage backend.
///
/// # Panics
///
/// Every method blocks the calling thread and panics if called from within
/// an asynchronous runtime worker; use `spawn_blocking` there.
#[derive(Debug, Clone)]
pub struct StorageWrapper<S> {
    storage: S,
}

impl<S: AsyncStorage> StorageWrapper<S> {
    /// Wraps a backend.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.storage
    }

    /// Consumes the wrapper and returns the backend.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Reads one row.
    pub fn get_row(&self, table: &str, key: &str) -> Result<Option<Entry>> {
        wait(|done| self.storage.async_get_row(table, key, done))
            .inspect_err(|e| warn!(table = %table, key = %key, error = %e, "get_row failed"))
    }

    /// Reads several rows, one slot per key.
    pub fn get_rows(&self, table: &str, keys: &[String]) -> Result<Vec<Option<Entry>>> {
        wait(|done| self.storage.async_get_rows(table, keys, done))
            .inspect_err(|e| warn!(table = %table, keys = keys.len(), error = %e, "get_rows failed"))
    }

    /// Writes one row.
    pub fn set_row(&self, table: &str, key: &str, entry: Entry) -> Result<()> {
        wait(|done| self.storage.async_set_row(table, key, entry, done))
            .inspect_err(|e| warn!(table = %table, key = %key, error = %e, "set_row failed"))
    }

    /// Creates a table with no value fields.
    pub fn create_table(&self, table: &str) -> Result<()> {
        self.create_table_with_fields(table, "")
    }

    /// Creates a table with the given value field list.
    pub fn create_table_with_fields(&self, table: &str, value_fields: &str) -> Result<()> {
        wait(|done| self.storage.async_create_table(table, value_fields, done))
            .inspect_err(|e| warn!(table = %table, error = %e, "create_table failed"))
    }
}

fn wait<T: Send + 'static>(issue: impl FnOnce(Completion<T>)) -> Result<T> {
    let (tx, rx) = oneshot::channel();
    issue(Box::new(move |result| {
        // The receiver only goes away if the waiting thread is gone.
        let _ = tx.send(result);
    }));
    rx.blocking_recv().unwrap_or(Err(StorageError::Cancelled))
}
