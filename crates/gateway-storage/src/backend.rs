//! Callback-based storage backends.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::entry::Entry;
use crate::error::{Result, StorageError};

/// Completion callback of an asynchronous storage operation.
pub type Completion<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// A key-value storage engine with asynchronous, callback-based operations.
///
/// Implementations may invoke the callback inline or from another thread, but
/// must invoke it at most once.
pub trait AsyncStorage: Send + Sync {
    /// Reads one row.
    fn async_get_row(&self, table: &str, key: &str, callback: Completion<Option<Entry>>);

    /// Reads several rows; the result has one slot per key, in key order.
    fn async_get_rows(&self, table: &str, keys: &[String], callback: Completion<Vec<Option<Entry>>>);

    /// Writes one row.
    fn async_set_row(&self, table: &str, key: &str, entry: Entry, callback: Completion<()>);

    /// Creates a table with the given value field list.
    fn async_create_table(&self, table: &str, value_fields: &str, callback: Completion<()>);
}

impl<S: AsyncStorage + ?Sized> AsyncStorage for Arc<S> {
    fn async_get_row(&self, table: &str, key: &str, callback: Completion<Option<Entry>>) {
        (**self).async_get_row(table, key, callback);
    }

    fn async_get_rows(&self, table: &str, keys: &[String], callback: Completion<Vec<Option<Entry>>>) {
        (**self).async_get_rows(table, keys, callback);
    }

    fn async_set_row(&self, table: &str, key: &str, entry: Entry, callback: Completion<()>) {
        (**self).async_set_row(table, key, entry, callback);
    }

    fn async_create_table(&self, table: &str, value_fields: &str, callback: Completion<()>) {
        (**self).async_create_table(table, value_fields, callback);
    }
}

#[derive(Debug, Default)]
struct Table {
    value_fields: String,
    rows: BTreeMap<String, Entry>,
}

/// In-memory [`AsyncStorage`] that completes every callback inline.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value field list a table was created with.
    #[must_use]
    pub fn value_fields(&self, table: &str) -> Option<String> {
        self.tables.read().get(table).map(|t| t.value_fields.clone())
    }

    /// Returns the number of rows in a table.
    #[must_use]
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.read().get(table).map(|t| t.rows.len())
    }

    fn missing(table: &str) -> StorageError {
        StorageError::TableNotFound {
            table: table.to_string(),
        }
    }
}

impl AsyncStorage for MemoryStorage {
    fn async_get_row(&self, table: &str, key: &str, callback: Completion<Option<Entry>>) {
        let result = self
            .tables
            .read()
            .get(table)
            .map(|t| t.rows.get(key).cloned())
            .ok_or_else(|| Self::missing(table));
        callback(result);
    }

    fn async_get_rows(&self, table: &str, keys: &[String], callback: Completion<Vec<Option<Entry>>>) {
        let result = self
            .tables
            .read()
            .get(table)
            .map(|t| keys.iter().map(|k| t.rows.get(k).cloned()).collect())
            .ok_or_else(|| Self::missing(table));
        callback(result);
    }

    fn async_set_row(&self, table: &str, key: &str, entry: Entry, callback: Completion<()>) {
        let result = {
            let mut tables = self.tables.write();
            match tables.get_mut(table) {
                Some(t) => {
                    t.rows.insert(key.to_string(), entry);
                    Ok(())
                }
                None => Err(Self::missing(table)),
            }
        };
        callback(result);
    }

    fn async_create_table(&self, table: &str, value_fields: &str, callback: Completion<()>) {
        let result = {
            let mut tables = self.tables.write();
            if tables.contains_key(table) {
                Err(StorageError::TableExists {
                    table: table.to_string(),
                })
            } else {
                tables.insert(
                    table.to_string(),
                    Table {
                        value_fields: value_fields.to_string(),
                        rows: BTreeMap::new(),
                    },
                );
                debug!(table = %table, "Created table");
                Ok(())
            }
        };
        callback(result);
    }
}
