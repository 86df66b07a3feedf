//! # gateway-storage
//!
//! Blocking access to the gateway's key-value storage.
//!
//! Storage engines expose asynchronous operations that report through a
//! completion callback ([`AsyncStorage`]). [`StorageWrapper`] turns each of
//! them into a plain blocking call returning a [`Result`].
//!
//! ```rust
//! use gateway_storage::{Entry, MemoryStorage, StorageWrapper};
//!
//! let storage = StorageWrapper::new(MemoryStorage::new());
//! storage.create_table("s_config").expect("create table");
//! storage
//!     .set_row("s_config", "tx_count_limit", Entry::new().with_field("value", "1000"))
//!     .expect("set row");
//!
//! let row = storage.get_row("s_config", "tx_count_limit").expect("get row");
//! assert_eq!(row.and_then(|e| e.get("value").map(str::to_owned)).as_deref(), Some("1000"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod entry;
pub mod error;
pub mod wrapper;

pub use backend::{AsyncStorage, Completion, MemoryStorage};
pub use entry::Entry;
pub use error::{Result, StorageError};
pub use wrapper::StorageWrapper;
