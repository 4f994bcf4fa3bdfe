//! Client Storage
//!
//! Key-value storage standing in for the browser's local and session
//! storage. Everything the app persists between runs goes through here:
//!
//! - **store**: `KeyValueStore` trait with an in-memory and a SQLite backend
//! - **local**: `LocalStorage`, a typed JSON layer over any store
//! - **keys**: well-known storage keys
//! - **error**: Error types
//!
//! Stored values are JSON strings. A value that fails to parse is treated as
//! absent, so a corrupted entry sends the user back to the start of the
//! relevant flow instead of failing it.
//!
//! # Example
//!
//! ```rust,no_run
//! use finhealth::storage::{keys, LocalStorage, SqliteStore};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::open("./finhealth_data")?);
//! let local = LocalStorage::new(store);
//!
//! local.set_string(keys::PREFERRED_LANGUAGE, "ar")?;
//! assert_eq!(local.get_string(keys::PREFERRED_LANGUAGE).as_deref(), Some("ar"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod keys;
pub mod local;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
