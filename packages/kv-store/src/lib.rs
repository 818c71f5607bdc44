//! Durable key/value storage.
//!
//! [`KeyValueStore`] is the minimal string map remotestorage persists its
//! configuration in. Two implementations are provided:
//!
//! - [`InMemoryStore`]: a plain map, gone when dropped.
//! - [`LocalDiskStore`]: one JSON document on disk, rewritten atomically on
//!   every change.
//!
//! [`SettingStore`] layers a `prefix:key` namespace with JSON values on top
//! of either.
//!
//! ```rust
//! use remotestorage_kv_store::{InMemoryStore, KeyValueStore, SettingStore};
//!
//! let mut store = InMemoryStore::new();
//! let mut settings = SettingStore::new(&mut store, "sync");
//! settings.set("interval", &10_000).unwrap();
//!
//! assert_eq!(settings.get("interval"), Some(serde_json::json!(10000)));
//! assert_eq!(store.get("sync:interval").as_deref(), Some("10000"));
//! ```

mod error;
mod in_memory;
mod local_disk;
mod settings;
mod traits;

pub use error::Error;
pub use in_memory::InMemoryStore;
pub use local_disk::LocalDiskStore;
pub use settings::SettingStore;
pub use traits::KeyValueStore;
