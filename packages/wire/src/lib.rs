//! # remotestorage-wire
//!
//! Connection state and storage access for a remote storage account.
//!
//! [`WireClient`] persists three fields in a
//! [`KeyValueStore`](remotestorage_kv_store::KeyValueStore): the storage
//! type, the base address of the user's storage, and a bearer token. Its
//! [`ConnectionState`] is derived from them:
//!
//! | storage type + address | bearer token | state       |
//! |------------------------|--------------|-------------|
//! | missing                | any          | `anonymous` |
//! | present                | missing      | `authing`   |
//! | present                | present      | `connected` |
//!
//! Requests take paths relative to the storage root and are handed to a
//! [`Transport`] with the bearer token attached.
//!
//! ```ignore
//! use remotestorage_wire::{ReqwestTransport, WireClient};
//! use remotestorage_kv_store::LocalDiskStore;
//!
//! let store = LocalDiskStore::open("settings.json")?;
//! let client = WireClient::new(store, ReqwestTransport::with_default_timeout()?, &diagnostics);
//!
//! client.set_storage_info("remotestorage-00", "https://storage.example/alice")?;
//! client.set_bearer_token(&token)?;
//!
//! client.get("/notes/today", |result| match result {
//!     Ok(Some(document)) => println!("{}", document.body),
//!     Ok(None) => println!("no notes"),
//!     Err(error) => eprintln!("{}", error),
//! });
//! ```
//!
//! ## Path helpers
//!
//! [`path`] holds utility functions for applications walking a storage tree.
//! The client itself takes paths verbatim and does not use them.
//!
//! ```
//! use remotestorage_wire::path::{base_name, containing_dir, is_dir, path_parts};
//!
//! assert!(is_dir("/notes/"));
//! assert_eq!(path_parts("/notes/2024/today"), ["/", "notes/", "2024/", "today"]);
//! assert_eq!(containing_dir("/notes/today").as_deref(), Some("/notes/"));
//! assert_eq!(base_name("/notes/2024/"), "2024/");
//! ```

pub mod chain;
pub mod client;
pub mod error;
pub mod path;
pub mod transport;
pub mod types;

pub use chain::set_chain;
pub use client::WireClient;
pub use error::{Error, TransportError};
pub use transport::{ReqwestTransport, Transport};
pub use types::{ConnectionState, Document, Timestamp, WireConfig, WireEvent};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::mock;
