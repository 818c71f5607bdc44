//! remotestorage: client-side runtime for a remote key/object storage service.
//!
//! The pieces are independent crates re-exported here:
//!
//! - [`diagnostics`]: named, leveled loggers with per-logger silencing.
//! - [`future`]: single-threaded futures on a cooperative [`Runtime`], with
//!   `group`, `each`, `map` and `select` combinators.
//! - [`events`]: an [`EventEmitter`] over a fixed set of event kinds.
//! - [`kv_store`]: the durable string map that holds connection settings.
//! - [`wire`]: the [`WireClient`], which tracks connection state and reads
//!   and writes documents by path.
//! - [`access`]: granted scopes, permission checks and root paths.
//!
//! ```
//! use remotestorage::{Access, Diagnostics, InMemoryStore, Mode, Runtime, WireClient};
//! use remotestorage::wire::mock::MockTransport;
//!
//! let diagnostics = Diagnostics::new();
//! let runtime = Runtime::new(&diagnostics);
//! let client = WireClient::new(InMemoryStore::new(), MockTransport::new(), &diagnostics);
//!
//! let access = Access::new();
//! access.set("notes", Mode::ReadWrite);
//! assert!(access.check_path("/notes/today", Mode::ReadWrite));
//!
//! client.set_storage_info("remotestorage-00", "https://storage.example/alice").unwrap();
//! client.set_bearer_token("token").unwrap();
//!
//! let written = client.store(&runtime, "/notes/today", "buy milk", "text/plain");
//! runtime.run_until_idle();
//! assert!(written.outcome().unwrap().is_ok());
//! ```

pub use remotestorage_access as access;
pub use remotestorage_diagnostics as diagnostics;
pub use remotestorage_events as events;
pub use remotestorage_future as future;
pub use remotestorage_kv_store as kv_store;
pub use remotestorage_wire as wire;

pub use remotestorage_access::{Access, Mode};
pub use remotestorage_diagnostics::{Diagnostics, Level, Logger};
pub use remotestorage_events::EventEmitter;
pub use remotestorage_future::{Future, Outcome, Runtime};
pub use remotestorage_kv_store::{InMemoryStore, KeyValueStore, LocalDiskStore, SettingStore};
pub use remotestorage_wire::{ConnectionState, Document, ReqwestTransport, Transport, WireClient};
