//! Diagnostics context for remotestorage.
//!
//! Every component that logs receives an `Arc<Diagnostics>` at construction
//! time and asks it for a named [`Logger`]. The context holds the state that
//! would otherwise be global: which levels are enabled, which loggers are
//! silenced, and where records go.
//!
//! ```rust
//! use remotestorage_diagnostics::{Diagnostics, Level};
//!
//! let diagnostics = Diagnostics::new();
//! let logger = diagnostics.logger("sync");
//!
//! logger.info("starting");          // emitted
//! logger.debug("noisy details");    // dropped, debug is off by default
//!
//! diagnostics.set_log_level(Level::Debug);
//! logger.debug("now visible");
//! ```

mod context;
mod error;
mod level;
mod sink;

pub use context::{Diagnostics, Logger};
pub use error::Error;
pub use level::Level;
pub use sink::{LogSink, Record, RecordingSink};
