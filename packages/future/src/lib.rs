//! Cooperative futures for remotestorage.
//!
//! A [`Future`] settles exactly once, either fulfilled with a value or failed
//! with an error. Continuations registered with [`Future::then`] run
//! synchronously when it settles and feed a successor future, so work can be
//! chained without native concurrency.
//!
//! Deferred work goes through a [`Runtime`], a single-threaded tick queue.
//! `fulfill_later`, `fail_later`, [`Runtime::make_future`] and the
//! combinators never run in the caller's stack frame; they run when the
//! runtime is ticked.
//!
//! ```rust
//! use remotestorage_diagnostics::Diagnostics;
//! use remotestorage_future::{Outcome, Runtime};
//!
//! let runtime = Runtime::new(&Diagnostics::new());
//!
//! let squares = runtime.map(vec![1, 2, 3], |x: i32| Ok::<_, String>(Outcome::Value(x * x)));
//! runtime.run_until_idle();
//!
//! let (results, errors) = squares.outcome().unwrap().unwrap();
//! assert_eq!(results, vec![Some(1), Some(4), Some(9)]);
//! assert!(errors.is_empty());
//! ```

mod combinators;
mod error;
mod future;
mod runtime;

pub use combinators::{Collected, Task};
pub use error::FutureError;
pub use future::{Continued, Future, FutureState, Outcome};
pub use runtime::Runtime;
