//! Publish/subscribe over a fixed vocabulary of events.
//!
//! Event kinds are an enum chosen by the caller. An [`EventEmitter`] is
//! constructed with the subset of kinds it recognizes; registering for or
//! emitting any other kind is an error.

mod emitter;
mod error;

pub use emitter::{Dispatch, EventEmitter};
pub use error::EventError;
