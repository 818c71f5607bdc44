//! Access scopes granted to an application.
//!
//! ```
//! use remotestorage_access::{Access, Mode};
//!
//! let access = Access::new();
//! access.set("contacts", "r".parse()?);
//!
//! assert!(access.check("contacts", Mode::Read));
//! assert!(!access.check("contacts", Mode::ReadWrite));
//! assert_eq!(access.root_paths(), vec!["/contacts/", "/public/contacts/"]);
//! # Ok::<(), remotestorage_access::Error>(())
//! ```

mod access;
mod error;
mod mode;

pub use access::{Access, ROOT_SCOPE};
pub use error::Error;
pub use mode::Mode;
