use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Permission granted for a scope.
///
/// Ordered by permissiveness, so `ReadWrite > Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "r", alias = "read")]
    Read,
    #[serde(rename = "rw", alias = "read-write")]
    ReadWrite,
}

impl Mode {
    /// Whether holding `self` permits a request for `requested`.
    pub fn satisfies(self, requested: Mode) -> bool {
        self >= requested
    }

    /// The more permissive of two optional modes.
    pub fn highest(a: Option<Mode>, b: Option<Mode>) -> Option<Mode> {
        a.max(b)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Read => "r",
            Mode::ReadWrite => "rw",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" | "read" => Ok(Mode::Read),
            "rw" | "read-write" => Ok(Mode::ReadWrite),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
