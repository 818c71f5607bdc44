#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown access mode: {0:?} (expected \"r\" or \"rw\")")]
    UnknownMode(String),
}
