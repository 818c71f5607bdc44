#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),
}
