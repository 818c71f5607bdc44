#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}
