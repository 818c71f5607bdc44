use crate::FutureState;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FutureError {
    #[error("Can't resolve future, already resolved as: {0}")]
    AlreadySettled(FutureState),

    #[error("Can't get properties of non-object (properties: {fields})")]
    NotAnObject { fields: String },
}
