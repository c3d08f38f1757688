use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid filter operator '{0}'")]
    InvalidOperator(String),

    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    #[error("Invalid validation rule: {0}")]
    InvalidRule(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
