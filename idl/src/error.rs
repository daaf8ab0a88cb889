use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdlError>;

#[derive(Debug, Error)]
pub enum IdlError {
    #[error("Unsupported type: {0}")]
    UnsupportedType(Value),
    #[error("Unsupported primitive type: {0}")]
    UnsupportedPrimitive(String),
    #[error("{0}")]
    InvalidLeafTuple(String),
    #[error("IDL spec not supported: {0}")]
    SpecNotSupported(String),
    #[error("IDL does not contain address")]
    MissingProgramAddress,
    #[error("Could not parse IDL JSON: {0}")]
    InvalidDescriptor(serde_json::Error),
    #[error("Could not read file: {0}: {1}")]
    FileRead(String, std::io::Error),
}

impl IdlError {
    /// Wraps a raw type shape that no converter understands.
    pub fn unsupported(shape: &impl serde::Serialize) -> Self {
        IdlError::UnsupportedType(serde_json::to_value(shape).unwrap_or(Value::Null))
    }
}

impl From<serde_json::Error> for IdlError {
    fn from(e: serde_json::Error) -> Self {
        IdlError::InvalidDescriptor(e)
    }
}
