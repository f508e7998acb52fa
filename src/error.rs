use thiserror::Error;

use crate::adapter::RestError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rest(#[from] RestError),

    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid submission payload: {0}")]
    Payload(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload(message.into())
    }

    /// Transport error behind this failure, if any.
    pub fn as_rest(&self) -> Option<&RestError> {
        match self {
            Self::Rest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}
