use thiserror::Error;

use crate::config::ConfigError;
use crate::event::EventError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Event error: {0}")]
    Event(#[from] EventError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
