use thiserror::Error;
use updoot_core::CoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend Error: {status}: {message}")]
    Backend { status: String, message: String },
    #[error("Decode Error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Authentication Failed: {0}")]
    Auth(String),
    #[error("Storage Error: {0}")]
    Storage(String),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Invalid Request: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Decode(e) => CoreError::Serialization(e),
            other => CoreError::Request(other.to_string()),
        }
    }
}
