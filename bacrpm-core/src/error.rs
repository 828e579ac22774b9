use thiserror::Error;

/// Main error type for bacrpm operations
#[derive(Error, Debug)]
pub enum BacnetError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),
}

/// Result type alias for bacrpm operations
pub type BacnetResult<T> = Result<T, BacnetError>;
