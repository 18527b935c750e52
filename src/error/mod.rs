//! Error handling for the miner
//!
//! This module provides the error types for all mining operations.

use std::fmt;

/// Result type alias for miner operations
pub type Result<T> = std::result::Result<T, MinerError>;

/// Error types for the commit/reveal miner
#[derive(Debug, Clone)]
pub enum MinerError {
    /// Payload or chunk could not be serialized into the reveal script
    Encoding(String),
    /// Public key material is not a valid curve point representation
    InvalidKey(String),
    /// Script-tree commitment could not be built
    Script(String),
    /// Job description rejected before any iteration
    Job(String),
    /// A search unit failed or disappeared mid-search
    Worker(String),
    /// Configuration errors
    Config(String),
    /// System clock errors
    Time(String),
}

impl fmt::Display for MinerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinerError::Encoding(msg) => write!(f, "Encoding error: {msg}"),
            MinerError::InvalidKey(msg) => write!(f, "Invalid key: {msg}"),
            MinerError::Script(msg) => write!(f, "Script error: {msg}"),
            MinerError::Job(msg) => write!(f, "Invalid job: {msg}"),
            MinerError::Worker(msg) => write!(f, "Worker error: {msg}"),
            MinerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            MinerError::Time(msg) => write!(f, "Time error: {msg}"),
        }
    }
}

impl std::error::Error for MinerError {}

impl From<ciborium::ser::Error<std::io::Error>> for MinerError {
    fn from(err: ciborium::ser::Error<std::io::Error>) -> Self {
        MinerError::Encoding(err.to_string())
    }
}

impl From<bitcoin::secp256k1::Error> for MinerError {
    fn from(err: bitcoin::secp256k1::Error) -> Self {
        MinerError::InvalidKey(err.to_string())
    }
}

impl From<bitcoin::taproot::TaprootBuilderError> for MinerError {
    fn from(err: bitcoin::taproot::TaprootBuilderError) -> Self {
        MinerError::Script(err.to_string())
    }
}
