//! Error types for the Lumen engine
//!
//! Every fallible engine operation returns one of these kinds. Nothing in the
//! engine aborts the process; the driving application decides what is fatal.

use std::fmt;

/// Result type for Lumen engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Missing or empty shader binary, unsupported depth format, no
    /// presentation support, unusable window dimensions
    ConfigurationError(String),

    /// A graphics API call reported a failure
    DeviceError(String),

    /// No device memory type satisfies the requested property mask
    ResourceExhaustion(String),

    /// Use of a destroyed, torn down or unknown object
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Error::DeviceError(msg) => write!(f, "Device error: {}", msg),
            Error::ResourceExhaustion(msg) => write!(f, "Resource exhaustion: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
