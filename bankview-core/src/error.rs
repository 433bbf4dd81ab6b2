//! Error type shared by the record model and the analytics built on it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A date column or an anchor date did not match the expected format.
    #[error("malformed date '{value}': expected {expected}")]
    MalformedDate { value: String, expected: &'static str },

    /// The input was not a list of field mappings.
    #[error("invalid input shape: {0}")]
    InvalidShape(String),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
