use thiserror::Error;

/// Errors raised by the shared Edge types before any network call is made.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid identifier {value:?}: {reason}")]
    InvalidId { value: String, reason: String },

    #[error("Invalid value for property {key:?}: expected {expected}")]
    InvalidProperty { key: String, expected: &'static str },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
