//! Error types for the topic filter

use thiserror::Error;

/// Result type alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running the relay
#[derive(Debug, Error)]
pub enum Error {
    /// Smoothing coefficient outside (0, 1]
    #[error("Invalid alpha {0} (must be in (0,1])")]
    InvalidAlpha(f64),

    /// A publisher or subscription could not be created or used
    #[error("Bus error on topic {topic}: {message}")]
    Bus { topic: String, message: String },

    /// A serialized sample could not be decoded into a wire message
    #[error("Malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a Bus error for a topic
    pub fn bus(topic: impl Into<String>, message: impl ToString) -> Self {
        Self::Bus {
            topic: topic.into(),
            message: message.to_string(),
        }
    }

    /// Create a Config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
