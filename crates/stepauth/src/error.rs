//! Error types for authentication runs.
//!
//! Only configuration and transport failures are errors. A parameter that
//! cannot be found in a response is an ordinary `None` and never reaches
//! this type.

use thiserror::Error;

/// Failure that aborts an authentication run.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Step list or parameter set could not be understood.
    #[error("configuration error: {0}")]
    Config(String),

    /// A parameter the step source requires was not supplied.
    #[error("missing required parameter: {0}")]
    MissingParam(String),

    /// The step declares an HTTP method outside the supported set.
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// A header or cookie block segment has no delimiter.
    #[error("malformed {block} segment {segment:?}: expected a '{delimiter}' delimiter")]
    MalformedSegment {
        block: &'static str,
        segment: String,
        delimiter: char,
    },

    /// A step URL could not be parsed as an absolute URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request could not be sent or its response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The sequence had no steps to run.
    #[error("authentication sequence has no steps")]
    EmptySequence,
}

impl AuthError {
    /// Whether the error comes from configuration rather than the network.
    pub fn is_config(&self) -> bool {
        !matches!(self, AuthError::Transport(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
