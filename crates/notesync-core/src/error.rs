use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the note pipeline, the document store and history.
///
/// The block parser itself never fails; see [`crate::diagnostic`].
#[derive(Debug, Error)]
pub enum Error {
    /// The language model could not produce a reply.
    #[error("language model error: {0}")]
    Model(String),

    /// The model replied, but not with the JSON shape that step expects.
    #[error("malformed {step} response: {reason}")]
    MalformedResponse { step: &'static str, reason: String },

    /// The document store rejected a request.
    #[error("document store error ({status}): {message}")]
    Store { status: u16, message: String },

    /// A history file line could not be decoded.
    #[error("corrupt history entry at {path}:{line}: {source}")]
    History {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a malformed model reply.
    pub fn malformed(step: &'static str, reason: impl Into<String>) -> Self {
        Error::MalformedResponse {
            step,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
