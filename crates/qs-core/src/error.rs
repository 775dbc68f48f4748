//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert them into `QsError`
//! via `From` impls, or keep them separate and wrap `QsError` as one variant.
//! `qs-sim` does the latter.

use thiserror::Error;

/// Error returned by a model-author callback (service time, interarrival, …).
pub type ModelError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The top-level error type for `qs-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum QsError {
    /// A required model hook is missing or a construction parameter is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation was attempted in the wrong lifecycle state (e.g. a timing
    /// query on an entity that has not been disposed).
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("unsupported sample frequency {0}; pick one of 0.01, 0.1, 1")]
    UnsupportedSampleFrequency(f64),

    #[error("resource {0} was not visited during the simulation")]
    UnknownResource(String),

    /// An author-supplied callback failed or produced an unusable value.
    /// `hook` names the callback (e.g. `"Teller service_time"`); the
    /// author's error is preserved as the source.
    #[error("error when calling {hook}: {source}")]
    ModelCallback {
        hook:   String,
        #[source]
        source: ModelError,
    },
}

impl QsError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        QsError::InvalidState(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        QsError::Config(msg.into())
    }

    pub fn model_callback(hook: impl Into<String>, source: impl Into<ModelError>) -> Self {
        QsError::ModelCallback { hook: hook.into(), source: source.into() }
    }
}

/// Shorthand result type for all `qs-*` crates.
pub type QsResult<T> = Result<T, QsError>;
