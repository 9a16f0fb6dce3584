//! Error taxonomy for the firewall reconciler
//!
//! Validation errors are turned into failed results by the reconciler.
//! `EngineError` is the unrecoverable class: the control executable could
//! not be run at all, or the caller cancelled the invocation.

use thiserror::Error;

/// The request could not be turned into a `ReconciliationRequest`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Only one of `port`, `service`, or `rich_rule` may be provided.")]
    AmbiguousSelector,

    #[error("One of 'port', 'service', or 'richrule' is required")]
    MissingSelector,

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),
}

/// Malformed harness input, before any validation happens
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parameters must be a JSON object")]
    NotAnObject,

    #[error("Expected key=value, got `{0}`")]
    BadPair(String),
}

/// Failures that abort a reconciliation without a structured result
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to start `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to collect output from `{program}`: {source}")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Reconciliation cancelled")]
    Cancelled,
}
