//! Generation Errors
//!
//! Failure taxonomy for a structured report generation. None of these are
//! fatal: callers display the message and keep their previous state.

use thiserror::Error;

use crate::provider::ProviderError;
use crate::utils::truncate::excerpt;

/// Maximum number of characters of raw model text quoted in a format error.
pub const EXCERPT_CHARS: usize = 100;

/// What was wrong with a response body that did arrive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatProblem {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("response does not match the report schema at {path}: {message}")]
    SchemaMismatch { path: String, message: String },
    #[error("invalid value at {path}: {message}")]
    InvalidValue { path: String, message: String },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model call itself failed (network, auth, rate limit, HTTP status).
    #[error("model request failed: {0}")]
    Transport(#[from] ProviderError),

    /// The call succeeded but produced no usable text.
    #[error("the model returned an empty response{}", finish_suffix(.finish_reason))]
    EmptyResponse { finish_reason: Option<String> },

    /// Text came back but it is not a well-formed report.
    #[error("intelligence formatting error: {problem} (raw text: {excerpt:?})")]
    Format { problem: FormatProblem, excerpt: String },
}

impl GenerationError {
    /// Build a format error quoting a bounded prefix of the offending text.
    pub fn format(problem: FormatProblem, raw: &str) -> Self {
        GenerationError::Format {
            problem,
            excerpt: excerpt(raw, EXCERPT_CHARS),
        }
    }

    /// Stable short label, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Transport(_) => "transport",
            GenerationError::EmptyResponse { .. } => "empty_response",
            GenerationError::Format { .. } => "format",
        }
    }

    /// User-facing next step for this class of failure.
    pub fn remediation(&self) -> &'static str {
        match self {
            GenerationError::Transport(_) => {
                "Check network connectivity and the API credential, then try again."
            }
            GenerationError::EmptyResponse { .. } => {
                "The model produced no output, usually because of truncation or safety filtering. Try again."
            }
            GenerationError::Format { .. } => {
                "The model output was malformed or truncated. Generate a new report."
            }
        }
    }
}

fn finish_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" (finish reason: {})", r),
        None => String::new(),
    }
}
