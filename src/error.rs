//! Error types shared by the backend client, the mock source and the forms.

use reqwest::StatusCode;

/// Client-side input problems, caught before anything is sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a keyword")]
    EmptyKeyword,
    #[error("Keyword must be at most {max} characters")]
    KeywordTooLong { max: usize },
    #[error("Please enter mention text")]
    EmptyText,
    #[error("Mention text must be at most {max} characters")]
    TextTooLong { max: usize },
    #[error("Please select at least one platform")]
    NoPlatform,
    #[error("Sentiment score must be between -1 and 1, got {0}")]
    ScoreOutOfRange(f64),
    #[error("URL must be at most {max} characters")]
    UrlTooLong { max: usize },
}

/// Failure of a single dashboard operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never got a response (connection refused, timeout, ...).
    #[error("{operation}: request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{operation}: API error: {status}")]
    Status {
        operation: &'static str,
        status: StatusCode,
    },

    /// The body arrived but did not match the expected shape.
    #[error("{operation}: invalid response body: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub fn operation(&self) -> &'static str {
        match self {
            ApiError::Transport { operation, .. }
            | ApiError::Status { operation, .. }
            | ApiError::Decode { operation, .. } => operation,
            ApiError::Validation(_) => "validate",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
