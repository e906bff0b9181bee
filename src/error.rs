use serde::Serialize;
use thiserror::Error;

/// Failure kinds a query can report. Both are recoverable; the HTTP layer picks the status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
}

impl QueryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        QueryError::NotFound(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        QueryError::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::NotFound(_) => "not_found",
            QueryError::InvalidArgument(_) => "invalid_argument",
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
}

pub type QueryResult<T> = Result<T, QueryError>;
