//! Error types for recorm

use thiserror::Error;

/// Result type alias for recorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query construction, persistence and the database collaborators
#[derive(Debug, Error)]
pub enum OrmError {
    /// An argument was rejected before any statement was built
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Named connection is missing or could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// The metadata provider could not describe a table
    #[error("Metadata error on table '{table}': {message}")]
    Metadata { table: String, message: String },

    /// Statement execution failed inside a database handle
    #[error("Execution error: {0}")]
    Execution(String),

    /// Error reported by the Postgres driver
    #[cfg(feature = "postgres")]
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Value decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a metadata error for a specific table
    pub fn metadata(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Metadata {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Attach a column name to a decode error raised without one.
    pub fn with_column(self, name: &str) -> Self {
        match self {
            Self::Decode { column, message } if column.is_empty() => Self::Decode {
                column: name.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a metadata error
    pub fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
