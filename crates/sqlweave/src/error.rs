//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Error types for building and executing statements
#[derive(Debug, Error)]
pub enum WeaveError {
    /// Builder state is not executable
    #[error("Validation error: {0}")]
    Validation(String),

    /// A joined table has no registered relation to any table before it
    #[error("No relation joins '{table}' (alias '{alias}') to an earlier table")]
    MissingRelation { table: String, alias: String },

    /// Placeholder template could not be expanded
    #[error("Template error: {0}")]
    Template(String),

    /// Parameter binding error
    #[error("Bind error: {0}")]
    Bind(String),

    /// Prepared statement error
    #[error("Statement error: {0}")]
    Statement(String),

    /// Error reported by the database collaborator
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl WeaveError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a bind error
    pub fn bind(message: impl Into<String>) -> Self {
        Self::Bind(message.into())
    }

    /// Create a statement error
    pub fn statement(message: impl Into<String>) -> Self {
        Self::Statement(message.into())
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a missing join relation
    pub fn is_missing_relation(&self) -> bool {
        matches!(self, Self::MissingRelation { .. })
    }

    /// Check if this is a bind error
    pub fn is_bind(&self) -> bool {
        matches!(self, Self::Bind(_))
    }
}
