//! Unified error types for the domain layer
//!
//! Provides a common error type for validated construction of domain values,
//! so adapters never have to fall back to String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when a value cannot be constructed:
    /// - Required fields are empty or missing
    /// - Values are outside allowed ranges
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("Character name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
