//! Domain Errors
//!
//! Error types for store adapters, the notification sink and
//! configuration of the domain services.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by the durable and fast store adapters.
///
/// The repository decides what each variant means for the caller; adapters
/// only report what happened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Corrupt record for {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl StoreError {
    pub fn corrupt<T: AsRef<str>>(id: T, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            id: id.as_ref().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is a racing insert losing against an existing row
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

/// Errors reported by the notification/privilege sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("Notification failed for {user_id}: {reason}")]
    Notify { user_id: String, reason: String },

    #[error("Privilege grant failed for {user_id}: {reason}")]
    Grant { user_id: String, reason: String },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
