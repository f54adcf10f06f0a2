use thiserror::Error;

/// Failures that abort a request.
///
/// Expected outcomes (bad input, missing member, taken username) are never
/// reported through this type; they are a [`Status`](crate::domain::Status).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Key generation exhausted after {attempts} attempts")]
    KeyExhausted { attempts: u32 },

    #[error("Member '{id}' kept changing; gave up after {attempts} attempts")]
    WriteConflict { id: String, attempts: u32 },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn key_exhausted(attempts: u32) -> Self {
        Self::KeyExhausted { attempts }
    }

    pub fn write_conflict(id: impl Into<String>, attempts: u32) -> Self {
        Self::WriteConflict {
            id: id.into(),
            attempts,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
