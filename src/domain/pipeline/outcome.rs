//! Closed set of request outcomes

use serde::{Deserialize, Serialize};

use crate::domain::member::ValidationErrors;

/// Outcome kind attached to every dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    NotFound,
    Invalid,
    DuplicateId,
    UsernameUnavailable,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::Invalid => "invalid",
            Self::DuplicateId => "duplicate_id",
            Self::UsernameUnavailable => "username_unavailable",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one request: a status plus, on success only, a payload.
///
/// Field errors travel with `Invalid`; no other status carries data.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    NotFound,
    Invalid(ValidationErrors),
    DuplicateId,
    UsernameUnavailable,
}

impl<T> Outcome<T> {
    pub fn status(&self) -> Status {
        match self {
            Self::Success(_) => Status::Success,
            Self::NotFound => Status::NotFound,
            Self::Invalid(_) => Status::Invalid,
            Self::DuplicateId => Status::DuplicateId,
            Self::UsernameUnavailable => Status::UsernameUnavailable,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    /// Transform the success payload, leaving every other status intact
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(payload) => Outcome::Success(f(payload)),
            Self::NotFound => Outcome::NotFound,
            Self::Invalid(errors) => Outcome::Invalid(errors),
            Self::DuplicateId => Outcome::DuplicateId,
            Self::UsernameUnavailable => Outcome::UsernameUnavailable,
        }
    }
}
