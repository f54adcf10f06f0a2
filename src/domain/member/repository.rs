//! Member repository trait

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::entity::{Member, MemberId};
use crate::domain::DomainError;

/// Result of a conditional write.
///
/// Conflicts are detected atomically inside the store, so two racing writers
/// cannot both see `Saved` for the same identifier or username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Another member already holds this identifier
    DuplicateId,
    /// Another member already holds this username (case-insensitive)
    UsernameTaken,
    /// Update target does not exist
    Missing,
    /// The stored member moved past the version the update was based on
    Stale,
}

/// Repository trait for member storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync + Debug {
    /// Check if a member ID is in use
    async fn exists(&self, id: &MemberId) -> Result<bool, DomainError>;

    /// Check if a username is in use, ignoring case
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError>;

    /// Get a member by ID
    async fn get(&self, id: &MemberId) -> Result<Option<Member>, DomainError>;

    /// List all members, oldest first
    async fn list(&self) -> Result<Vec<Member>, DomainError>;

    /// Insert only if neither the ID nor the username is taken
    async fn insert(&self, member: &Member) -> Result<SaveOutcome, DomainError>;

    /// Replace an existing member, keeping usernames unique.
    ///
    /// Succeeds only while the stored version still equals `member.version()`;
    /// the stored version is then incremented.
    async fn update(&self, member: &Member) -> Result<SaveOutcome, DomainError>;
}
