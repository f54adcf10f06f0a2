//! Identifier allocation for new members

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::MemberId;
use crate::domain::DomainError;

/// Issues identifiers for new members.
///
/// Identifiers are never taken from request input. A generator either trusts
/// the 128-bit space or verifies candidates against storage; one composition
/// uses exactly one generator for every handler.
#[async_trait]
pub trait KeyGenerator: Send + Sync + Debug {
    /// Produce a fresh identifier.
    ///
    /// Errors are fatal: they mean the generator could not find a free key
    /// within its bounds, or storage failed while checking.
    async fn generate(&self) -> Result<MemberId, DomainError>;
}
