//! Key generation strategies

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::domain::member::{KeyGenerator, MemberId, MemberRepository};
use crate::domain::DomainError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Which key generation strategy a composition uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// Draw from the 128-bit space without an existence check
    Random,
    /// Check each candidate against storage before use
    #[default]
    Verified,
}

/// Trust-the-space generator: a v4 UUID per call
#[derive(Debug, Clone, Default)]
pub struct RandomKeyGenerator;

impl RandomKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyGenerator for RandomKeyGenerator {
    async fn generate(&self) -> Result<MemberId, DomainError> {
        Ok(MemberId::random())
    }
}

/// Verify-then-use generator.
///
/// Draws candidates from `source` and returns the first one storage does not
/// know about, giving up after `max_attempts` draws.
#[derive(Debug)]
pub struct VerifiedKeyGenerator {
    repository: Arc<dyn MemberRepository>,
    source: Arc<dyn KeyGenerator>,
    max_attempts: u32,
}

impl VerifiedKeyGenerator {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self {
            repository,
            source: Arc::new(RandomKeyGenerator::new()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the retry bound (at least one attempt is always made)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Replace the candidate source
    pub fn with_source(mut self, source: Arc<dyn KeyGenerator>) -> Self {
        self.source = source;
        self
    }
}

#[async_trait]
impl KeyGenerator for VerifiedKeyGenerator {
    async fn generate(&self) -> Result<MemberId, DomainError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.source.generate().await?;

            if !self.repository.exists(&candidate).await? {
                return Ok(candidate);
            }

            warn!(attempt, candidate = %candidate, "Generated member ID already in use");
        }

        Err(DomainError::key_exhausted(self.max_attempts))
    }
}

/// Build the single generator a composition shares between handlers
pub fn create_key_generator(
    strategy: KeyStrategy,
    max_attempts: u32,
    repository: Arc<dyn MemberRepository>,
) -> Arc<dyn KeyGenerator> {
    match strategy {
        KeyStrategy::Random => Arc::new(RandomKeyGenerator::new()),
        KeyStrategy::Verified => {
            Arc::new(VerifiedKeyGenerator::new(repository).with_max_attempts(max_attempts))
        }
    }
}
