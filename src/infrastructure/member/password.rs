//! Member password hashing

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Argon2 memory cost in KiB when none is configured
pub const DEFAULT_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;
/// Argon2 passes over memory when none is configured
pub const DEFAULT_ITERATIONS: u32 = Params::DEFAULT_T_COST;
/// Argon2 lanes when none is configured
pub const DEFAULT_LANES: u32 = Params::DEFAULT_P_COST;

/// One-way hashing of member passwords.
///
/// Implementations must not run the hash on the async executor.
#[async_trait]
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash `password` under a fresh salt, returning a PHC string
    async fn hash(&self, password: String) -> Result<String, DomainError>;

    /// Check `password` against a PHC string produced by `hash`.
    ///
    /// A malformed `stored` value never matches.
    async fn verify(&self, password: String, stored: String) -> Result<bool, DomainError>;
}

/// Argon2id hasher running on tokio's blocking pool
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit Argon2 costs; rejects combinations Argon2 cannot run
    pub fn with_cost(memory_kib: u32, iterations: u32, lanes: u32) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, lanes, None).map_err(|e| {
            DomainError::configuration(format!("Invalid password hashing cost: {}", e))
        })?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: String) -> Result<String, DomainError> {
        use argon2::PasswordHasher as _;

        let argon2 = self.argon2();

        blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|phc| phc.to_string())
                .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
        })
        .await?
    }

    async fn verify(&self, password: String, stored: String) -> Result<bool, DomainError> {
        use argon2::PasswordVerifier as _;

        // Costs are read back from the PHC string, not from `self.params`.
        let argon2 = self.argon2();

        blocking(move || match PasswordHash::new(&stored) {
            Ok(phc) => argon2.verify_password(password.as_bytes(), &phc).is_ok(),
            Err(_) => false,
        })
        .await
    }
}

async fn blocking<T, F>(work: F) -> Result<T, DomainError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))
}
