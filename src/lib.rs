//! Membership
//!
//! Self-service member registration and profile management built around a
//! typed request pipeline:
//! - Requests are validated field by field, collecting every error
//! - A dispatcher routes each request type to exactly one handler
//! - Every request resolves to one of a closed set of statuses

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use api::state::AppState;
use config::{StorageBackend, StorageConfig};
use domain::{DomainError, MemberRepository};
use infrastructure::member::{
    create_key_generator, Argon2Hasher, InMemoryMemberRepository, PostgresMemberRepository,
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository = create_member_repository(&config.storage).await?;
    let keys = create_key_generator(
        config.keys.strategy,
        config.keys.max_attempts,
        repository.clone(),
    );

    let hasher = Argon2Hasher::with_cost(
        config.password.memory_kib,
        config.password.iterations,
        config.password.lanes,
    )?;

    info!(
        storage = ?config.storage.backend,
        key_strategy = ?config.keys.strategy,
        "Membership pipeline composed"
    );

    Ok(AppState::new(repository, keys, Arc::new(hasher)))
}

async fn create_member_repository(
    config: &StorageConfig,
) -> anyhow::Result<Arc<dyn MemberRepository>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryMemberRepository::new())),
        StorageBackend::Postgres => {
            let pool = connect_postgres(config).await?;
            Ok(Arc::new(PostgresMemberRepository::new(pool)))
        }
    }
}

/// Open a connection pool for the postgres backend
pub async fn connect_postgres(config: &StorageConfig) -> anyhow::Result<PgPool> {
    let url = config.database_url.as_deref().ok_or_else(|| {
        DomainError::configuration("storage.database_url is required for the postgres backend")
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(max_connections = config.max_connections, "Connected to PostgreSQL");

    Ok(pool)
}
