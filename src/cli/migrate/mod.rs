//! Migrate command - applies the members schema

use tracing::info;

use crate::config::StorageBackend;
use crate::infrastructure::member::PostgresMemberRepository;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    if config.storage.backend == StorageBackend::Memory {
        info!("Memory backend selected; nothing to migrate");
        return Ok(());
    }

    let pool = crate::connect_postgres(&config.storage).await?;
    PostgresMemberRepository::new(pool).migrate().await?;

    Ok(())
}
