//! Storage backend factory

use std::sync::Arc;

use crate::config::DatabaseConfig;

use super::backend::{StorageBackend, StorageResult};
use super::memory_backend::MemoryStorage;
use super::pool::PostgresPool;
use super::postgres_backend::PostgresStorage;

/// Create a storage backend based on configuration.
///
/// Returns the appropriate backend implementation based on the `backend` setting:
/// - `"postgres"`: connects, runs migrations and returns a `PostgresStorage`
/// - `"memory"` (default): Returns a `MemoryStorage`
///
/// A postgres backend requested without a `url` falls back to memory.
///
/// # Example
///
/// ```rust,ignore
/// let storage = create_storage_backend(&settings.database).await?;
/// ```
pub async fn create_storage_backend(
    settings: &DatabaseConfig,
) -> StorageResult<Arc<dyn StorageBackend>> {
    match (settings.backend.as_str(), settings.url.as_deref()) {
        ("postgres", Some(url)) => {
            let pool = PostgresPool::connect(settings, url).await?;
            pool.migrate().await?;
            tracing::info!(backend = "postgres", "Creating PostgreSQL storage backend");
            Ok(Arc::new(PostgresStorage::new(pool.pool().clone())))
        }
        ("postgres", None) => {
            tracing::warn!(
                "PostgreSQL backend requested but no database url configured, falling back to memory"
            );
            Ok(Arc::new(MemoryStorage::new()))
        }
        (other, _) => {
            if other != "memory" {
                tracing::warn!(backend = %other, "Unknown storage backend, using memory");
            }
            tracing::info!(backend = "memory", "Creating memory storage backend");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}
