//! Device store factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

use super::memory_backend::MemoryDeviceStore;
use super::postgres_backend::PostgresDeviceStore;
use super::store::DeviceStore;

/// Create a device store based on configuration.
///
/// - `"postgres"`: a `PostgresDeviceStore` if a PostgreSQL pool is provided
/// - `"memory"` (default): a `MemoryDeviceStore`
pub fn create_device_store(
    settings: &DatabaseConfig,
    postgres_pool: Option<&PostgresPool>,
) -> Arc<dyn DeviceStore> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL device store");
                Arc::new(PostgresDeviceStore::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL device store requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryDeviceStore::new())
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory device store");
            Arc::new(MemoryDeviceStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_memory_without_pool() {
        let settings = DatabaseConfig {
            backend: "postgres".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(create_device_store(&settings, None).backend_type(), "memory");
        assert_eq!(
            create_device_store(&DatabaseConfig::default(), None).backend_type(),
            "memory"
        );
    }
}
