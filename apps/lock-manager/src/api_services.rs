use std::sync::Arc;

use pit_application::{LockService, LockStore};
use pit_core::AppError;
use pit_infrastructure::{InMemoryLockStore, PostgresLockStore, SystemClock, connect_and_migrate};
use tracing::{info, warn};

use crate::api_config::{ApiConfig, StoreBackend};
use crate::state::{AppState, StorageProbe};

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let (store, storage): (Arc<dyn LockStore>, StorageProbe) = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = connect_and_migrate(&config.database, &config.pool).await?;
            info!("lock table migrations applied");
            (
                Arc::new(PostgresLockStore::new(pool.clone())),
                StorageProbe::Postgres(pool),
            )
        }
        StoreBackend::Memory => {
            warn!("using in-memory lock store; locks are not shared between instances");
            (Arc::new(InMemoryLockStore::new()), StorageProbe::Memory)
        }
    };

    Ok(AppState {
        lock_service: LockService::new(store, Arc::new(SystemClock::new()), config.lock_service),
        storage,
    })
}
