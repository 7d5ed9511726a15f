use pit_application::LockService;
use sqlx::PgPool;

/// Backing storage the health endpoint probes.
#[derive(Clone)]
pub enum StorageProbe {
    Postgres(PgPool),
    Memory,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub lock_service: LockService,
    pub storage: StorageProbe,
}
