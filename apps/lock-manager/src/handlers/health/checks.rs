use crate::dto::HealthDependencyStatus;
use crate::state::StorageProbe;

pub(super) async fn check_storage(storage: &StorageProbe) -> HealthDependencyStatus {
    match storage {
        StorageProbe::Postgres(pool) => check_postgres(pool).await,
        StorageProbe::Memory => HealthDependencyStatus {
            status: "ok",
            detail: Some("in-memory lock store".to_owned()),
        },
    }
}

async fn check_postgres(pool: &sqlx::PgPool) -> HealthDependencyStatus {
    let check = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    match check {
        Ok(_) => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Err(error) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("postgres check failed: {error}")),
        },
    }
}
