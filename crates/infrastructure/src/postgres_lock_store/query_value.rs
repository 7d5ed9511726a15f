use chrono::{DateTime, Utc};
use pit_domain::LockId;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;

/// Parameter kinds bound by lock table statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum QueryValue {
    Text(String),
    TextArray(Vec<String>),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<&[LockId]> for QueryValue {
    fn from(lock_ids: &[LockId]) -> Self {
        Self::TextArray(
            lock_ids
                .iter()
                .map(|lock_id| lock_id.as_str().to_owned())
                .collect(),
        )
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Binds `values` to `$1..$n` in order.
pub(super) fn bind_all<'q>(
    query: Query<'q, Postgres, PgArguments>,
    values: &'q [QueryValue],
) -> Query<'q, Postgres, PgArguments> {
    values
        .iter()
        .fold(query, |query, value| match value {
            QueryValue::Text(text) => query.bind(text.as_str()),
            QueryValue::TextArray(texts) => query.bind(texts.as_slice()),
            QueryValue::Timestamp(timestamp) => query.bind(*timestamp),
        })
}
