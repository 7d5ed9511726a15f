use chrono::{DateTime, Utc};

/// Time source used to evaluate and compute lease expiry.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
