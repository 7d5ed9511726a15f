//! HTTP client for the PIT lock manager, used by test apps.

#![forbid(unsafe_code)]

mod wire;

use std::time::Duration;

use pit_core::{AppError, AppResult};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use wire::{AcquireResponse, LockDescription};

use wire::{AcquireRequest, ErrorBody, LockBatchRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for one lock manager instance.
#[derive(Debug, Clone)]
pub struct LockManagerClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LockManagerClient {
    /// Creates a client for the service at `base_url`, e.g. `http://lock-manager:60001`.
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self::with_http_client(http_client, base_url))
    }

    /// Creates a client that reuses an existing HTTP client.
    #[must_use]
    pub fn with_http_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Attempts to acquire `lock_id` once. Contention is `acquired: false`.
    pub async fn acquire(
        &self,
        lock_id: &str,
        owner: &str,
        expiry_in_sec: Option<u32>,
    ) -> AppResult<AcquireResponse> {
        let response = self
            .http_client
            .post(self.endpoint("/locks/acquire"))
            .json(&AcquireRequest {
                lock_id,
                owner,
                expiry_in_sec,
            })
            .send()
            .await
            .map_err(|error| transport_error("acquire", error))?;

        let acquisition: AcquireResponse = parse_json("acquire", response).await?;
        debug!(lock_id, owner, acquired = acquisition.acquired, "lock acquire answered");
        Ok(acquisition)
    }

    /// Releases the given locks and returns the ids that were actually released.
    pub async fn release(&self, lock_ids: &[String], owner: &str) -> AppResult<Vec<String>> {
        let response = self
            .http_client
            .post(self.endpoint("/locks/release"))
            .json(&LockBatchRequest {
                lock_ids,
                owner,
                expiry_in_sec: None,
            })
            .send()
            .await
            .map_err(|error| transport_error("release", error))?;

        parse_json("release", response).await
    }

    /// Extends the given leases and returns the ids that were actually extended.
    pub async fn keep_alive(
        &self,
        lock_ids: &[String],
        owner: &str,
        expiry_in_sec: Option<u32>,
    ) -> AppResult<Vec<String>> {
        let response = self
            .http_client
            .post(self.endpoint("/locks/keep-alive"))
            .json(&LockBatchRequest {
                lock_ids,
                owner,
                expiry_in_sec,
            })
            .send()
            .await
            .map_err(|error| transport_error("keep-alive", error))?;

        parse_json("keep-alive", response).await
    }

    /// Returns the live holder of `lock_id`, or `None` when the lock is free.
    pub async fn describe(&self, lock_id: &str) -> AppResult<Option<LockDescription>> {
        let mut url = reqwest::Url::parse(self.endpoint("/locks/by-id").as_str())
            .map_err(|error| AppError::Validation(format!("invalid lock manager url: {error}")))?;
        url.path_segments_mut()
            .map_err(|()| AppError::Validation("lock manager url cannot be a base".to_owned()))?
            .push(lock_id);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|error| transport_error("describe", error))?;

        if response.status() == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return free_lock_or_error(body.as_str());
        }

        parse_json("describe", response).await.map(Some)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn transport_error(operation: &str, error: reqwest::Error) -> AppError {
    AppError::Unavailable(format!("failed to call lock manager {operation}: {error}"))
}

async fn parse_json<T: DeserializeOwned>(operation: &str, response: Response) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());
        return Err(status_error(status, body.as_str()));
    }

    response.json::<T>().await.map_err(|error| {
        AppError::Internal(format!(
            "failed to parse lock manager {operation} response body: {error}"
        ))
    })
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = server_message(body).unwrap_or_else(|| {
        format!("lock manager returned status {}: {body}", status.as_u16())
    });

    match status {
        StatusCode::BAD_REQUEST => AppError::Validation(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::SERVICE_UNAVAILABLE => AppError::Unavailable(message),
        _ => AppError::Internal(message),
    }
}

/// The lock manager answers a free lock with its own error body. A bare 404
/// comes from something else, such as a wrong base URL.
fn free_lock_or_error(body: &str) -> AppResult<Option<LockDescription>> {
    match server_message(body) {
        Some(_) => Ok(None),
        None => Err(status_error(StatusCode::NOT_FOUND, body)),
    }
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|error| error.message)
}
