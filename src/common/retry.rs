// src/common/retry.rs

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::common::error::AppError;

/// Total attempts for a retryable write, including the first one.
const MAX_ATTEMPTS: u32 = 2;
const BASE_DELAY_MS: u64 = 120;

/// Transport-level failures worth a second attempt. Domain and constraint
/// errors never match: retrying those would just repeat the rejection.
pub fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Protocol(_)
            | sqlx::Error::WorkerCrashed
    )
}

/// Runs a database operation, retrying once with jittered backoff when it
/// fails with a transient transport error. The closure must be re-entrant:
/// every caller here wraps a whole transaction, so a retry replays the
/// operation from the beginning.
pub async fn with_retry<T, F, Fut>(op: &str, mut call: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match call().await {
            Err(AppError::DatabaseError(e)) if attempt < MAX_ATTEMPTS && is_transient(&e) => {
                let jitter = rand::thread_rng().gen_range(0..80u64);
                let delay = Duration::from_millis(BASE_DELAY_MS * u64::from(attempt) + jitter);
                tracing::warn!(
                    "transient database error on '{}' (attempt {}): {}; retrying in {:?}",
                    op,
                    attempt,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}
