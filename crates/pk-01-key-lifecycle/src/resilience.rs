//! Call policy for external collaborators
//!
//! Every registry and directory call runs under a per-attempt timeout.
//! Idempotent reads go through [`call_idempotent`] and are retried on
//! transient failures. Writes go through [`call_once`].

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CallPolicy;
use crate::domain::errors::{DirectoryError, RegistryError};

/// Port error that can describe a timeout and tell transient failures apart.
pub trait CallFailure: Sized {
    /// Error to report when an attempt exceeds its budget.
    fn timed_out() -> Self;

    /// Whether another attempt might succeed.
    fn is_transient(&self) -> bool;
}

impl CallFailure for RegistryError {
    fn timed_out() -> Self {
        RegistryError::Timeout
    }

    fn is_transient(&self) -> bool {
        matches!(self, RegistryError::Unavailable(_) | RegistryError::Timeout)
    }
}

impl CallFailure for DirectoryError {
    fn timed_out() -> Self {
        DirectoryError::Timeout
    }

    fn is_transient(&self) -> bool {
        matches!(self, DirectoryError::Unavailable(_) | DirectoryError::Timeout)
    }
}

/// Run a non-idempotent call exactly once under `timeout`.
pub async fn call_once<T, E, Fut>(timeout: Duration, call: Fut) -> Result<T, E>
where
    E: CallFailure,
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(E::timed_out()),
    }
}

/// Run an idempotent call, retrying transient failures.
///
/// Makes at most `policy.max_attempts` attempts, sleeping `policy.backoff`
/// between them. Non-transient errors (e.g. not found) return immediately.
pub async fn call_idempotent<T, E, F, Fut>(
    policy: &CallPolicy,
    operation: &'static str,
    mut call: F,
) -> Result<T, E>
where
    E: CallFailure + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match call_once(policy.timeout, call()).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                debug!(operation, attempt, error = %e, "Transient failure, retrying");
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(operation, attempts = attempt, error = %e, "Giving up");
                }
                return Err(e);
            }
        }
    }
}
