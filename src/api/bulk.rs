//! Waiting on asynchronous bulk operations
//!
//! Bulk mutations return an operation id. The poller sleeps on a doubling
//! schedule (`1,1,2,2,4,4,…` seconds by default) and fetches the operation
//! status after every sleep until it reaches a terminal state or the step
//! budget runs out. Cancellation is observed while sleeping.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::error::{ApiError, Error, Result};

/// Status record of a bulk operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperation {
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
}

/// Backoff schedule between status fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkPollSchedule {
    /// Maximum number of sleep-then-fetch steps
    pub steps: u32,
    /// Sleep before the first two fetches
    pub base: Duration,
}

impl Default for BulkPollSchedule {
    fn default() -> Self {
        Self {
            steps: 16,
            base: Duration::from_secs(1),
        }
    }
}

impl BulkPollSchedule {
    /// Sleep before step `step`: `base << (step / 2)`
    pub fn delay(&self, step: u32) -> Duration {
        self.base * (1u32 << (step / 2).min(31))
    }
}

/// Poll `fetch` until the operation completes.
///
/// `completed` yields `Ok`. `failed` yields a request error carrying the
/// server's message, and any other status apart from `pending` / `running`
/// is reported as unexpected.
pub async fn wait_for_operation<F, Fut>(
    ctx: &CancellationToken,
    schedule: BulkPollSchedule,
    mut fetch: F,
) -> Result<BulkOperation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<BulkOperation>>,
{
    for step in 0..schedule.steps {
        let delay = schedule.delay(step);
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                return Err(Error::BulkOperationAborted("context canceled".to_string()));
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let operation = fetch().await?;
        debug!(
            "bulk operation {} is {} after step {}",
            operation.id, operation.status, step
        );

        match operation.status.as_str() {
            "completed" => return Ok(operation),
            "pending" | "running" => continue,
            "failed" => {
                let message = operation
                    .error
                    .unwrap_or_else(|| "bulk operation failed".to_string());
                return Err(Error::Request(ApiError::from_message(message)));
            }
            other => {
                return Err(Error::Request(ApiError::from_message(format!(
                    "operation returned unexpected status: {}",
                    other
                ))));
            }
        }
    }

    Err(Error::BulkOperationTimeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> BulkPollSchedule {
        BulkPollSchedule {
            steps: 16,
            base: Duration::from_millis(1),
        }
    }

    fn op(status: &str, error: Option<&str>) -> BulkOperation {
        BulkOperation {
            id: "op1".into(),
            status: status.into(),
            error: error.map(str::to_string),
            completed: None,
        }
    }

    #[test]
    fn default_schedule_doubles_every_other_step() {
        let schedule = BulkPollSchedule::default();
        let delays: Vec<u64> = (0..16).map(|i| schedule.delay(i).as_secs()).collect();
        assert_eq!(
            delays,
            vec![1, 1, 2, 2, 4, 4, 8, 8, 16, 16, 32, 32, 64, 64, 128, 128]
        );
        assert_eq!(delays.iter().sum::<u64>(), 510);
    }

    #[tokio::test]
    async fn returns_once_completed() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let ctx = CancellationToken::new();

        let result = wait_for_operation(&ctx, fast(), || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(if n == 0 {
                    op("pending", None)
                } else {
                    op("completed", None)
                })
            }
        })
        .await;

        assert_eq!(result.unwrap().status, "completed");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_status_carries_server_error() {
        let ctx = CancellationToken::new();
        let err = wait_for_operation(&ctx, fast(), || async {
            Ok(op("failed", Some("This list is at the maximum number of items")))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Request(_)));
        assert!(err.error_message_contains("maximum number of items"));
    }

    #[tokio::test]
    async fn unexpected_status_is_reported() {
        let ctx = CancellationToken::new();
        let err = wait_for_operation(&ctx, fast(), || async { Ok(op("exploded", None)) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "operation returned unexpected status: exploded");
    }

    #[tokio::test]
    async fn gives_up_after_step_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let ctx = CancellationToken::new();
        let schedule = BulkPollSchedule {
            steps: 16,
            base: Duration::from_micros(10),
        };

        let err = wait_for_operation(&ctx, schedule, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(op("running", None)) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::BulkOperationTimeout));
        assert_eq!(calls.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_sleep() {
        let ctx = CancellationToken::new();
        let schedule = BulkPollSchedule {
            steps: 16,
            base: Duration::from_secs(3600),
        };
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = wait_for_operation(&ctx, schedule, || async {
            Ok(op("pending", None))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::BulkOperationAborted(_)));
        assert!(err.to_string().starts_with("operation aborted during backoff"));
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let ctx = CancellationToken::new();
        let err = wait_for_operation(&ctx, fast(), || async { Err(Error::MissingListId) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingListId));
    }
}
