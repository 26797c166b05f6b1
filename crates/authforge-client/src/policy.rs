//! Bounded timeout and retry policy for outbound calls.
//!
//! No call to an external collaborator runs unbounded: each attempt is
//! wrapped in a timeout, and a transient failure (unreachable, timed out)
//! earns at most a fixed number of additional attempts. Deterministic
//! rejections are returned immediately — retrying them cannot change the
//! answer.

use std::future::Future;
use std::time::Duration;

use crate::ClientError;

/// Timeout and retry settings for one client.
///
/// One policy applies to every operation of the client that owns it.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    /// Upper bound for a single attempt.
    pub timeout: Duration,

    /// Additional attempts after a transient failure. The total number of
    /// attempts is `retries + 1`.
    pub retries: u32,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 1,
        }
    }
}

/// Runs `operation` under `policy`: each attempt bounded by the timeout,
/// transient failures retried up to `policy.retries` times.
///
/// `operation` is a closure (not a future) because a future can only be
/// polled once — every retry needs a freshly built request.
pub async fn call_with_policy<T, F, Fut>(
    policy: &CallPolicy,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let result = match tokio::time::timeout(policy.timeout, operation())
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(policy.timeout)),
        };

        match result {
            Err(error) if error.is_transient() && attempt <= policy.retries => {
                tracing::debug!(
                    attempt,
                    error = %error,
                    "transient failure, retrying"
                );
            }
            other => return other,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Tests use `start_paused` so timeout behavior is deterministic —
    //! Tokio's paused clock auto-advances when all tasks are idle, so a
    //! "60 second" sleep completes instantly in test time.

    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_on_first_attempt_calls_once() {
        let attempts = AtomicU32::new(0);

        let result = call_with_policy(&CallPolicy::default(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ClientError>(7) }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_then_success_retries_once() {
        let attempts = AtomicU32::new(0);

        let result = call_with_policy(&CallPolicy::default(), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ClientError::Network("blip".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transient_failures_stop_after_retry_budget() {
        let attempts = AtomicU32::new(0);
        let policy = CallPolicy {
            retries: 1,
            ..CallPolicy::default()
        };

        let result: Result<(), _> = call_with_policy(&policy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ClientError::Network("still down".into())) }
        })
        .await;

        assert!(matches!(result, Err(ClientError::Network(_))));
        // One initial attempt plus one retry.
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_deterministic_rejection_is_never_retried() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> =
            call_with_policy(&CallPolicy::default(), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(ClientError::DuplicateAccount) }
            })
            .await;

        assert!(matches!(result, Err(ClientError::DuplicateAccount)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_operation_times_out_and_retries() {
        let attempts = AtomicU32::new(0);
        let policy = CallPolicy {
            timeout: Duration::from_secs(5),
            retries: 1,
        };

        let result: Result<(), _> = call_with_policy(&policy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                // Far longer than the timeout — never completes in time.
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok(())
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(ClientError::Timeout(t)) if t == Duration::from_secs(5)
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_policy_is_five_seconds_one_retry() {
        let policy = CallPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(5));
        assert_eq!(policy.retries, 1);
    }
}
