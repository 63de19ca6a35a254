use crate::config::RetryConfig;
use crate::error::AnalysisError;
use std::future::Future;

/// Outcome of one upstream call that did not fail outright
#[derive(Debug)]
pub enum Attempt<T> {
    Done(T),
    RateLimited { body: String },
}

/// Runs `call` until it succeeds, fails, or stays rate limited for
/// `max_attempts` attempts.
///
/// Only [`Attempt::RateLimited`] is retried; any error returned by `call`
/// ends the loop immediately. `call` receives the 1-based attempt number.
pub async fn retry_rate_limited<T, F, Fut>(
    policy: &RetryConfig,
    mut call: F,
) -> Result<T, AnalysisError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Attempt<T>, AnalysisError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match call(attempt).await? {
            Attempt::Done(value) => return Ok(value),
            Attempt::RateLimited { body } => {
                if attempt >= max_attempts {
                    ::log::error!(
                        "Still rate limited after {} attempts: {}",
                        attempt,
                        body.trim()
                    );
                    return Err(AnalysisError::RateLimitExceeded { attempts: attempt });
                }
                let delay = policy.delay_after(attempt);
                ::log::warn!(
                    "Rate limited on attempt {}/{}, retrying in {} ms",
                    attempt,
                    max_attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn no_delay(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_stops_after_exactly_three_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = retry_rate_limited(&no_delay(3), |_| {
            calls += 1;
            async {
                Ok(Attempt::RateLimited {
                    body: "slow down".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls, 3);
        assert!(matches!(
            result,
            Err(AnalysisError::RateLimitExceeded { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_rate_limit() {
        let mut calls = 0;
        let result = retry_rate_limited(&no_delay(3), |attempt| {
            calls += 1;
            async move {
                if attempt < 2 {
                    Ok(Attempt::RateLimited {
                        body: String::new(),
                    })
                } else {
                    Ok(Attempt::Done("completion"))
                }
            }
        })
        .await;

        assert_eq!(calls, 2);
        assert_eq!(result.unwrap(), "completion");
    }

    #[tokio::test]
    async fn test_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = retry_rate_limited(&no_delay(3), |_| {
            calls += 1;
            async {
                Err(AnalysisError::Upstream {
                    status: 500,
                    body: "boom".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(AnalysisError::Upstream { status: 500, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_two_then_four_seconds() {
        let started = tokio::time::Instant::now();
        let result: Result<(), _> = retry_rate_limited(&RetryConfig::default(), |_| async {
            Ok(Attempt::RateLimited {
                body: String::new(),
            })
        })
        .await;

        assert!(result.is_err());
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(6), "waited {:?}", waited);
        assert!(waited < Duration::from_secs(7), "waited {:?}", waited);
    }
}
