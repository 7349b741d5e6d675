//! Error recovery strategies for different types of errors.
//!
//! The batch run distinguishes three outcomes for a failure: retry it
//! (transient network trouble while bootstrapping the lexicon), skip the
//! affected record (a review that cannot be scored), or abort the run.

use crate::{CoreError, ErrorExt};
use std::time::Duration;
use tracing::info;

/// Recovery strategy for handling errors
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryStrategy {
    /// Retry the operation with exponential backoff
    RetryWithBackoff {
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
    },
    /// Drop the current item and continue with the next one
    Skip,
    /// Fail immediately
    Fail,
}

/// Result of an error recovery attempt
#[derive(Debug)]
pub enum RecoveryResult<T> {
    /// Recovery was successful, operation can continue
    Recovered(T),
    /// Recovery failed, operation should be skipped
    Skipped,
    /// Recovery failed, error should be propagated
    Failed(CoreError),
}

impl<T> RecoveryResult<T> {
    /// Returns true if the operation was successfully recovered
    pub fn is_recovered(&self) -> bool {
        matches!(self, RecoveryResult::Recovered(_))
    }

    /// Returns true if the operation should be skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, RecoveryResult::Skipped)
    }

    /// Returns true if the operation failed and error should be propagated
    pub fn is_failed(&self) -> bool {
        matches!(self, RecoveryResult::Failed(_))
    }

    /// Converts into a plain `Result`; a skipped operation yields `None`.
    pub fn into_result(self) -> Result<Option<T>, CoreError> {
        match self {
            RecoveryResult::Recovered(value) => Ok(Some(value)),
            RecoveryResult::Skipped => Ok(None),
            RecoveryResult::Failed(error) => Err(error),
        }
    }
}

/// Error recovery handler that provides strategies for different error types
pub struct ErrorRecovery;

impl ErrorRecovery {
    /// Determine the appropriate recovery strategy for a given error
    pub fn determine_strategy(error: &CoreError) -> RecoveryStrategy {
        match error {
            // A single review that cannot be scored is dropped from the run
            CoreError::Score(_) => RecoveryStrategy::Skip,

            // Transient trouble while downloading the lexicon
            CoreError::Lexicon(_) if error.is_retryable() => RecoveryStrategy::RetryWithBackoff {
                max_attempts: 3,
                initial_delay: Duration::from_secs(1),
                max_delay: Duration::from_secs(30),
            },

            CoreError::RequestFailed { status_code, .. } => match status_code {
                Some(429) => RecoveryStrategy::RetryWithBackoff {
                    max_attempts: 2,
                    initial_delay: Duration::from_secs(60),
                    max_delay: Duration::from_secs(300),
                },
                Some(500..=599) => RecoveryStrategy::RetryWithBackoff {
                    max_attempts: 3,
                    initial_delay: Duration::from_secs(5),
                    max_delay: Duration::from_secs(60),
                },
                _ => RecoveryStrategy::Fail,
            },

            // Missing input, missing lexicon, bad configuration and storage
            // failures need user intervention
            _ => RecoveryStrategy::Fail,
        }
    }

    /// Apply the recovery strategy after `operation` failed with `error`.
    /// For `RetryWithBackoff`, `max_attempts` counts the further attempts.
    pub async fn apply_strategy<F, T, Fut>(
        strategy: RecoveryStrategy,
        error: CoreError,
        operation: F,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        match strategy {
            RecoveryStrategy::RetryWithBackoff {
                max_attempts,
                initial_delay,
                max_delay,
            } if max_attempts > 0 => {
                let delay = Self::backoff_delay(&error, initial_delay, max_delay);
                info!("Retrying after {:?}: {}", delay, error);
                tokio::time::sleep(delay).await;
                Self::retry_with_backoff(operation, max_attempts, initial_delay, max_delay).await
            }
            RecoveryStrategy::Skip => RecoveryResult::Skipped,
            _ => RecoveryResult::Failed(error),
        }
    }

    /// Retry an operation with exponential backoff
    pub async fn retry_with_backoff<F, T, Fut>(
        mut operation: F,
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut attempt = 0;
        let mut delay = initial_delay;

        loop {
            match operation().await {
                Ok(result) => return RecoveryResult::Recovered(result),
                Err(error) => {
                    attempt += 1;

                    if attempt >= max_attempts || !error.is_retryable() {
                        return RecoveryResult::Failed(error);
                    }

                    let wait = Self::backoff_delay(&error, delay, max_delay);
                    info!(
                        "Retrying operation (attempt {}/{}) after {:?}: {}",
                        attempt + 1,
                        max_attempts,
                        wait,
                        error
                    );

                    tokio::time::sleep(wait).await;
                    delay = std::cmp::min(delay * 2, max_delay);
                }
            }
        }
    }

    /// The error's own retry hint wins over a shorter backoff step, never
    /// exceeding `max_delay`.
    fn backoff_delay(error: &CoreError, delay: Duration, max_delay: Duration) -> Duration {
        error
            .retry_after()
            .map_or(delay, |hint| hint.max(delay))
            .min(max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, InputError, LexiconError, ScoreError};
    use std::cell::Cell;

    #[test]
    fn test_strategy_for_score_errors_is_skip() {
        let error = CoreError::Score(ScoreError::EmptyText);
        assert_eq!(
            ErrorRecovery::determine_strategy(&error),
            RecoveryStrategy::Skip
        );
    }

    #[test]
    fn test_strategy_for_fatal_errors_is_fail() {
        let missing = CoreError::Input(InputError::BatchNotFound {
            path: "reviews/fetch.json".to_string(),
        });
        assert_eq!(
            ErrorRecovery::determine_strategy(&missing),
            RecoveryStrategy::Fail
        );

        let unavailable = CoreError::Lexicon(LexiconError::ResourceUnavailable {
            location: "lexicon.txt".to_string(),
        });
        assert_eq!(
            ErrorRecovery::determine_strategy(&unavailable),
            RecoveryStrategy::Fail
        );

        let duplicate = CoreError::Config(ConfigError::DuplicateCategory {
            label: "Complaints".to_string(),
        });
        assert_eq!(
            ErrorRecovery::determine_strategy(&duplicate),
            RecoveryStrategy::Fail
        );
    }

    #[test]
    fn test_strategy_for_download_failure_retries() {
        let error = CoreError::Lexicon(LexiconError::DownloadFailed {
            url: "https://example.com/lexicon.txt".to_string(),
            reason: "connection reset".to_string(),
        });
        assert!(matches!(
            ErrorRecovery::determine_strategy(&error),
            RecoveryStrategy::RetryWithBackoff { .. }
        ));
    }

    #[tokio::test]
    async fn test_retry_stops_after_max_attempts() {
        let calls = Cell::new(0);
        let result: RecoveryResult<()> = ErrorRecovery::retry_with_backoff(
            || {
                calls.set(calls.get() + 1);
                async {
                    Err(CoreError::Lexicon(LexiconError::DownloadFailed {
                        url: "https://example.com".to_string(),
                        reason: "reset".to_string(),
                    }))
                }
            },
            3,
            Duration::from_millis(1),
            Duration::from_millis(2),
        )
        .await;

        assert!(result.is_failed());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_permanent_errors() {
        let calls = Cell::new(0);
        let result: RecoveryResult<()> = ErrorRecovery::retry_with_backoff(
            || {
                calls.set(calls.get() + 1);
                async {
                    Err(CoreError::InvalidInput {
                        message: "bad".to_string(),
                    })
                }
            },
            5,
            Duration::from_millis(1),
            Duration::from_millis(2),
        )
        .await;

        assert!(result.is_failed());
        assert_eq!(calls.get(), 1);
    }

    fn download_failed() -> CoreError {
        CoreError::Lexicon(LexiconError::DownloadFailed {
            url: "https://example.com/lexicon.txt".to_string(),
            reason: "connection reset".to_string(),
        })
    }

    #[tokio::test]
    async fn test_skip_does_not_run_operation() {
        let calls = Cell::new(0);
        let result = ErrorRecovery::apply_strategy(RecoveryStrategy::Skip, download_failed(), || {
            calls.set(calls.get() + 1);
            async { Ok::<_, CoreError>(1) }
        })
        .await;
        assert!(result.is_skipped());
        assert_eq!(calls.get(), 0);
        assert_eq!(result.into_result().unwrap(), None);
    }

    #[tokio::test]
    async fn test_fail_returns_original_error_without_rerunning() {
        let calls = Cell::new(0);
        let not_found = CoreError::RequestFailed {
            message: "GET lexicon returned 404".to_string(),
            status_code: Some(404),
        };
        let strategy = ErrorRecovery::determine_strategy(&not_found);
        assert_eq!(strategy, RecoveryStrategy::Fail);

        let result = ErrorRecovery::apply_strategy(strategy, not_found, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, CoreError>("body") }
        })
        .await;
        assert_eq!(calls.get(), 0);
        match result {
            RecoveryResult::Failed(CoreError::RequestFailed { status_code, .. }) => {
                assert_eq!(status_code, Some(404))
            }
            other => panic!("expected the original failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retry_strategy_recovers_transient_failure() {
        let calls = Cell::new(0);
        let strategy = RecoveryStrategy::RetryWithBackoff {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };
        let result = ErrorRecovery::apply_strategy(strategy, download_failed(), || {
            calls.set(calls.get() + 1);
            async { Ok::<_, CoreError>("body") }
        })
        .await;
        assert_eq!(calls.get(), 1);
        assert_eq!(result.into_result().unwrap(), Some("body"));
    }

    #[tokio::test]
    async fn test_retry_strategy_without_attempts_fails() {
        let strategy = RecoveryStrategy::RetryWithBackoff {
            max_attempts: 0,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };
        let result = ErrorRecovery::apply_strategy(strategy, download_failed(), || async {
            Ok::<_, CoreError>(())
        })
        .await;
        assert!(result.is_failed());
    }

    #[test]
    fn test_backoff_respects_retry_hint_and_cap() {
        let rate_limited = CoreError::RequestFailed {
            message: "slow down".to_string(),
            status_code: Some(429),
        };
        assert_eq!(
            ErrorRecovery::backoff_delay(
                &rate_limited,
                Duration::from_secs(1),
                Duration::from_secs(300)
            ),
            Duration::from_secs(60)
        );
        assert_eq!(
            ErrorRecovery::backoff_delay(
                &rate_limited,
                Duration::from_secs(1),
                Duration::from_secs(10)
            ),
            Duration::from_secs(10)
        );

        let invalid = CoreError::InvalidInput {
            message: "bad".to_string(),
        };
        assert_eq!(
            ErrorRecovery::backoff_delay(&invalid, Duration::from_secs(3), Duration::from_secs(30)),
            Duration::from_secs(3)
        );
    }

    #[tokio::test]
    async fn test_recovered_on_second_attempt() {
        let calls = Cell::new(0);
        let result = ErrorRecovery::retry_with_backoff(
            || {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    if attempt < 2 {
                        Err(download_failed())
                    } else {
                        Ok(attempt)
                    }
                }
            },
            3,
            Duration::from_millis(1),
            Duration::from_millis(2),
        )
        .await;

        assert!(result.is_recovered());
        assert_eq!(result.into_result().unwrap(), Some(2));
    }
}
