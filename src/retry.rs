//! Retry strategies and predicates for transient transport failures.
//!
//! Retrying is strictly a transport-boundary concern: response
//! interpretation and object materialization run exactly once per response.
//! The default strategy is [`RetryStrategy::None`]: calls fail fast unless
//! the client is explicitly configured otherwise.

use std::time::{Duration, SystemTime};

use http::HeaderMap;
use rand::Rng;

use crate::error::Error;

/// Defines when and how to retry failed requests.
///
/// # Examples
///
/// ```
/// use denpo::RetryStrategy;
/// use std::time::Duration;
///
/// // Exponential backoff: 100ms, 200ms, 400ms, ...
/// let strategy = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(10),
///     max_retries: 3,
///     jitter: true,
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    #[default]
    None,

    /// Retry with exponentially increasing delays.
    ///
    /// Each retry waits `initial_delay * 2^(attempt - 1)`, capped at
    /// `max_delay`. Jitter randomizes each delay between 50% and 100% of its
    /// value to avoid synchronized retries.
    ExponentialBackoff {
        initial_delay: Duration,
        max_delay: Duration,
        max_retries: usize,
        jitter: bool,
    },

    /// Retry with a fixed delay between attempts.
    Linear {
        delay: Duration,
        max_retries: usize,
    },

    /// Custom retry pacing.
    ///
    /// The function receives the attempt number (1-indexed) and returns the
    /// delay before that retry, or `None` to stop.
    Custom {
        delay_fn: fn(attempt: usize) -> Option<Duration>,
    },
}

impl RetryStrategy {
    /// Returns the delay before the given retry attempt, or `None` when
    /// retries are exhausted.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                max_retries,
                jitter,
            } => {
                if attempt > *max_retries {
                    return None;
                }

                let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1) as u32);
                let base_delay =
                    initial_delay.saturating_mul(multiplier.try_into().unwrap_or(u32::MAX));
                let delay = base_delay.min(*max_delay);

                if *jitter {
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(jitter_factor))
                } else {
                    Some(delay)
                }
            }
            RetryStrategy::Linear { delay, max_retries } => {
                if attempt > *max_retries {
                    None
                } else {
                    Some(*delay)
                }
            }
            RetryStrategy::Custom { delay_fn } => delay_fn(attempt),
        }
    }
}

/// Decides whether a failed request should be retried.
///
/// # Examples
///
/// ```
/// use denpo::{ApiErrorKind, Error, RetryPredicate};
///
/// struct RetryOnlyRateLimits;
///
/// impl RetryPredicate for RetryOnlyRateLimits {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         matches!(error, Error::Api { kind: ApiErrorKind::TooManyRequests, .. })
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` when the request should be retried.
    ///
    /// `attempt` is 1-indexed: the first failure arrives as attempt 1.
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retries every error [`Error::is_retryable`] marks as transient: network
/// failures, timeouts, 429s and 5xx responses.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnRetryable;

impl RetryPredicate for RetryOnRetryable {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Extracts the wait the server asked for from a rate-limited error.
///
/// Reads the `Retry-After` header (delay-seconds or HTTP-date) off an
/// [`Error::Api`] with the `TooManyRequests` kind, capped at `max_wait`.
/// Other errors yield `None` and fall through to the strategy's own pacing.
pub(crate) fn server_requested_delay(error: &Error, max_wait: Duration) -> Option<Duration> {
    let headers = match error {
        Error::Api {
            kind: crate::error::ApiErrorKind::TooManyRequests,
            headers,
            ..
        } => headers,
        _ => return None,
    };
    parse_retry_after(headers).map(|delay| delay.min(max_wait))
}

/// Parses `Retry-After` as delay-seconds or an HTTP-date.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    if let Ok(date) = httpdate::parse_http_date(header) {
        if let Ok(duration) = date.duration_since(SystemTime::now()) {
            return Some(duration);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use http::{HeaderValue, StatusCode};

    #[test]
    fn exponential_backoff_delays() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retries: 5,
            jitter: false,
        };

        assert_eq!(
            strategy.delay_for_attempt(1),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            strategy.delay_for_attempt(2),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            strategy.delay_for_attempt(5),
            Some(Duration::from_millis(1600))
        );
        assert_eq!(strategy.delay_for_attempt(6), None);
    }

    #[test]
    fn linear_delays() {
        let strategy = RetryStrategy::Linear {
            delay: Duration::from_secs(1),
            max_retries: 3,
        };

        assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(4), None);
    }

    #[test]
    fn no_retry_by_default() {
        assert_eq!(RetryStrategy::default().delay_for_attempt(1), None);
    }

    fn rate_limited(retry_after: &str) -> Error {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::RETRY_AFTER,
            HeaderValue::from_str(retry_after).unwrap(),
        );
        Error::Api {
            kind: ApiErrorKind::TooManyRequests,
            status: StatusCode::TOO_MANY_REQUESTS,
            headers,
            body: String::new(),
            error: None,
        }
    }

    #[test]
    fn retry_after_seconds_is_honored() {
        let error = rate_limited("30");
        assert_eq!(
            server_requested_delay(&error, Duration::from_secs(300)),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn retry_after_is_capped() {
        let error = rate_limited("600");
        assert_eq!(
            server_requested_delay(&error, Duration::from_secs(60)),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn non_rate_limit_errors_have_no_server_delay() {
        assert_eq!(
            server_requested_delay(&Error::Timeout, Duration::from_secs(60)),
            None
        );
    }
}
