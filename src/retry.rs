//! Retry policy and predicates for transient failures.
//!
//! A [`RetryPolicy`] decides how many times a failed call is repeated and how
//! long to wait in between. A [`RetryPredicate`] decides whether a given
//! failure is worth repeating at all. Each scheduled retry can be reported to
//! an optional [`RetryObserver`].

use crate::Error;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Delay schedule between attempts.
#[derive(Debug, Clone)]
pub enum Backoff {
    /// Wait the same amount before every retry.
    Fixed(Duration),

    /// Wait `initial * 2^(retry - 1)`, capped at `max`.
    ///
    /// With `jitter`, each delay is scaled by a random factor in `[0.5, 1.0]`.
    Exponential {
        initial: Duration,
        max: Duration,
        jitter: bool,
    },
}

/// Bounded retry with backoff.
///
/// The default is three retries with a fixed three second delay, so a call is
/// attempted at most four times.
///
/// # Examples
///
/// ```
/// use reqres_client::retry::{Backoff, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.delay_for_retry(1), Some(Duration::from_secs(3)));
/// assert_eq!(policy.delay_for_retry(3), Some(Duration::from_secs(3)));
/// assert_eq!(policy.delay_for_retry(4), None);
///
/// let quick = RetryPolicy::new(2, Backoff::Fixed(Duration::from_millis(10)));
/// assert_eq!(quick.max_retries, 2);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: usize,
    pub backoff: Backoff,
}

pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

impl RetryPolicy {
    pub fn new(max_retries: usize, backoff: Backoff) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Fixed-delay policy.
    pub fn fixed(max_retries: usize, delay: Duration) -> Self {
        Self::new(max_retries, Backoff::Fixed(delay))
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::fixed(0, Duration::ZERO)
    }

    /// Returns the wait before the given retry (1 = first retry), or `None`
    /// once the budget is spent.
    pub fn delay_for_retry(&self, retry: usize) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries {
            return None;
        }

        match &self.backoff {
            Backoff::Fixed(delay) => Some(*delay),
            Backoff::Exponential {
                initial,
                max,
                jitter,
            } => {
                let exponent = u32::try_from(retry - 1).unwrap_or(u32::MAX);
                let multiplier = 2u32.saturating_pow(exponent);
                let delay = initial.saturating_mul(multiplier).min(*max);

                if *jitter {
                    let factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(factor))
                } else {
                    Some(delay)
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

/// Details of a retry that is about to be scheduled.
#[derive(Debug)]
pub struct RetryEvent<'a> {
    /// The retry number, starting at 1.
    pub attempt: usize,
    /// How long the caller will wait before retrying.
    pub delay: Duration,
    /// The failure that triggered the retry.
    pub error: &'a Error,
}

/// Side-channel hook invoked before each retry sleep.
pub type RetryObserver = Arc<dyn Fn(&RetryEvent<'_>) + Send + Sync>;

/// Decides whether a failed call should be retried.
///
/// # Examples
///
/// ```
/// use reqres_client::{Error, RetryPredicate};
///
/// struct RetryOnBadGateway;
///
/// impl RetryPredicate for RetryOnBadGateway {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         error.status().map(|s| s.as_u16()) == Some(502)
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// `attempt` is the number of the attempt that just failed (1-indexed).
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retries every failure classified as transient by [`Error::is_retryable`].
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTransient;

impl RetryPredicate for RetryOnTransient {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Retries only 5xx responses.
#[derive(Debug, Clone, Copy)]
pub struct RetryOn5xx;

impl RetryPredicate for RetryOn5xx {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::HttpError { status, .. } if status.is_server_error())
    }
}

/// Retries only timeouts.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTimeout;

impl RetryPredicate for RetryOnTimeout {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Timeout)
    }
}

/// Retries only connection-level failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnConnectionError;

impl RetryPredicate for RetryOnConnectionError {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Network(_))
    }
}

/// Retries if any inner predicate does.
pub struct OrPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl OrPredicate {
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for OrPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .any(|p| p.should_retry(error, attempt))
    }
}

/// Retries only if every inner predicate does.
pub struct AndPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl AndPredicate {
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for AndPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .all(|p| p.should_retry(error, attempt))
    }
}
