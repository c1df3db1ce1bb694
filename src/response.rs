//! Successful response wrapper.

use http::StatusCode;
use std::time::Duration;

/// A parsed response together with details of how it was obtained.
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized body.
    pub data: T,

    pub status: StatusCode,

    /// Time from the first attempt until this response arrived, retry
    /// sleeps included.
    pub latency: Duration,

    /// Number of attempts it took; `1` when no retry happened.
    pub attempts: usize,
}

impl<T> Response<T> {
    pub fn new(data: T, status: StatusCode, latency: Duration, attempts: usize) -> Self {
        Self {
            data,
            status,
            latency,
            attempts,
        }
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Discards the metadata and returns the body.
    pub fn into_data(self) -> T {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_was_retried() {
        let first = Response::new((), StatusCode::OK, Duration::from_millis(5), 1);
        assert!(!first.was_retried());

        let third = Response::new(7, StatusCode::OK, Duration::from_millis(5), 3);
        assert!(third.was_retried());
        assert_eq!(third.into_data(), 7);
    }
}
