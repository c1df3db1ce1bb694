//! Error types for user API calls.
//!
//! Every failure in the pipeline is represented by [`Error`]. Errors keep the
//! HTTP status and raw body where one exists so callers can log or display
//! them without re-fetching.

use http::{HeaderMap, StatusCode};
use std::sync::Arc;

/// The main error type for the user client.
///
/// `Error` is `Clone` so that a failure observed by one cache fill can be
/// delivered to every caller waiting on the same key.
///
/// # Examples
///
/// ```no_run
/// use reqres_client::{Error, UserService};
///
/// # async fn example(service: impl UserService) {
/// match service.get_user_by_id(23).await {
///     Ok(user) => println!("{} {}", user.first_name, user.last_name),
///     Err(Error::NotFound { id }) => eprintln!("no user with id {}", id),
///     Err(e) if e.status().is_some() => eprintln!("transport failure: {}", e),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # }
/// ```
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The requested user does not exist remotely (HTTP 404).
    ///
    /// Never retried.
    #[error("User with ID {id} was not found")]
    NotFound {
        /// The id that was requested.
        id: u64,
    },

    /// The server returned a non-success status other than a single-user 404.
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// A network-level error occurred (connection refused, DNS, broken body).
    #[error("Network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The response body did not match the expected envelope.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Pagination reached the configured page cap without seeing an empty page.
    #[error("Pagination did not terminate within {limit} pages")]
    PageLimitExceeded {
        /// The configured cap
        limit: u32,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(Arc::new(err))
        }
    }
}

impl Error {
    /// Returns `true` if this error is a transient failure worth retrying.
    ///
    /// Network errors, timeouts, 5xx responses and 408 Request Timeout are
    /// transient. Everything else, including 404, is definitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqres_client::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::BAD_GATEWAY,
    ///     raw_response: String::new(),
    ///     headers: http::HeaderMap::new(),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// assert!(!Error::NotFound { id: 7 }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout => true,
            Error::HttpError { status, .. } => {
                status.is_server_error() || *status == StatusCode::REQUEST_TIMEOUT
            }
            Error::NotFound { .. }
            | Error::DeserializationFailed { .. }
            | Error::PageLimitExceeded { .. }
            | Error::ConfigurationError(_)
            | Error::InvalidUrl(_) => false,
        }
    }

    /// Returns `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns the HTTP status code associated with this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for user API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: StatusCode) -> Error {
        Error::HttpError {
            status,
            raw_response: "body".to_string(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(http_error(StatusCode::INTERNAL_SERVER_ERROR).is_retryable());
        assert!(http_error(StatusCode::SERVICE_UNAVAILABLE).is_retryable());
        assert!(http_error(StatusCode::REQUEST_TIMEOUT).is_retryable());
        assert!(Error::Timeout.is_retryable());

        assert!(!http_error(StatusCode::BAD_REQUEST).is_retryable());
        assert!(!http_error(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!Error::NotFound { id: 1 }.is_retryable());
        assert!(!Error::ConfigurationError("x".into()).is_retryable());
    }

    #[test]
    fn test_status_and_body_of_http_error() {
        let err = http_error(StatusCode::BAD_GATEWAY);

        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.raw_response(), Some("body"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_reports_404() {
        let err = Error::NotFound { id: 99 };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "User with ID 99 was not found");
    }
}
