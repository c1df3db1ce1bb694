//! HTTP client with bounded retries and rich error handling.
//!
//! [`Client`] issues GET requests relative to a base URL, applies the default
//! headers (including the API key), and runs every call through the
//! configured [`RetryPolicy`]. Use [`ClientBuilder`] to create one.

use crate::{
    metadata::RequestMetadata,
    retry::{RetryEvent, RetryObserver, RetryOnTransient, RetryPolicy, RetryPredicate},
    Error, Response, Result,
};
use http::{header, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A reusable HTTP client for the user API.
///
/// Cloning is cheap; clones share the connection pool and configuration.
///
/// # Examples
///
/// ```no_run
/// use reqres_client::{Client, RetryPolicy, UserRecord};
/// use reqres_client::metadata::RequestMetadata;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), reqres_client::Error> {
/// let client = Client::builder()
///     .base_url("https://reqres.in/api/")?
///     .api_key("reqres-free-v1")?
///     .timeout(Duration::from_secs(30))
///     .retry_policy(RetryPolicy::fixed(3, Duration::from_secs(3)))
///     .build()?;
///
/// let page = client
///     .get::<serde_json::Value>(RequestMetadata::new("users").with_query_param("page", 1))
///     .await?;
/// println!("took {:?} over {} attempt(s)", page.latency, page.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    retry_policy: RetryPolicy,
    retry_predicate: Box<dyn RetryPredicate>,
    on_retry: Option<RetryObserver>,
    timeout: Option<Duration>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The normalised base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Performs a GET and deserializes a 2xx body into `Res`.
    ///
    /// Failures the retry predicate accepts are retried according to the
    /// retry policy. Once the budget is spent the last failure is returned
    /// unchanged, so an exhausted 503 is the same [`Error::HttpError`] a
    /// caller would see without retries. Other failures are returned after a
    /// single attempt.
    pub async fn get<Res>(&self, metadata: RequestMetadata) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match self.execute_request(&metadata, attempt).await {
                Ok(response) => {
                    self.parse_response(response, start_time.elapsed(), attempt)
                        .await
                }
                Err(e) => Err(e),
            };

            let error = match result {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                path = %metadata.path,
                "Request failed"
            );

            if !self.inner.retry_predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            let Some(delay) = self.inner.retry_policy.delay_for_retry(attempt) else {
                if attempt > 1 {
                    tracing::error!(
                        attempts = attempt,
                        error = %error,
                        path = %metadata.path,
                        "Retries exhausted"
                    );
                }
                return Err(error);
            };

            tracing::info!(
                delay_ms = delay.as_millis(),
                retry = attempt,
                reason = %error,
                "Retrying request after delay"
            );

            if let Some(observer) = &self.inner.on_retry {
                observer(&RetryEvent {
                    attempt,
                    delay,
                    error: &error,
                });
            }

            tokio::time::sleep(delay).await;
        }
    }

    /// Executes a single request attempt.
    async fn execute_request(
        &self,
        metadata: &RequestMetadata,
        attempt: usize,
    ) -> Result<reqwest::Response> {
        let mut url = self
            .inner
            .base_url
            .join(metadata.path.trim_start_matches('/'))?;

        if !metadata.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &metadata.query_params {
                pairs.append_pair(key, value);
            }
        }

        tracing::debug!(url = %url, attempt = attempt, "Executing HTTP request");

        let mut request = self
            .inner
            .http_client
            .get(url)
            .headers(self.inner.default_headers.clone());

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        Ok(request.send().await?)
    }

    /// Turns an HTTP response into a typed `Response` or a status error.
    async fn parse_response<Res>(
        &self,
        response: reqwest::Response,
        latency: Duration,
        attempts: usize,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let status = response.status();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            attempts = attempts,
            "Received HTTP response"
        );

        if !status.is_success() {
            let headers = response.headers().clone();
            let raw_response = response.text().await.unwrap_or_default();

            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %raw_response,
                    "Client error (4xx)"
                );
            } else {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %raw_response,
                    "Server error"
                );
            }

            return Err(Error::HttpError {
                status,
                raw_response,
                headers,
            });
        }

        let raw_body = response.text().await?;

        match serde_json::from_str::<Res>(&raw_body) {
            Ok(data) => Ok(Response::new(data, status, latency, attempts)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %raw_body,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response: raw_body,
                    serde_error: e.to_string(),
                    status,
                })
            }
        }
    }
}

/// Builder for [`Client`].
///
/// Defaults: `Accept: application/json`, [`RetryPolicy::default`],
/// [`RetryOnTransient`], no timeout, no retry observer.
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    retry_policy: RetryPolicy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    on_retry: Option<RetryObserver>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        Self {
            base_url: None,
            default_headers,
            retry_policy: RetryPolicy::default(),
            retry_predicate: None,
            on_retry: None,
            timeout: None,
        }
    }

    /// Sets the base URL. A trailing `/` is added if missing so that request
    /// paths resolve beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let raw = url.as_ref();
        let url = if raw.ends_with('/') {
            Url::parse(raw)?
        } else {
            Url::parse(&format!("{}/", raw))?
        };
        self.base_url = Some(url);
        Ok(self)
    }

    /// Sends `key` as the `x-api-key` header on every request.
    pub fn api_key(self, key: impl AsRef<str>) -> Result<Self> {
        self.default_header(API_KEY_HEADER, key)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Replaces the default [`RetryOnTransient`] predicate.
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Registers a hook called before every retry sleep.
    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(observer));
        self
    }

    /// Per-attempt timeout. An attempt that exceeds it fails with
    /// [`Error::Timeout`], which is retryable.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// # Errors
    ///
    /// Returns an error if no base URL was provided or the underlying HTTP
    /// client cannot be created.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnTransient));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                retry_policy: self.retry_policy,
                retry_predicate,
                on_retry: self.on_retry,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
