//! Layered configuration and service wiring.
//!
//! Values are merged from, in increasing priority: built-in defaults, an
//! optional `reqres.toml`, and `REQRES_*` environment variables.

use crate::{
    api::ReqresApiClient,
    cache::{CachedUserService, MAX_CACHE_TTL},
    retry::RetryPolicy,
    service::ExternalUserService, Client, Error, Result,
};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "reqres.toml";
const ENV_PREFIX: &str = "REQRES_";

/// The fully wired stack returned by [`Config::build_service`].
pub type DefaultUserService = CachedUserService<ExternalUserService<ReqresApiClient>>;

/// Client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the API. TOML: `base_url`. Env: `REQRES_BASE_URL`.
    pub base_url: String,

    /// Sent as `x-api-key`. Required by [`Config::build_service`].
    pub api_key: String,

    /// Per-attempt HTTP timeout.
    pub timeout_secs: u64,

    /// Lifetime of a cache entry, counted from insertion. At most 1000 years.
    pub cache_ttl_secs: u64,

    pub max_retries: usize,

    /// Fixed delay between retries.
    pub retry_delay_ms: u64,

    /// Optional cap on pages fetched by a full listing. Unset means unbounded.
    pub max_pages: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://reqres.in/api/".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            cache_ttl_secs: 300,
            max_retries: 3,
            retry_delay_ms: 3000,
            max_pages: None,
        }
    }
}

impl Config {
    /// Defaults, then `reqres.toml` if present, then the environment.
    pub fn figment() -> Figment {
        Self::figment_from(DEFAULT_CONFIG_FILE)
    }

    /// Like [`Config::figment`] but reading the given TOML file.
    pub fn figment_from(path: impl AsRef<Path>) -> Figment {
        let path = path.as_ref();
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if path.is_file() {
            figment.merge(Toml::file(path))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::extract(Self::figment_from(path))
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| Error::ConfigurationError(format!("Failed to load configuration: {}", e)))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Builds the HTTP client with the configured URL, key, timeout and retries.
    pub fn build_client(&self) -> Result<Client> {
        if self.api_key.trim().is_empty() {
            return Err(Error::ConfigurationError(
                "api_key must be set and non-empty".to_string(),
            ));
        }

        Client::builder()
            .base_url(&self.base_url)?
            .api_key(&self.api_key)?
            .timeout(Duration::from_secs(self.timeout_secs))
            .retry_policy(self.retry_policy())
            .build()
    }

    /// Wires client, transport adapter, aggregator and cache together.
    pub fn build_service(&self) -> Result<DefaultUserService> {
        if self.cache_ttl() > MAX_CACHE_TTL {
            return Err(Error::ConfigurationError(format!(
                "cache_ttl_secs must be at most {}",
                MAX_CACHE_TTL.as_secs()
            )));
        }

        let api = ReqresApiClient::new(self.build_client()?);

        let mut service = ExternalUserService::new(api);
        if let Some(limit) = self.max_pages {
            service = service.with_max_pages(limit);
        }

        tracing::debug!(
            base_url = %self.base_url,
            cache_ttl_secs = self.cache_ttl_secs,
            max_retries = self.max_retries,
            "Built user service"
        );
        Ok(CachedUserService::with_ttl(service, self.cache_ttl()))
    }
}
