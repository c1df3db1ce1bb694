//! # reqres-client - users from a paginated HTTP API
//!
//! Fetches single users and complete user listings from a reqres.in style
//! API. Every HTTP call is guarded by a bounded retry policy for transient
//! failures, and results can be memoized for a fixed time window.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reqres_client::{Config, UserService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reqres_client::Error> {
//!     // Defaults, then reqres.toml, then REQRES_* environment variables.
//!     let service = Config::load()?.build_service()?;
//!
//!     for user in service.get_all_users().await? {
//!         println!("{}: {} {} <{}>", user.id, user.first_name, user.last_name, user.email);
//!     }
//!
//!     // Within the cache TTL this does not touch the network.
//!     let janet = service.get_user_by_id(2).await?;
//!     println!("{}", janet.email);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`Client`]: one GET per attempt, API key header, retry loop
//! - [`ReqresApiClient`]: `users/{id}` and `users?page={n}` mapped to
//!   [`UserRecord`]s, 404 mapped to [`Error::NotFound`]
//! - [`ExternalUserService`]: drains pages until an empty one comes back
//! - [`CachedUserService`]: TTL cache with one in-flight fetch per key
//!
//! The two services implement the same [`UserService`] trait, so the cache
//! can wrap any implementation.
//!
//! ## Retries
//!
//! ```no_run
//! use reqres_client::{Client, RetryPolicy};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), reqres_client::Error> {
//! let client = Client::builder()
//!     .base_url("https://reqres.in/api/")?
//!     .api_key("reqres-free-v1")?
//!     .retry_policy(RetryPolicy::fixed(3, Duration::from_secs(3)))
//!     .on_retry(|event| {
//!         eprintln!("retry {} in {:?}: {}", event.attempt, event.delay, event.error);
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
mod client;
pub mod config;
mod error;
pub mod metadata;
pub mod model;
mod response;
pub mod retry;
pub mod service;

pub use api::{ReqresApiClient, UserApi};
pub use cache::CachedUserService;
pub use client::{Client, ClientBuilder, API_KEY_HEADER};
pub use config::Config;
pub use error::{Error, Result};
pub use model::UserRecord;
pub use response::Response;
pub use retry::{RetryPolicy, RetryPredicate};
pub use service::{ExternalUserService, UserService};
