//! Time-bounded caching decorator for any [`UserService`].
//!
//! Entries expire a fixed TTL after insertion; reads never extend them.
//! Misses are filled through `moka`'s `try_get_with`, so concurrent callers
//! asking for the same key share a single underlying fetch. Failed fills are
//! not stored.

use crate::{model::UserRecord, service::UserService, Error, Result};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Key of the full user listing.
pub const ALL_USERS_KEY: &str = "all_users";

/// Default time-to-live of a cached entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Longest TTL the underlying cache accepts (1000 years).
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(1000 * 365 * 24 * 60 * 60);

/// Key of a single user entry.
pub fn user_cache_key(id: u64) -> String {
    format!("user_{}", id)
}

/// Wraps a [`UserService`] with an in-memory TTL cache.
///
/// # Examples
///
/// ```no_run
/// use reqres_client::{
///     CachedUserService, Client, ExternalUserService, ReqresApiClient, UserService,
/// };
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), reqres_client::Error> {
/// let client = Client::builder().base_url("https://reqres.in/api/")?.build()?;
/// let inner = ExternalUserService::new(ReqresApiClient::new(client));
/// let service = CachedUserService::with_ttl(inner, Duration::from_secs(60));
///
/// let first = service.get_all_users().await?;
/// // Served from memory for the next minute.
/// let second = service.get_all_users().await?;
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
pub struct CachedUserService<S> {
    inner: S,
    all_users: Cache<String, Vec<UserRecord>>,
    users: Cache<String, UserRecord>,
    ttl: Duration,
}

impl<S: UserService> CachedUserService<S> {
    /// Caches with the default five minute TTL.
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    /// Caches with the given TTL, clamped to [`MAX_CACHE_TTL`].
    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        let ttl = ttl.min(MAX_CACHE_TTL);
        Self {
            inner,
            all_users: Cache::builder().time_to_live(ttl).build(),
            users: Cache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached entry.
    pub fn invalidate_all(&self) {
        self.all_users.invalidate_all();
        self.users.invalidate_all();
    }
}

/// Recovers an owned error from the shared one handed out to waiters.
fn unshare(err: Arc<Error>) -> Error {
    Arc::unwrap_or_clone(err)
}

#[async_trait]
impl<S: UserService> UserService for CachedUserService<S> {
    async fn get_user_by_id(&self, id: u64) -> Result<UserRecord> {
        let key = user_cache_key(id);

        if let Some(user) = self.users.get(&key).await {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(user);
        }

        self.users
            .try_get_with(key.clone(), async {
                tracing::debug!(key = %key, "Cache miss");
                self.inner.get_user_by_id(id).await
            })
            .await
            .map_err(unshare)
    }

    async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
        if let Some(users) = self.all_users.get(ALL_USERS_KEY).await {
            tracing::debug!(key = ALL_USERS_KEY, "Cache hit");
            return Ok(users);
        }

        self.all_users
            .try_get_with(ALL_USERS_KEY.to_string(), async {
                tracing::debug!(key = ALL_USERS_KEY, "Cache miss");
                self.inner.get_all_users().await
            })
            .await
            .map_err(unshare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn user(id: u64) -> UserRecord {
        UserRecord {
            id,
            first_name: "Janet".to_string(),
            last_name: "Weaver".to_string(),
            email: format!("user{}@reqres.in", id),
        }
    }

    /// Counts calls and optionally fails or stalls each one.
    #[derive(Default)]
    struct CountingService {
        by_id_calls: AtomicUsize,
        all_calls: AtomicUsize,
        fail: AtomicBool,
        delay: Option<Duration>,
    }

    impl CountingService {
        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Default::default()
            }
        }

        async fn outcome<T>(&self, value: T) -> Result<T> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                Err(Error::HttpError {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    raw_response: String::new(),
                    headers: HeaderMap::new(),
                })
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl UserService for CountingService {
        async fn get_user_by_id(&self, id: u64) -> Result<UserRecord> {
            self.by_id_calls.fetch_add(1, Ordering::SeqCst);
            self.outcome(user(id)).await
        }

        async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
            self.all_calls.fetch_add(1, Ordering::SeqCst);
            self.outcome(vec![user(1), user(2), user(3)]).await
        }
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(ALL_USERS_KEY, "all_users");
        assert_eq!(user_cache_key(7), "user_7");
    }

    #[tokio::test]
    async fn test_second_listing_is_served_from_cache() {
        let service = CachedUserService::new(CountingService::default());

        let first = service.get_all_users().await.unwrap();
        let second = service.get_all_users().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let service = CachedUserService::with_ttl(CountingService::default(), Duration::MAX);

        assert_eq!(service.ttl(), MAX_CACHE_TTL);
        service.get_all_users().await.unwrap();
        service.get_all_users().await.unwrap();
        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let service =
            CachedUserService::with_ttl(CountingService::default(), Duration::from_millis(100));

        service.get_all_users().await.unwrap();
        service.get_all_users().await.unwrap();
        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(250)).await;

        service.get_all_users().await.unwrap();
        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reads_do_not_extend_expiry() {
        let service =
            CachedUserService::with_ttl(CountingService::default(), Duration::from_millis(400));

        service.get_user_by_id(1).await.unwrap();
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            service.get_user_by_id(1).await.unwrap();
        }
        assert_eq!(service.inner().by_id_calls.load(Ordering::SeqCst), 1);
        // 500ms after insertion but only 200ms after the last read.
        tokio::time::sleep(Duration::from_millis(200)).await;
        service.get_user_by_id(1).await.unwrap();

        assert_eq!(service.inner().by_id_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let service = CachedUserService::new(CountingService::default());

        assert_eq!(service.get_user_by_id(1).await.unwrap().id, 1);
        assert_eq!(service.get_user_by_id(2).await.unwrap().id, 2);
        assert_eq!(service.get_user_by_id(1).await.unwrap().id, 1);
        service.get_all_users().await.unwrap();

        assert_eq!(service.inner().by_id_calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let service = CachedUserService::new(CountingService::default());
        service.inner().fail.store(true, Ordering::SeqCst);

        let err = service.get_all_users().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

        service.inner().fail.store(false, Ordering::SeqCst);
        let users = service.get_all_users().await.unwrap();

        assert_eq!(users.len(), 3);
        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let service = CachedUserService::new(CountingService::slow(Duration::from_millis(100)));

        let (a, b, c) = tokio::join!(
            service.get_all_users(),
            service.get_all_users(),
            service.get_all_users()
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(c.unwrap().len(), 3);
        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_failure_reaches_every_waiter() {
        let service = CachedUserService::new(CountingService::slow(Duration::from_millis(100)));
        service.inner().fail.store(true, Ordering::SeqCst);

        let (a, b) = tokio::join!(service.get_user_by_id(5), service.get_user_by_id(5));

        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(service.inner().by_id_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_refetch() {
        let service = CachedUserService::new(CountingService::default());

        service.get_all_users().await.unwrap();
        service.invalidate_all();
        service.get_all_users().await.unwrap();

        assert_eq!(service.inner().all_calls.load(Ordering::SeqCst), 2);
    }
}
