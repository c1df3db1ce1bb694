//! The user service capability and its uncached implementation.

use crate::{api::UserApi, model::UserRecord, Error, Result};
use async_trait::async_trait;

/// Fetches users by id or as a complete listing.
///
/// Implemented by [`ExternalUserService`] and by the caching decorator
/// [`CachedUserService`](crate::CachedUserService), which wraps any other
/// implementation.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fails with [`Error::NotFound`] when the user does not exist.
    async fn get_user_by_id(&self, id: u64) -> Result<UserRecord>;

    /// Returns every user across all pages, in page order.
    async fn get_all_users(&self) -> Result<Vec<UserRecord>>;
}

/// Drains the paginated listing through a [`UserApi`].
///
/// Pages are requested one at a time starting at page 1. The listing ends at
/// the first page that comes back empty. With no page cap, termination
/// relies on the remote service eventually returning an empty page.
///
/// # Examples
///
/// ```no_run
/// use reqres_client::{Client, ExternalUserService, ReqresApiClient, UserService};
///
/// # async fn example() -> Result<(), reqres_client::Error> {
/// let client = Client::builder().base_url("https://reqres.in/api/")?.build()?;
/// let service = ExternalUserService::new(ReqresApiClient::new(client)).with_max_pages(100);
///
/// for user in service.get_all_users().await? {
///     println!("{}: {} {}", user.id, user.first_name, user.last_name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ExternalUserService<A> {
    api: A,
    max_pages: Option<u32>,
}

impl<A: UserApi> ExternalUserService<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            max_pages: None,
        }
    }

    /// Allows at most `limit` non-empty pages. Page `limit + 1` is still
    /// requested to confirm the listing ended; if it has records the listing
    /// fails with [`Error::PageLimitExceeded`].
    pub fn with_max_pages(mut self, limit: u32) -> Self {
        self.max_pages = Some(limit);
        self
    }
}

#[async_trait]
impl<A: UserApi> UserService for ExternalUserService<A> {
    async fn get_user_by_id(&self, id: u64) -> Result<UserRecord> {
        self.api.fetch_user(id).await
    }

    async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
        let mut all_users = Vec::new();
        let mut page = 1u32;

        loop {
            let users = self.api.fetch_users_page(page).await?;
            if users.is_empty() {
                break;
            }

            if let Some(limit) = self.max_pages {
                if page > limit {
                    tracing::error!(limit = limit, "Pagination did not terminate");
                    return Err(Error::PageLimitExceeded { limit });
                }
            }

            all_users.extend(users);
            page += 1;
        }

        tracing::debug!(
            pages = page - 1,
            users = all_users.len(),
            "Fetched full user listing"
        );
        Ok(all_users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn user(id: u64) -> UserRecord {
        UserRecord {
            id,
            first_name: format!("First{}", id),
            last_name: format!("Last{}", id),
            email: format!("user{}@reqres.in", id),
        }
    }

    /// Serves canned pages and records which pages were requested.
    #[derive(Default)]
    struct FakeApi {
        pages: HashMap<u32, Result<Vec<UserRecord>>>,
        requested: Mutex<Vec<u32>>,
    }

    impl FakeApi {
        fn with_page(mut self, page: u32, result: Result<Vec<UserRecord>>) -> Self {
            self.pages.insert(page, result);
            self
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserApi for FakeApi {
        async fn fetch_user(&self, id: u64) -> Result<UserRecord> {
            if id == 1 {
                Ok(user(1))
            } else {
                Err(Error::NotFound { id })
            }
        }

        async fn fetch_users_page(&self, page: u32) -> Result<Vec<UserRecord>> {
            self.requested.lock().unwrap().push(page);
            self.pages.get(&page).cloned().unwrap_or_else(|| Ok(vec![]))
        }
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let api = FakeApi::default()
            .with_page(1, Ok(vec![user(1), user(2)]))
            .with_page(2, Ok(vec![user(3)]))
            .with_page(3, Ok(vec![]));
        let service = ExternalUserService::new(api);

        let users = service.get_all_users().await.unwrap();

        let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(service.api.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_empty_listing() {
        let service = ExternalUserService::new(FakeApi::default());

        let users = service.get_all_users().await.unwrap();

        assert!(users.is_empty());
        assert_eq!(service.api.requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_page_failure_aborts_listing() {
        let api = FakeApi::default()
            .with_page(1, Ok(vec![user(1)]))
            .with_page(
                2,
                Err(Error::HttpError {
                    status: StatusCode::BAD_REQUEST,
                    raw_response: String::new(),
                    headers: HeaderMap::new(),
                }),
            )
            .with_page(3, Ok(vec![user(3)]));
        let service = ExternalUserService::new(api);

        let result = service.get_all_users().await;

        assert_eq!(
            result.unwrap_err().status(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(service.api.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_page_cap() {
        let api = FakeApi::default()
            .with_page(1, Ok(vec![user(1)]))
            .with_page(2, Ok(vec![user(2)]))
            .with_page(3, Ok(vec![user(3)]));
        let service = ExternalUserService::new(api).with_max_pages(2);

        let result = service.get_all_users().await;

        assert!(matches!(result, Err(Error::PageLimitExceeded { limit: 2 })));
        assert_eq!(service.api.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_listing_of_exactly_max_pages_succeeds() {
        let api = FakeApi::default()
            .with_page(1, Ok(vec![user(1)]))
            .with_page(2, Ok(vec![user(2)]))
            .with_page(3, Ok(vec![]));
        let service = ExternalUserService::new(api).with_max_pages(2);

        let users = service.get_all_users().await.unwrap();

        assert_eq!(users, vec![user(1), user(2)]);
        assert_eq!(service.api.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_page_cap_not_hit_when_listing_ends_in_time() {
        let api = FakeApi::default().with_page(1, Ok(vec![user(1)]));
        let service = ExternalUserService::new(api).with_max_pages(2);

        let users = service.get_all_users().await.unwrap();

        assert_eq!(users, vec![user(1)]);
    }

    #[tokio::test]
    async fn test_get_user_by_id_passes_through() {
        let service = ExternalUserService::new(FakeApi::default());

        assert_eq!(service.get_user_by_id(1).await.unwrap().id, 1);
        assert!(service.get_user_by_id(42).await.unwrap_err().is_not_found());
        assert!(service.api.requested().is_empty());
    }
}
