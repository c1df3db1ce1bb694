//! Transport adapter for the remote user endpoints.
//!
//! Maps `users/{id}` and `users?page={n}` onto domain outcomes: a 404 on a
//! single user becomes [`Error::NotFound`], every other non-success status
//! stays an [`Error::HttpError`].

use crate::{
    metadata::RequestMetadata,
    model::{SingleUserEnvelope, UserPage, UserRecord},
    Client, Error, Result,
};
use async_trait::async_trait;
use http::StatusCode;

/// Raw access to the user endpoints, one logical request per call.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// Fetches a single user.
    async fn fetch_user(&self, id: u64) -> Result<UserRecord>;

    /// Fetches one page of users. A page without data is empty.
    async fn fetch_users_page(&self, page: u32) -> Result<Vec<UserRecord>>;
}

/// [`UserApi`] over HTTP.
#[derive(Clone)]
pub struct ReqresApiClient {
    client: Client,
}

impl ReqresApiClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserApi for ReqresApiClient {
    async fn fetch_user(&self, id: u64) -> Result<UserRecord> {
        let metadata = RequestMetadata::new(format!("users/{}", id));

        match self.client.get::<SingleUserEnvelope>(metadata).await {
            Ok(response) => Ok(response.data.data),
            Err(Error::HttpError { status, .. }) if status == StatusCode::NOT_FOUND => {
                tracing::debug!(user_id = id, "User not found");
                Err(Error::NotFound { id })
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_users_page(&self, page: u32) -> Result<Vec<UserRecord>> {
        let metadata = RequestMetadata::new("users").with_query_param("page", page);

        let response = self.client.get::<Option<UserPage>>(metadata).await?;
        let users = response
            .into_data()
            .map(UserPage::into_users)
            .unwrap_or_default();

        tracing::debug!(page = page, count = users.len(), "Fetched user page");
        Ok(users)
    }
}
