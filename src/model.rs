//! Wire types for the user-listing API.

use serde::{Deserialize, Serialize};

/// A single user as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identifier assigned by the remote service.
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Body of `GET users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleUserEnvelope {
    pub data: UserRecord,
}

/// Body of `GET users?page={n}`.
///
/// Every field is optional on the wire. A missing or `null` `data` field is
/// an empty page, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPage {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub total_pages: u32,
    pub data: Option<Vec<UserRecord>>,
}

impl UserPage {
    /// Consumes the page and returns its records, empty if `data` was absent.
    pub fn into_users(self) -> Vec<UserRecord> {
        self.data.unwrap_or_default()
    }
}
