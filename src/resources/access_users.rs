//! Zero Trust users (account level only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{Paginated, PaginationOptions};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, ResultInfo};
use crate::resources::require;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessUser {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default)]
    pub access_seat: Option<bool>,
    #[serde(default)]
    pub gateway_seat: Option<bool>,
    #[serde(default, deserialize_with = "null_default")]
    pub seat_uid: String,
    #[serde(default, deserialize_with = "null_default")]
    pub active_device_count: u32,
    #[serde(default)]
    pub last_successful_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessUserActiveSession {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub expiration: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata: Value,
}

#[derive(Debug, Clone, Default)]
pub struct ListAccessUsersParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub search: Option<String>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListAccessUsersParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("name", self.name.as_ref())
            .opt("email", self.email.as_ref())
            .opt("search", self.search.as_ref())
            .extend(&self.pagination);
    }
}

impl Paginated for ListAccessUsersParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

impl Client {
    /// List users of the account's Zero Trust organization.
    ///
    /// The returned [`ResultInfo`] points one page past the last page served.
    pub async fn list_access_users(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListAccessUsersParams,
    ) -> Result<(Vec<AccessUser>, ResultInfo)> {
        rc.require_account()?;
        let path = format!("{}/access/users", rc.path());
        self.list_pages(ctx, &path, params, 25).await
    }

    pub async fn list_access_user_active_sessions(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        user_id: &str,
    ) -> Result<Vec<AccessUserActiveSession>> {
        rc.require_account()?;
        require(user_id, Error::MissingResourceId("user id"))?;
        self.get(
            ctx,
            format!("{}/access/users/{}/active_sessions", rc.path(), user_id),
        )
        .await
    }
}
