//! Access groups

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
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

/// Reusable set of Access rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessGroup {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub include: Vec<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub exclude: Vec<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub require: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAccessGroupsParams {
    pub name: Option<String>,
    pub search: Option<String>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListAccessGroupsParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("name", self.name.as_ref())
            .opt("search", self.search.as_ref())
            .extend(&self.pagination);
    }
}

impl Paginated for ListAccessGroupsParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateAccessGroupParams {
    pub name: String,
    pub include: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAccessGroupParams {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub include: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

fn groups_path(rc: &ResourceContainer) -> String {
    format!("{}/access/groups", rc.path())
}

impl Client {
    /// List Access groups, walking every page unless one was requested.
    ///
    /// The returned [`ResultInfo`] is already advanced past the last page
    /// served: an explicit `page(2, 10)` comes back with `page == 3`.
    pub async fn list_access_groups(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListAccessGroupsParams,
    ) -> Result<(Vec<AccessGroup>, ResultInfo)> {
        rc.validate()?;
        self.list_pages(ctx, &groups_path(rc), params, 25).await
    }

    pub async fn get_access_group(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        group_id: &str,
    ) -> Result<AccessGroup> {
        rc.validate()?;
        require(group_id, Error::MissingResourceId("access group id"))?;
        self.get(ctx, format!("{}/{}", groups_path(rc), group_id))
            .await
    }

    pub async fn create_access_group(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &CreateAccessGroupParams,
    ) -> Result<AccessGroup> {
        rc.validate()?;
        self.post(ctx, groups_path(rc), params).await
    }

    pub async fn update_access_group(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &UpdateAccessGroupParams,
    ) -> Result<AccessGroup> {
        rc.validate()?;
        require(&params.id, Error::MissingResourceId("access group id"))?;
        self.put(ctx, format!("{}/{}", groups_path(rc), params.id), params)
            .await
    }

    pub async fn delete_access_group(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        group_id: &str,
    ) -> Result<()> {
        rc.validate()?;
        require(group_id, Error::MissingResourceId("access group id"))?;
        let _: IgnoredAny = self
            .delete(ctx, format!("{}/{}", groups_path(rc), group_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::build_uri;
    use serde_json::json;

    #[test]
    fn decodes_group_with_rules() {
        let group: AccessGroup = serde_json::from_value(json!({
            "id": "699d98642c564d2e855e9661899b7252",
            "name": "Allow devs",
            "include": [{"email": {"email": "test@example.com"}}],
            "exclude": [],
            "require": [],
            "created_at": "2014-01-01T05:20:00.12345Z",
            "updated_at": "2014-01-01T05:20:00.12345Z"
        }))
        .unwrap();

        assert_eq!(group.name, "Allow devs");
        assert_eq!(group.include.len(), 1);
        let created = group.created_at.unwrap();
        assert_eq!(created.timestamp_subsec_nanos(), 123_450_000);
    }

    #[test]
    fn list_filters_precede_pagination() {
        let params = ListAccessGroupsParams {
            name: Some("devs".into()),
            pagination: PaginationOptions::page(2, 10),
            ..Default::default()
        };
        assert_eq!(
            build_uri("/accounts/a/access/groups", &params),
            "/accounts/a/access/groups?name=devs&page=2&per_page=10"
        );
    }

    #[test]
    fn update_body_omits_id() {
        let params = UpdateAccessGroupParams {
            id: "g1".into(),
            name: "n".into(),
            include: vec![json!({"everyone": {}})],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"name": "n", "include": [{"everyone": {}}]})
        );
    }
}
