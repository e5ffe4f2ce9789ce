//! Zone lockdown rules (zone level only)

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{Paginated, PaginationOptions};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, ResultInfo};
use crate::resources::require;

/// `target` is `ip` or `ip_range`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneLockdownConfig {
    pub target: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneLockdown {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    pub urls: Vec<String>,
    pub configurations: Vec<ZoneLockdownConfig>,
    #[serde(default, deserialize_with = "null_default")]
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListZoneLockdownsParams {
    pub description: Option<String>,
    pub description_search: Option<String>,
    pub uri_search: Option<String>,
    pub ip: Option<String>,
    pub ip_search: Option<String>,
    pub ip_range_search: Option<String>,
    pub priority: Option<i32>,
    pub created_on: Option<DateTime<Utc>>,
    pub modified_on: Option<DateTime<Utc>>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListZoneLockdownsParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("description", self.description.as_ref())
            .opt("description_search", self.description_search.as_ref())
            .opt("uri_search", self.uri_search.as_ref())
            .opt("ip", self.ip.as_ref())
            .opt("ip_search", self.ip_search.as_ref())
            .opt("ip_range_search", self.ip_range_search.as_ref())
            .opt("priority", self.priority)
            .time("created_on", self.created_on.as_ref())
            .time("modified_on", self.modified_on.as_ref())
            .extend(&self.pagination);
    }
}

impl Paginated for ListZoneLockdownsParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

fn lockdowns_path(rc: &ResourceContainer) -> String {
    format!("{}/firewall/lockdowns", rc.path())
}

impl Client {
    /// Pagination info in the result is advanced past the page served.
    pub async fn list_zone_lockdowns(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListZoneLockdownsParams,
    ) -> Result<(Vec<ZoneLockdown>, ResultInfo)> {
        rc.require_zone()?;
        self.list_pages(ctx, &lockdowns_path(rc), params, 50).await
    }

    pub async fn get_zone_lockdown(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        rule_id: &str,
    ) -> Result<ZoneLockdown> {
        rc.require_zone()?;
        require(rule_id, Error::MissingRuleId)?;
        self.get(ctx, format!("{}/{}", lockdowns_path(rc), rule_id))
            .await
    }

    pub async fn create_zone_lockdown(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        lockdown: &ZoneLockdown,
    ) -> Result<ZoneLockdown> {
        rc.require_zone()?;
        self.post(ctx, lockdowns_path(rc), lockdown).await
    }

    /// Replace the rule identified by `lockdown.id`.
    pub async fn update_zone_lockdown(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        lockdown: &ZoneLockdown,
    ) -> Result<ZoneLockdown> {
        rc.require_zone()?;
        require(&lockdown.id, Error::MissingRuleId)?;
        self.put(ctx, format!("{}/{}", lockdowns_path(rc), lockdown.id), lockdown)
            .await
    }

    pub async fn delete_zone_lockdown(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        rule_id: &str,
    ) -> Result<()> {
        rc.require_zone()?;
        require(rule_id, Error::MissingRuleId)?;
        let _: IgnoredAny = self
            .delete(ctx, format!("{}/{}", lockdowns_path(rc), rule_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::build_uri;
    use chrono::TimeZone;

    #[test]
    fn filters_encode_in_declaration_order() {
        let params = ListZoneLockdownsParams {
            ip: Some("198.51.100.4".into()),
            priority: Some(5),
            modified_on: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            build_uri("/zones/z/firewall/lockdowns", &params),
            "/zones/z/firewall/lockdowns?ip=198.51.100.4&priority=5&modified_on=2024-01-02T03%3A04%3A05Z"
        );
    }
}
