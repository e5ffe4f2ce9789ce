//! Account audit logs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::Result;
use crate::api::pagination::{Paginated, PaginationOptions};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, ResultInfo};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLogAction {
    #[serde(default, deserialize_with = "null_default")]
    pub result: bool,
    #[serde(default, deserialize_with = "null_default", rename = "type")]
    pub action_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLogActor {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub ip: String,
    #[serde(default, deserialize_with = "null_default", rename = "type")]
    pub actor_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLogOwner {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLogResource {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default", rename = "type")]
    pub resource_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub action: AuditLogAction,
    #[serde(default, deserialize_with = "null_default")]
    pub actor: AuditLogActor,
    #[serde(default, deserialize_with = "null_default")]
    pub interface: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "null_default", rename = "newValue")]
    pub new_value: String,
    #[serde(default, deserialize_with = "null_default", rename = "oldValue")]
    pub old_value: String,
    #[serde(default, deserialize_with = "null_default")]
    pub owner: AuditLogOwner,
    #[serde(default, deserialize_with = "null_default")]
    pub resource: AuditLogResource,
    #[serde(default)]
    pub when: Option<DateTime<Utc>>,
}

/// Filters for [`Client::list_audit_logs`]
///
/// `since` and `before` bound the time range and are sent as RFC 3339.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub id: Option<String>,
    pub actor_ip: Option<String>,
    pub actor_email: Option<String>,
    pub action_type: Option<String>,
    pub zone_name: Option<String>,
    /// `asc` or `desc`
    pub direction: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub hide_user_logs: Option<bool>,
    pub pagination: PaginationOptions,
}

impl QueryParams for AuditLogFilter {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("id", self.id.as_ref())
            .opt("actor.ip", self.actor_ip.as_ref())
            .opt("actor.email", self.actor_email.as_ref())
            .opt("action.type", self.action_type.as_ref())
            .opt("zone.name", self.zone_name.as_ref())
            .opt("direction", self.direction.as_ref())
            .time("since", self.since.as_ref())
            .time("before", self.before.as_ref())
            .opt("hide_user_logs", self.hide_user_logs)
            .extend(&self.pagination);
    }
}

impl Paginated for AuditLogFilter {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

impl Client {
    /// The returned [`ResultInfo`] points one page past the last page served.
    pub async fn list_audit_logs(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        filter: AuditLogFilter,
    ) -> Result<(Vec<AuditLog>, ResultInfo)> {
        rc.require_account()?;
        let path = format!("{}/audit_logs", rc.path());
        self.list_pages(ctx, &path, filter, 100).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::build_uri;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn filter_encodes_time_range_and_dotted_keys() {
        let filter = AuditLogFilter {
            actor_email: Some("admin@example.com".into()),
            direction: Some("desc".into()),
            since: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            before: Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            build_uri("/accounts/a/audit_logs", &filter),
            "/accounts/a/audit_logs?actor.email=admin%40example.com&direction=desc\
             &since=2024-05-01T00%3A00%3A00Z&before=2024-05-02T00%3A00%3A00Z"
        );
    }

    #[test]
    fn decodes_log_entry() {
        let log: AuditLog = serde_json::from_value(json!({
            "id": "f174be97-19b1-40d6-954d-70cd5fbd52db",
            "action": {"result": true, "type": "change_setting"},
            "actor": {"email": "michelle@example.com", "id": "f6b5de0326bb5182b8a4840ee01ec774", "ip": "198.41.129.166", "type": "user"},
            "interface": "UI",
            "metadata": {"name": "security_level", "type": "firewall", "value": "high", "zone_name": "example.com"},
            "newValue": "low",
            "oldValue": "high",
            "owner": {"id": "1b5d3a5e0f6d4c7b9e2a8f1c3d5e7a9b"},
            "resource": {"id": "4d5cdd36e4d84e9fbbd6ae1b35e7b3cd", "type": "zone"},
            "when": "2017-04-26T17:31:07Z"
        }))
        .unwrap();
        assert_eq!(log.action.action_type, "change_setting");
        assert_eq!(log.actor.ip, "198.41.129.166");
        assert_eq!(log.new_value, "low");
    }
}
