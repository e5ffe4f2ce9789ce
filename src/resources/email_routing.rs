//! Email Routing rules (zone level only)

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{Paginated, PaginationOptions};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, ResultInfo};
use crate::resources::require;

/// `type` is `all` or `literal`; `field` is `to` for literal matchers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRoutingRuleMatcher {
    #[serde(rename = "type")]
    pub matcher_type: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub field: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// `type` is `forward`, `worker` or `drop`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRoutingRuleAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRoutingRule {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    pub matchers: Vec<EmailRoutingRuleMatcher>,
    pub actions: Vec<EmailRoutingRuleAction>,
}

#[derive(Debug, Clone, Default)]
pub struct ListEmailRoutingRulesParams {
    pub enabled: Option<bool>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListEmailRoutingRulesParams {
    fn append_query(&self, query: &mut Query) {
        query.opt("enabled", self.enabled).extend(&self.pagination);
    }
}

impl Paginated for ListEmailRoutingRulesParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

fn rules_path(rc: &ResourceContainer) -> String {
    format!("{}/email/routing/rules", rc.path())
}

impl Client {
    /// The returned [`ResultInfo`] points one page past the last page served.
    pub async fn list_email_routing_rules(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListEmailRoutingRulesParams,
    ) -> Result<(Vec<EmailRoutingRule>, ResultInfo)> {
        rc.require_zone()?;
        self.list_pages(ctx, &rules_path(rc), params, 20).await
    }

    pub async fn get_email_routing_rule(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        rule_id: &str,
    ) -> Result<EmailRoutingRule> {
        rc.require_zone()?;
        require(rule_id, Error::MissingRuleId)?;
        self.get(ctx, format!("{}/{}", rules_path(rc), rule_id))
            .await
    }

    pub async fn create_email_routing_rule(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        rule: &EmailRoutingRule,
    ) -> Result<EmailRoutingRule> {
        rc.require_zone()?;
        self.post(ctx, rules_path(rc), rule).await
    }

    /// Replace the rule identified by `rule.tag`.
    pub async fn update_email_routing_rule(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        rule: &EmailRoutingRule,
    ) -> Result<EmailRoutingRule> {
        rc.require_zone()?;
        require(&rule.tag, Error::MissingRuleId)?;
        self.put(ctx, format!("{}/{}", rules_path(rc), rule.tag), rule)
            .await
    }

    /// Delete a rule, returning it as it was.
    pub async fn delete_email_routing_rule(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        rule_id: &str,
    ) -> Result<EmailRoutingRule> {
        rc.require_zone()?;
        require(rule_id, Error::MissingRuleId)?;
        self.delete(ctx, format!("{}/{}", rules_path(rc), rule_id))
            .await
    }

    pub async fn get_email_routing_catch_all_rule(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
    ) -> Result<EmailRoutingRule> {
        rc.require_zone()?;
        self.get(ctx, format!("{}/catch_all", rules_path(rc))).await
    }

    pub async fn update_email_routing_catch_all_rule(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        rule: &EmailRoutingRule,
    ) -> Result<EmailRoutingRule> {
        rc.require_zone()?;
        self.put(ctx, format!("{}/catch_all", rules_path(rc)), rule)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_rule_body() {
        let rule = EmailRoutingRule {
            name: "Send to user@example.net rule.".into(),
            enabled: Some(true),
            matchers: vec![EmailRoutingRuleMatcher {
                matcher_type: "literal".into(),
                field: "to".into(),
                value: "test@example.com".into(),
            }],
            actions: vec![EmailRoutingRuleAction {
                action_type: "forward".into(),
                value: vec!["destinationaddress@example.net".into()],
            }],
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "name": "Send to user@example.net rule.",
                "enabled": true,
                "matchers": [{"type": "literal", "field": "to", "value": "test@example.com"}],
                "actions": [{"type": "forward", "value": ["destinationaddress@example.net"]}]
            })
        );
    }
}
