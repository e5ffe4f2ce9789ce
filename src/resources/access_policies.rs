//! Access policies
//!
//! Policies either belong to one application
//! (`/{level}/{id}/access/apps/{app}/policies`) or are reusable across
//! applications (`/accounts/{id}/access/policies`). Reusable policies only
//! exist at account level.

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

/// Approval group for policies requiring approval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessApprovalGroup {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub email_list_uuid: Vec<String>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<String>,
    pub approvals_needed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedence: Option<i32>,
    /// `allow`, `deny`, `non_identity` or `bypass`; passed through as-is
    pub decision: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub include: Vec<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub exclude: Vec<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub require: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_required: Option<bool>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub approval_groups: Vec<AccessApprovalGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_justification_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolation_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reusable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAccessPoliciesParams {
    /// Application whose policies to list; empty for reusable policies
    pub application_id: String,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListAccessPoliciesParams {
    fn append_query(&self, query: &mut Query) {
        query.extend(&self.pagination);
    }
}

impl Paginated for ListAccessPoliciesParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AccessPolicyParams {
    /// Owning application; empty for a reusable policy
    #[serde(skip)]
    pub application_id: String,
    /// Policy to update; ignored on create
    #[serde(skip)]
    pub policy_id: String,
    pub name: String,
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precedence: Option<i32>,
    pub include: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_required: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub approval_groups: Vec<AccessApprovalGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose_justification_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation_required: Option<bool>,
}

/// Base path for an application's policies, or the reusable policy
/// collection when `application_id` is empty.
fn policies_path(rc: &ResourceContainer, application_id: &str) -> Result<String> {
    if application_id.is_empty() {
        rc.require_account()?;
        return Ok(format!("{}/access/policies", rc.path()));
    }
    rc.validate()?;
    Ok(format!("{}/access/apps/{}/policies", rc.path(), application_id))
}

impl Client {
    /// Pagination info in the result is advanced past the page served.
    pub async fn list_access_policies(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListAccessPoliciesParams,
    ) -> Result<(Vec<AccessPolicy>, ResultInfo)> {
        let path = policies_path(rc, &params.application_id)?;
        self.list_pages(ctx, &path, params, 25).await
    }

    pub async fn get_access_policy(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        application_id: &str,
        policy_id: &str,
    ) -> Result<AccessPolicy> {
        let path = policies_path(rc, application_id)?;
        require(policy_id, Error::MissingResourceId("policy id"))?;
        self.get(ctx, format!("{}/{}", path, policy_id)).await
    }

    pub async fn create_access_policy(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &AccessPolicyParams,
    ) -> Result<AccessPolicy> {
        let path = policies_path(rc, &params.application_id)?;
        self.post(ctx, path, params).await
    }

    pub async fn update_access_policy(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &AccessPolicyParams,
    ) -> Result<AccessPolicy> {
        let path = policies_path(rc, &params.application_id)?;
        require(&params.policy_id, Error::MissingResourceId("policy id"))?;
        self.put(ctx, format!("{}/{}", path, params.policy_id), params)
            .await
    }

    pub async fn delete_access_policy(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        application_id: &str,
        policy_id: &str,
    ) -> Result<()> {
        let path = policies_path(rc, application_id)?;
        require(policy_id, Error::MissingResourceId("policy id"))?;
        let _: IgnoredAny = self.delete(ctx, format!("{}/{}", path, policy_id)).await?;
        Ok(())
    }
}
