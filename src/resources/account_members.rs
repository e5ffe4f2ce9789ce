//! Account members and roles
//!
//! A member is granted access either through legacy roles or through
//! permission policies, never both in the same request.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{Paginated, PaginationOptions};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, ResultInfo};
use crate::resources::require;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountMemberUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub two_factor_authentication_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRole {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub permissions: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionGroup {
    pub id: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Permission policy attached to a member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberPolicy {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// `allow` or `deny`
    pub access: String,
    pub permission_groups: Vec<PermissionGroup>,
    pub resource_groups: Vec<ResourceGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountMember {
    pub id: String,
    pub user: AccountMemberUser,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub roles: Vec<AccountRole>,
    #[serde(default, deserialize_with = "null_default")]
    pub policies: Vec<MemberPolicy>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAccountMembersParams {
    pub status: Option<String>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListAccountMembersParams {
    fn append_query(&self, query: &mut Query) {
        query.opt("status", self.status.as_ref()).extend(&self.pagination);
    }
}

impl Paginated for ListAccountMembersParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateAccountMemberParams {
    pub email: String,
    /// Role ids
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<MemberPolicy>,
    /// `accepted` skips the invitation email (enterprise only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn members_path(rc: &ResourceContainer) -> String {
    format!("{}/members", rc.path())
}

fn check_exclusive(has_roles: bool, has_policies: bool) -> Result<()> {
    if has_roles && has_policies {
        return Err(Error::RolesAndPoliciesMutuallyExclusive);
    }
    Ok(())
}

impl Client {
    /// Pagination info in the result is advanced past the page served.
    pub async fn list_account_members(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListAccountMembersParams,
    ) -> Result<(Vec<AccountMember>, ResultInfo)> {
        rc.require_account()?;
        self.list_pages(ctx, &members_path(rc), params, 50).await
    }

    pub async fn get_account_member(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        member_id: &str,
    ) -> Result<AccountMember> {
        rc.require_account()?;
        require(member_id, Error::MissingResourceId("member id"))?;
        self.get(ctx, format!("{}/{}", members_path(rc), member_id))
            .await
    }

    /// Invite a member with either roles or policies.
    pub async fn create_account_member(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &CreateAccountMemberParams,
    ) -> Result<AccountMember> {
        rc.require_account()?;
        require(&params.email, Error::MissingResourceId("email"))?;
        check_exclusive(!params.roles.is_empty(), !params.policies.is_empty())?;
        self.post(ctx, members_path(rc), params).await
    }

    /// Replace a member's roles or policies.
    pub async fn update_account_member(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        member: &AccountMember,
    ) -> Result<AccountMember> {
        rc.require_account()?;
        require(&member.id, Error::MissingResourceId("member id"))?;
        check_exclusive(!member.roles.is_empty(), !member.policies.is_empty())?;
        self.put(ctx, format!("{}/{}", members_path(rc), member.id), member)
            .await
    }

    pub async fn delete_account_member(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        member_id: &str,
    ) -> Result<()> {
        rc.require_account()?;
        require(member_id, Error::MissingResourceId("member id"))?;
        let _: IgnoredAny = self
            .delete(ctx, format!("{}/{}", members_path(rc), member_id))
            .await?;
        Ok(())
    }

    /// Roles of the account. Like every paged listing, the returned info
    /// points one past the last page served.
    pub async fn list_account_roles(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        pagination: PaginationOptions,
    ) -> Result<(Vec<AccountRole>, ResultInfo)> {
        rc.require_account()?;
        let path = format!("{}/roles", rc.path());
        self.list_pages(ctx, &path, pagination, 50).await
    }

    pub async fn get_account_role(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        role_id: &str,
    ) -> Result<AccountRole> {
        rc.require_account()?;
        require(role_id, Error::MissingResourceId("role id"))?;
        self.get(ctx, format!("{}/roles/{}", rc.path(), role_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roles_and_policies_are_exclusive() {
        assert!(check_exclusive(true, false).is_ok());
        assert!(check_exclusive(false, true).is_ok());
        assert!(check_exclusive(false, false).is_ok());
        assert!(matches!(
            check_exclusive(true, true),
            Err(Error::RolesAndPoliciesMutuallyExclusive)
        ));
    }

    #[test]
    fn create_body_sends_role_ids_only() {
        let params = CreateAccountMemberParams {
            email: "user@example.com".into(),
            roles: vec!["3536bcfad5faccb999b47003c79917fb".into()],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"email": "user@example.com", "roles": ["3536bcfad5faccb999b47003c79917fb"]})
        );
    }

    #[test]
    fn decodes_member_with_policies() {
        let member: AccountMember = serde_json::from_value(json!({
            "id": "4536bcfad5faccb111b47003c79917fa",
            "user": {
                "id": "7c5dae5552338874e5053f2534d2767a",
                "first_name": "John",
                "last_name": null,
                "email": "user@example.com",
                "two_factor_authentication_enabled": false
            },
            "status": "accepted",
            "policies": [{
                "id": "f267e341f3dd4697bd3b9f71dd96247f",
                "access": "allow",
                "permission_groups": [{"id": "c8fed203ed3043cba015a93ad1616f1f", "name": "Zone Read"}],
                "resource_groups": [{"id": "6d7f2f5f5b1d4a0e9081fdc98d432fd1"}]
            }]
        }))
        .unwrap();

        assert!(member.roles.is_empty());
        assert_eq!(member.policies[0].access, "allow");
        assert_eq!(member.user.last_name, None);
    }
}
