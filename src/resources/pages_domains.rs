//! Custom domains of Pages projects

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::response::null_default;
use crate::resources::require;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagesDomain {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default)]
    pub verification_data: Option<Value>,
    #[serde(default)]
    pub validation_data: Option<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub zone_tag: String,
    #[serde(default, deserialize_with = "null_default")]
    pub certificate_authority: String,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
}

fn domains_path(rc: &ResourceContainer, project: &str) -> Result<String> {
    rc.require_account()?;
    require(project, Error::MissingProjectName)?;
    Ok(format!("{}/pages/projects/{}/domains", rc.path(), project))
}

impl Client {
    pub async fn list_pages_domains(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        project: &str,
    ) -> Result<Vec<PagesDomain>> {
        let path = domains_path(rc, project)?;
        self.get(ctx, path).await
    }

    pub async fn get_pages_domain(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        project: &str,
        domain: &str,
    ) -> Result<PagesDomain> {
        let path = domains_path(rc, project)?;
        require(domain, Error::MissingDomain)?;
        self.get(ctx, format!("{}/{}", path, domain)).await
    }

    pub async fn add_pages_domain(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        project: &str,
        domain: &str,
    ) -> Result<PagesDomain> {
        let path = domains_path(rc, project)?;
        require(domain, Error::MissingDomain)?;
        self.post(ctx, path, &json!({ "name": domain })).await
    }

    /// Retry validation of a domain that failed to verify.
    pub async fn patch_pages_domain(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        project: &str,
        domain: &str,
    ) -> Result<PagesDomain> {
        let path = domains_path(rc, project)?;
        require(domain, Error::MissingDomain)?;
        self.patch(ctx, format!("{}/{}", path, domain), &json!({}))
            .await
    }

    pub async fn delete_pages_domain(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        project: &str,
        domain: &str,
    ) -> Result<()> {
        let path = domains_path(rc, project)?;
        require(domain, Error::MissingDomain)?;
        let _: IgnoredAny = self.delete(ctx, format!("{}/{}", path, domain)).await?;
        Ok(())
    }
}
