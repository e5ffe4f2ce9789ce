//! Custom domains attached to Workers (account level only)

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::query::{build_uri, Query, QueryParams};
use crate::api::response::null_default;
use crate::resources::require;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkersDomain {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub zone_name: String,
    pub hostname: String,
    pub service: String,
    pub environment: String,
}

/// Binding of a hostname to a Worker service environment
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachWorkersDomainParams {
    pub zone_id: String,
    pub hostname: String,
    pub service: String,
    pub environment: String,
}

impl AttachWorkersDomainParams {
    fn validate(&self) -> Result<()> {
        require(&self.zone_id, Error::MissingZoneId)?;
        require(&self.hostname, Error::MissingHostname)?;
        require(&self.service, Error::MissingService)?;
        require(&self.environment, Error::MissingEnvironment)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListWorkersDomainsParams {
    pub zone_id: Option<String>,
    pub zone_name: Option<String>,
    pub hostname: Option<String>,
    pub service: Option<String>,
    pub environment: Option<String>,
}

impl QueryParams for ListWorkersDomainsParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("zone_id", self.zone_id.as_ref())
            .opt("zone_name", self.zone_name.as_ref())
            .opt("hostname", self.hostname.as_ref())
            .opt("service", self.service.as_ref())
            .opt("environment", self.environment.as_ref());
    }
}

fn domains_path(rc: &ResourceContainer) -> Result<String> {
    rc.require_account()?;
    Ok(format!("{}/workers/domains", rc.path()))
}

impl Client {
    pub async fn list_workers_domains(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &ListWorkersDomainsParams,
    ) -> Result<Vec<WorkersDomain>> {
        let path = domains_path(rc)?;
        self.get(ctx, build_uri(&path, params)).await
    }

    /// Attach a hostname to a Worker, replacing any existing binding.
    pub async fn attach_workers_domain(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &AttachWorkersDomainParams,
    ) -> Result<WorkersDomain> {
        let path = domains_path(rc)?;
        params.validate()?;
        self.put(ctx, path, params).await
    }

    pub async fn get_workers_domain(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        domain_id: &str,
    ) -> Result<WorkersDomain> {
        let path = domains_path(rc)?;
        require(domain_id, Error::MissingResourceId("domain id"))?;
        self.get(ctx, format!("{}/{}", path, domain_id)).await
    }

    pub async fn detach_workers_domain(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        domain_id: &str,
    ) -> Result<()> {
        let path = domains_path(rc)?;
        require(domain_id, Error::MissingResourceId("domain id"))?;
        let _: IgnoredAny = self.delete(ctx, format!("{}/{}", path, domain_id)).await?;
        Ok(())
    }
}
