//! Threat intelligence lookups (account level only)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::query::{build_uri, Query, QueryParams};
use crate::api::response::null_default;
use crate::resources::require;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentCategory {
    pub id: i64,
    #[serde(default)]
    pub super_category_id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainDetails {
    pub domain: String,
    #[serde(default, deserialize_with = "null_default")]
    pub resolves_to_refs: Vec<Value>,
    #[serde(default)]
    pub popularity_rank: Option<i64>,
    #[serde(default)]
    pub application: Option<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub risk_types: Vec<ContentCategory>,
    #[serde(default, deserialize_with = "null_default")]
    pub content_categories: Vec<ContentCategory>,
    #[serde(default)]
    pub additional_information: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizationHistory {
    #[serde(default, deserialize_with = "null_default")]
    pub categories: Vec<ContentCategory>,
    #[serde(default, deserialize_with = "null_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_default")]
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainHistory {
    pub domain: String,
    #[serde(default, deserialize_with = "null_default")]
    pub categorizations: Vec<CategorizationHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub domain: String,
    #[serde(default, deserialize_with = "null_default")]
    pub created_date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub updated_date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub registrant: String,
    #[serde(default, deserialize_with = "null_default")]
    pub registrant_org: String,
    #[serde(default, deserialize_with = "null_default")]
    pub registrant_country: String,
    #[serde(default, deserialize_with = "null_default")]
    pub registrant_email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub registrar: String,
    #[serde(default, deserialize_with = "null_default")]
    pub nameservers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutonomousSystem {
    #[serde(default, deserialize_with = "null_default")]
    pub asn: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_default", rename = "type")]
    pub as_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub domain_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpOverview {
    pub ip: String,
    #[serde(default)]
    pub belongs_to_ref: Option<AutonomousSystem>,
    #[serde(default, deserialize_with = "null_default")]
    pub risk_types: Vec<ContentCategory>,
}

/// Address to look up; the family picks the query key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpLookup {
    V4(String),
    V6(String),
}

impl QueryParams for IpLookup {
    fn append_query(&self, query: &mut Query) {
        match self {
            IpLookup::V4(ip) => query.str("ipv4", ip),
            IpLookup::V6(ip) => query.str("ipv6", ip),
        };
    }
}

struct DomainQuery<'a> {
    domains: &'a [&'a str],
}

impl QueryParams for DomainQuery<'_> {
    fn append_query(&self, query: &mut Query) {
        query.list("domain", self.domains.iter().filter(|d| !d.is_empty()));
    }
}

fn intel_path(rc: &ResourceContainer, endpoint: &str) -> Result<String> {
    rc.require_account()?;
    Ok(format!("{}/intel/{}", rc.path(), endpoint))
}

impl Client {
    pub async fn domain_details(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        domain: &str,
    ) -> Result<DomainDetails> {
        let path = intel_path(rc, "domain")?;
        require(domain, Error::MissingDomain)?;
        let uri = build_uri(&path, &DomainQuery { domains: &[domain] });
        self.get(ctx, uri).await
    }

    /// Look up several domains at once (`domain` repeated in the query).
    pub async fn domain_details_bulk(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        domains: &[&str],
    ) -> Result<Vec<DomainDetails>> {
        let path = intel_path(rc, "domain/bulk")?;
        if domains.iter().all(|d| d.is_empty()) {
            return Err(Error::MissingDomain);
        }
        let uri = build_uri(&path, &DomainQuery { domains });
        self.get(ctx, uri).await
    }

    pub async fn domain_history(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        domain: &str,
    ) -> Result<Vec<DomainHistory>> {
        let path = intel_path(rc, "domain-history")?;
        require(domain, Error::MissingDomain)?;
        let uri = build_uri(&path, &DomainQuery { domains: &[domain] });
        self.get(ctx, uri).await
    }

    pub async fn whois(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        domain: &str,
    ) -> Result<WhoisRecord> {
        let path = intel_path(rc, "whois")?;
        require(domain, Error::MissingDomain)?;
        let uri = build_uri(&path, &DomainQuery { domains: &[domain] });
        self.get(ctx, uri).await
    }

    pub async fn ip_overview(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        ip: &IpLookup,
    ) -> Result<Vec<IpOverview>> {
        let path = intel_path(rc, "ip")?;
        self.get(ctx, build_uri(&path, ip)).await
    }
}
