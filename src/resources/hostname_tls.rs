//! Per-hostname TLS settings (zone level only)
//!
//! Settings are addressed by name (`min_tls_version`, `ciphers`, `http2`...).
//! Their values vary in shape, so they are carried as raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{Paginated, PaginationOptions};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, ResultInfo};
use crate::resources::require;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostnameTlsSetting {
    pub hostname: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: Value,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListHostnameTlsSettingsParams {
    pub setting: String,
    pub hostnames: Vec<String>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListHostnameTlsSettingsParams {
    fn append_query(&self, query: &mut Query) {
        query
            .list("hostname", &self.hostnames)
            .extend(&self.pagination);
    }
}

impl Paginated for ListHostnameTlsSettingsParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

fn setting_path(rc: &ResourceContainer, setting: &str) -> Result<String> {
    rc.require_zone()?;
    require(setting, Error::MissingTlsSettingName)?;
    Ok(format!("{}/hostnames/settings/{}", rc.path(), setting))
}

fn hostname_path(rc: &ResourceContainer, setting: &str, hostname: &str) -> Result<String> {
    let path = setting_path(rc, setting)?;
    require(hostname, Error::MissingHostname)?;
    Ok(format!("{}/{}", path, hostname))
}

impl Client {
    /// Pagination info in the result is advanced past the page served.
    pub async fn list_hostname_tls_settings(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListHostnameTlsSettingsParams,
    ) -> Result<(Vec<HostnameTlsSetting>, ResultInfo)> {
        let path = setting_path(rc, &params.setting)?;
        self.list_pages(ctx, &path, params, 50).await
    }

    pub async fn update_hostname_tls_setting(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        setting: &str,
        hostname: &str,
        value: Value,
    ) -> Result<HostnameTlsSetting> {
        let path = hostname_path(rc, setting, hostname)?;
        self.put(ctx, path, &json!({ "value": value })).await
    }

    /// Remove the per-hostname override, returning the setting as it was.
    pub async fn delete_hostname_tls_setting(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        setting: &str,
        hostname: &str,
    ) -> Result<HostnameTlsSetting> {
        let path = hostname_path(rc, setting, hostname)?;
        self.delete(ctx, path).await
    }
}
