//! Workers KV namespaces, keys and values

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::api::client::{decode_envelope, into_result, Client};
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{CursorPaginated, Paginated, PaginationOptions};
use crate::api::query::{Query, QueryParams};
use crate::api::response::ResultInfo;
use crate::api::transport::{headers, RequestBody};
use crate::resources::{require, segment};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkersKvNamespace {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_url_encoding: Option<bool>,
}

/// Key stored in a namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageKey {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Entry for a bulk write
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkersKvPair {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListWorkersKvNamespacesParams {
    pub order: Option<String>,
    pub direction: Option<String>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListWorkersKvNamespacesParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("order", self.order.as_ref())
            .opt("direction", self.direction.as_ref())
            .extend(&self.pagination);
    }
}

impl Paginated for ListWorkersKvNamespacesParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListWorkersKvKeysParams {
    pub namespace_id: String,
    pub prefix: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl QueryParams for ListWorkersKvKeysParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("prefix", self.prefix.as_ref())
            .opt("limit", self.limit)
            .opt("cursor", self.cursor.as_ref());
    }
}

impl CursorPaginated for ListWorkersKvKeysParams {
    fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }
}

fn namespaces_path(rc: &ResourceContainer) -> String {
    format!("{}/storage/kv/namespaces", rc.path())
}

fn value_path(rc: &ResourceContainer, namespace_id: &str, key: &str) -> String {
    format!(
        "{}/{}/values/{}",
        namespaces_path(rc),
        namespace_id,
        segment(key)
    )
}

fn check_key(rc: &ResourceContainer, namespace_id: &str, key: &str) -> Result<()> {
    rc.require_account()?;
    require(namespace_id, Error::MissingResourceId("namespace id"))?;
    require(key, Error::MissingResourceId("key name"))
}

impl Client {
    /// The returned [`ResultInfo`] points one page past the last page served.
    pub async fn list_workers_kv_namespaces(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListWorkersKvNamespacesParams,
    ) -> Result<(Vec<WorkersKvNamespace>, ResultInfo)> {
        rc.require_account()?;
        self.list_pages(ctx, &namespaces_path(rc), params, 50).await
    }

    pub async fn create_workers_kv_namespace(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        title: &str,
    ) -> Result<WorkersKvNamespace> {
        rc.require_account()?;
        require(title, Error::MissingResourceId("namespace title"))?;
        self.post(ctx, namespaces_path(rc), &json!({ "title": title }))
            .await
    }

    pub async fn rename_workers_kv_namespace(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        namespace_id: &str,
        title: &str,
    ) -> Result<()> {
        rc.require_account()?;
        require(namespace_id, Error::MissingResourceId("namespace id"))?;
        let _: IgnoredAny = self
            .put(
                ctx,
                format!("{}/{}", namespaces_path(rc), namespace_id),
                &json!({ "title": title }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_workers_kv_namespace(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        namespace_id: &str,
    ) -> Result<()> {
        rc.require_account()?;
        require(namespace_id, Error::MissingResourceId("namespace id"))?;
        let _: IgnoredAny = self
            .delete(ctx, format!("{}/{}", namespaces_path(rc), namespace_id))
            .await?;
        Ok(())
    }

    /// List keys, following `result_info.cursor` until exhausted.
    pub async fn list_workers_kv_keys(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListWorkersKvKeysParams,
    ) -> Result<Vec<StorageKey>> {
        rc.require_account()?;
        require(&params.namespace_id, Error::MissingResourceId("namespace id"))?;
        let path = format!("{}/{}/keys", namespaces_path(rc), params.namespace_id);
        let (keys, _) = self.list_cursor(ctx, &path, params).await?;
        Ok(keys)
    }

    /// Read a value. The body is returned verbatim, not wrapped in an envelope.
    pub async fn read_workers_kv_value(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        namespace_id: &str,
        key: &str,
    ) -> Result<Vec<u8>> {
        check_key(rc, namespace_id, key)?;
        let response = self
            .send(
                ctx,
                Method::GET,
                value_path(rc, namespace_id, key),
                None,
                HeaderMap::new(),
            )
            .await?;
        Ok(response.body)
    }

    /// Write a value as raw bytes.
    pub async fn write_workers_kv_value(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        namespace_id: &str,
        key: &str,
        value: &[u8],
    ) -> Result<()> {
        check_key(rc, namespace_id, key)?;
        let response = self
            .send(
                ctx,
                Method::PUT,
                value_path(rc, namespace_id, key),
                Some(RequestBody::Bytes(value.to_vec())),
                headers(&[("content-type", "application/octet-stream")]),
            )
            .await?;
        let _: IgnoredAny = into_result(decode_envelope(&response)?)?;
        Ok(())
    }

    pub async fn write_workers_kv_entries(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        namespace_id: &str,
        entries: &[WorkersKvPair],
    ) -> Result<()> {
        rc.require_account()?;
        require(namespace_id, Error::MissingResourceId("namespace id"))?;
        let _: IgnoredAny = self
            .put(
                ctx,
                format!("{}/{}/bulk", namespaces_path(rc), namespace_id),
                entries,
            )
            .await?;
        Ok(())
    }

    pub async fn delete_workers_kv_value(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        namespace_id: &str,
        key: &str,
    ) -> Result<()> {
        check_key(rc, namespace_id, key)?;
        let _: IgnoredAny = self
            .delete(ctx, value_path(rc, namespace_id, key))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_percent_encoded_in_paths() {
        let rc = ResourceContainer::account("a");
        assert_eq!(
            value_path(&rc, "ns", "user/42 profile"),
            "/accounts/a/storage/kv/namespaces/ns/values/user%2F42%20profile"
        );
    }

    #[test]
    fn key_operations_check_all_identifiers() {
        let rc = ResourceContainer::account("a");
        assert!(matches!(
            check_key(&rc, "", "k"),
            Err(Error::MissingResourceId("namespace id"))
        ));
        assert!(matches!(
            check_key(&rc, "ns", ""),
            Err(Error::MissingResourceId("key name"))
        ));
        assert!(matches!(
            check_key(&ResourceContainer::zone("z"), "ns", "k"),
            Err(Error::UnsupportedContainer { .. })
        ));
    }

    #[test]
    fn bulk_pairs_skip_unset_fields() {
        let pair = WorkersKvPair {
            key: "k".into(),
            value: "v".into(),
            expiration_ttl: Some(60),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&pair).unwrap(),
            json!({"key": "k", "value": "v", "expiration_ttl": 60})
        );
    }
}
