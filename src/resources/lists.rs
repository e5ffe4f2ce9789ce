//! Lists: reusable collections of IPs, redirects, hostnames or ASNs
//!
//! Item mutations are asynchronous on the server. The `*_async` calls return
//! the bulk operation id; the plain calls wait for the operation to finish
//! and then return the list's current items.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::IgnoredAny;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::api::bulk::{wait_for_operation, BulkOperation};
use crate::api::client::{into_result, json_body, Client};
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{CursorPaginated, Paginated, PaginationOptions};
use crate::api::polymorphic::{decode_variant, first_populated};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, OperationRef, ResultInfo};
use crate::resources::require;

/// Kind of values a list holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ip,
    Redirect,
    Hostname,
    Asn,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Ip => "ip",
            ListKind::Redirect => "redirect",
            ListKind::Hostname => "hostname",
            ListKind::Asn => "asn",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    pub kind: ListKind,
    #[serde(default, deserialize_with = "null_default")]
    pub num_items: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub num_referencing_filters: u32,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub source_url: String,
    pub target_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_subdomains: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_query_string: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath_matching: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_path_suffix: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hostname {
    pub url_hostname: String,
}

/// Value of a list item. Serializes as a single-entry map keyed by the
/// list kind (`{"ip": "10.0.0.1"}`, `{"asn": 13335}`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItemValue {
    Ip(String),
    Redirect(Redirect),
    Hostname(Hostname),
    Asn(u32),
}

impl ListItemValue {
    pub fn kind(&self) -> ListKind {
        match self {
            ListItemValue::Ip(_) => ListKind::Ip,
            ListItemValue::Redirect(_) => ListKind::Redirect,
            ListItemValue::Hostname(_) => ListKind::Hostname,
            ListItemValue::Asn(_) => ListKind::Asn,
        }
    }
}

impl Serialize for ListItemValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            ListItemValue::Ip(ip) => map.serialize_entry("ip", ip)?,
            ListItemValue::Redirect(redirect) => map.serialize_entry("redirect", redirect)?,
            ListItemValue::Hostname(hostname) => map.serialize_entry("hostname", hostname)?,
            ListItemValue::Asn(asn) => map.serialize_entry("asn", asn)?,
        }
        map.end()
    }
}

const ITEM_KINDS: [&str; 4] = ["ip", "redirect", "hostname", "asn"];

/// Entry of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(flatten)]
    pub value: ListItemValue,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ListItemMeta {
    #[serde(default, deserialize_with = "null_default")]
    id: String,
    #[serde(default, deserialize_with = "null_default")]
    comment: String,
    #[serde(default)]
    created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    modified_on: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for ListItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        let Value::Object(mut map) = Value::deserialize(deserializer)? else {
            return Err(D::Error::custom("invalid list item: expected an object"));
        };

        let kind = first_populated(&map, &ITEM_KINDS)
            .ok_or_else(|| D::Error::custom("invalid list item kind"))?;
        let raw = map.remove(kind).unwrap_or(Value::Null);
        let value = match kind {
            "ip" => ListItemValue::Ip(serde_json::from_value(raw).map_err(D::Error::custom)?),
            "redirect" => {
                ListItemValue::Redirect(serde_json::from_value(raw).map_err(D::Error::custom)?)
            }
            "hostname" => {
                ListItemValue::Hostname(serde_json::from_value(raw).map_err(D::Error::custom)?)
            }
            _ => ListItemValue::Asn(serde_json::from_value(raw).map_err(D::Error::custom)?),
        };

        let meta = decode_variant::<ListItemMeta, D::Error>(map)?;
        Ok(ListItem {
            id: meta.id,
            value,
            comment: meta.comment,
            created_on: meta.created_on,
            modified_on: meta.modified_on,
        })
    }
}

/// Item to add to a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewListItem {
    #[serde(flatten)]
    pub value: ListItemValue,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl NewListItem {
    pub fn new(value: ListItemValue) -> Self {
        Self {
            value,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateListParams {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub kind: ListKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateListParams {
    #[serde(skip)]
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListListsParams {
    pub pagination: PaginationOptions,
}

impl QueryParams for ListListsParams {
    fn append_query(&self, query: &mut Query) {
        query.extend(&self.pagination);
    }
}

impl Paginated for ListListsParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListListItemsParams {
    pub list_id: String,
    pub search: Option<String>,
    pub per_page: Option<u32>,
    pub cursor: Option<String>,
}

impl ListListItemsParams {
    pub fn new(list_id: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            ..Default::default()
        }
    }
}

impl QueryParams for ListListItemsParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("search", self.search.as_ref())
            .opt("per_page", self.per_page)
            .opt("cursor", self.cursor.as_ref());
    }
}

impl CursorPaginated for ListListItemsParams {
    fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }
}

fn lists_path(rc: &ResourceContainer) -> String {
    format!("{}/rules/lists", rc.path())
}

fn items_path(rc: &ResourceContainer, list_id: &str) -> String {
    format!("{}/rules/lists/{}/items", rc.path(), list_id)
}

impl Client {
    /// The returned [`ResultInfo`] is already advanced past the last page
    /// served: an explicit `page(2, 10)` comes back with `page == 3`.
    pub async fn list_lists(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListListsParams,
    ) -> Result<(Vec<List>, ResultInfo)> {
        rc.require_account()?;
        self.list_pages(ctx, &lists_path(rc), params, 25).await
    }

    pub async fn create_list(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &CreateListParams,
    ) -> Result<List> {
        rc.require_account()?;
        require(&params.name, Error::MissingResourceId("list name"))?;
        self.post(ctx, lists_path(rc), params).await
    }

    pub async fn get_list(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
    ) -> Result<List> {
        rc.require_account()?;
        require(list_id, Error::MissingListId)?;
        self.get(ctx, format!("{}/{}", lists_path(rc), list_id))
            .await
    }

    pub async fn update_list(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &UpdateListParams,
    ) -> Result<List> {
        rc.require_account()?;
        require(&params.id, Error::MissingListId)?;
        self.put(ctx, format!("{}/{}", lists_path(rc), params.id), params)
            .await
    }

    pub async fn delete_list(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
    ) -> Result<()> {
        rc.require_account()?;
        require(list_id, Error::MissingListId)?;
        let _: IgnoredAny = self
            .delete(ctx, format!("{}/{}", lists_path(rc), list_id))
            .await?;
        Ok(())
    }

    /// List every item of a list, following cursors.
    pub async fn list_list_items(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListListItemsParams,
    ) -> Result<Vec<ListItem>> {
        rc.require_account()?;
        require(&params.list_id, Error::MissingListId)?;
        let path = items_path(rc, &params.list_id);
        let (items, _) = self.list_cursor(ctx, &path, params).await?;
        Ok(items)
    }

    pub async fn get_list_item(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        item_id: &str,
    ) -> Result<ListItem> {
        rc.require_account()?;
        require(list_id, Error::MissingListId)?;
        require(item_id, Error::MissingResourceId("item id"))?;
        self.get(ctx, format!("{}/{}", items_path(rc, list_id), item_id))
            .await
    }

    /// Append items; returns the bulk operation id.
    pub async fn create_list_items_async(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        items: &[NewListItem],
    ) -> Result<String> {
        rc.require_account()?;
        require(list_id, Error::MissingListId)?;
        let op: OperationRef = self.post(ctx, items_path(rc, list_id), items).await?;
        Ok(op.operation_id)
    }

    /// Replace all items; returns the bulk operation id.
    pub async fn replace_list_items_async(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        items: &[NewListItem],
    ) -> Result<String> {
        rc.require_account()?;
        require(list_id, Error::MissingListId)?;
        let op: OperationRef = self.put(ctx, items_path(rc, list_id), items).await?;
        Ok(op.operation_id)
    }

    /// Remove items by id; returns the bulk operation id.
    pub async fn delete_list_items_async(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        item_ids: &[String],
    ) -> Result<String> {
        rc.require_account()?;
        require(list_id, Error::MissingListId)?;
        let body = json!({
            "items": item_ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>()
        });
        let envelope = self
            .request(ctx, Method::DELETE, items_path(rc, list_id), Some(json_body(&body)?))
            .await?;
        let op: OperationRef = into_result(envelope)?;
        Ok(op.operation_id)
    }

    pub async fn get_list_bulk_operation(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        operation_id: &str,
    ) -> Result<BulkOperation> {
        rc.require_account()?;
        require(operation_id, Error::MissingResourceId("operation id"))?;
        self.get(
            ctx,
            format!("{}/bulk_operations/{}", lists_path(rc), operation_id),
        )
        .await
    }

    /// Wait until a bulk operation completes, fails or runs out of retries.
    pub async fn poll_list_bulk_operation(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        operation_id: &str,
    ) -> Result<BulkOperation> {
        rc.require_account()?;
        require(operation_id, Error::MissingResourceId("operation id"))?;
        wait_for_operation(ctx, self.bulk_schedule, move || {
            self.get_list_bulk_operation(ctx, rc, operation_id)
        })
        .await
    }

    /// Append items and return the list's items once the operation is done.
    pub async fn create_list_items(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        items: &[NewListItem],
    ) -> Result<Vec<ListItem>> {
        let operation_id = self.create_list_items_async(ctx, rc, list_id, items).await?;
        self.poll_list_bulk_operation(ctx, rc, &operation_id).await?;
        self.list_list_items(ctx, rc, ListListItemsParams::new(list_id))
            .await
    }

    pub async fn create_list_item(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        item: NewListItem,
    ) -> Result<Vec<ListItem>> {
        self.create_list_items(ctx, rc, list_id, &[item]).await
    }

    /// Replace all items and return the resulting items.
    pub async fn replace_list_items(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        items: &[NewListItem],
    ) -> Result<Vec<ListItem>> {
        let operation_id = self
            .replace_list_items_async(ctx, rc, list_id, items)
            .await?;
        self.poll_list_bulk_operation(ctx, rc, &operation_id).await?;
        self.list_list_items(ctx, rc, ListListItemsParams::new(list_id))
            .await
    }

    /// Remove items and return what is left.
    pub async fn delete_list_items(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        list_id: &str,
        item_ids: &[String],
    ) -> Result<Vec<ListItem>> {
        let operation_id = self
            .delete_list_items_async(ctx, rc, list_id, item_ids)
            .await?;
        self.poll_list_bulk_operation(ctx, rc, &operation_id).await?;
        self.list_list_items(ctx, rc, ListListItemsParams::new(list_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(value: ListItemValue) -> ListItem {
        ListItem {
            id: "2c0fc9fa937b11eaa1b71c4d701ab86e".into(),
            value,
            comment: "Private IP address".into(),
            created_on: Some("2020-01-01T08:00:00Z".parse().unwrap()),
            modified_on: None,
        }
    }

    #[test]
    fn populated_field_selects_the_variant() {
        let ip: ListItem = serde_json::from_value(json!({
            "id": "2c0fc9fa937b11eaa1b71c4d701ab86e",
            "ip": "10.0.0.1",
            "comment": "Private IP address",
            "created_on": "2020-01-01T08:00:00Z",
            "modified_on": "2020-01-10T14:00:00Z"
        }))
        .unwrap();
        assert_eq!(ip.value, ListItemValue::Ip("10.0.0.1".into()));
        assert_eq!(ip.value.kind(), ListKind::Ip);

        let redirect: ListItem = serde_json::from_value(json!({
            "id": "r1",
            "ip": null,
            "redirect": {
                "source_url": "www.example.com/",
                "target_url": "https://example.com",
                "status_code": 301
            }
        }))
        .unwrap();
        assert_eq!(redirect.value.kind(), ListKind::Redirect);

        let hostname: ListItem = serde_json::from_value(json!({
            "id": "h1", "hostname": {"url_hostname": "cloudflare.com"}
        }))
        .unwrap();
        assert_eq!(
            hostname.value,
            ListItemValue::Hostname(Hostname {
                url_hostname: "cloudflare.com".into()
            })
        );

        let asn: ListItem = serde_json::from_value(json!({"id": "a1", "asn": 3456})).unwrap();
        assert_eq!(asn.value, ListItemValue::Asn(3456));
    }

    #[test]
    fn item_without_a_value_is_rejected() {
        let err = serde_json::from_value::<ListItem>(json!({"id": "x", "comment": "c"}))
            .unwrap_err();
        assert!(err.to_string().contains("invalid list item kind"));
    }

    #[test]
    fn encodes_exactly_one_value_field() {
        let value = serde_json::to_value(NewListItem::new(ListItemValue::Asn(13335))).unwrap();
        assert_eq!(value, json!({"asn": 13335}));

        let value = serde_json::to_value(
            NewListItem::new(ListItemValue::Ip("192.0.2.0/24".into())).with_comment("docs"),
        )
        .unwrap();
        assert_eq!(value, json!({"ip": "192.0.2.0/24", "comment": "docs"}));
    }

    #[test]
    fn items_round_trip() {
        for value in [
            ListItemValue::Ip("10.0.0.1".into()),
            ListItemValue::Redirect(Redirect {
                source_url: "example.com/a".into(),
                target_url: "https://example.com/b".into(),
                include_subdomains: Some(true),
                status_code: Some(302),
                ..Default::default()
            }),
            ListItemValue::Hostname(Hostname {
                url_hostname: "example.com".into(),
            }),
            ListItemValue::Asn(64512),
        ] {
            let original = item(value);
            let encoded = serde_json::to_value(&original).unwrap();
            let decoded: ListItem = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn items_query_uses_cursor() {
        let mut params = ListListItemsParams::new("l1");
        params.search = Some("10.".into());
        params.set_cursor("yyy".into());
        assert_eq!(
            crate::api::query::build_uri("/accounts/a/rules/lists/l1/items", &params),
            "/accounts/a/rules/lists/l1/items?search=10.&cursor=yyy"
        );
    }

    #[test]
    fn decodes_list() {
        let list: List = serde_json::from_value(json!({
            "id": "2c0fc9fa937b11eaa1b71c4d701ab86e",
            "name": "list1",
            "description": "This is a note",
            "kind": "hostname",
            "num_items": 10,
            "num_referencing_filters": 2,
            "created_on": "2020-01-01T08:00:00Z",
            "modified_on": "2020-01-10T14:00:00Z"
        }))
        .unwrap();
        assert_eq!(list.kind, ListKind::Hostname);
        assert_eq!(list.kind.to_string(), "hostname");
    }

    #[test]
    fn null_description_and_comment_decode_as_empty() {
        let list: List = serde_json::from_value(json!({
            "id": "2c0fc9fa937b11eaa1b71c4d701ab86e",
            "name": "list1",
            "description": null,
            "kind": "ip",
            "num_items": null
        }))
        .unwrap();
        assert_eq!(list.description, "");
        assert_eq!(list.num_items, 0);

        let item: ListItem =
            serde_json::from_value(json!({"id": "x", "ip": "10.0.0.1", "comment": null})).unwrap();
        assert_eq!(item.comment, "");
        assert_eq!(item.value, ListItemValue::Ip("10.0.0.1".into()));
    }
}
