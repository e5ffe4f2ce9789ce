//! D1 databases (account level only)

use chrono::{DateTime, Utc};
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
pub struct D1Database {
    #[serde(default, deserialize_with = "null_default")]
    pub uuid: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_default")]
    pub num_tables: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub file_size: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListD1DatabasesParams {
    pub name: Option<String>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListD1DatabasesParams {
    fn append_query(&self, query: &mut Query) {
        query.opt("name", self.name.as_ref()).extend(&self.pagination);
    }
}

impl Paginated for ListD1DatabasesParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateD1DatabaseParams {
    pub name: String,
    /// Location hint such as `weur` or `enam`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_location_hint: Option<String>,
}

/// SQL statement with positional parameters
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryD1DatabaseParams {
    pub sql: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct D1QueryMeta {
    #[serde(default, deserialize_with = "null_default")]
    pub changed_db: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub changes: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub duration: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub last_row_id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub rows_read: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub rows_written: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub size_after: u64,
}

/// Outcome of one statement; rows keep their column names
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct D1QueryResult {
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub results: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "null_default")]
    pub meta: D1QueryMeta,
}

fn databases_path(rc: &ResourceContainer) -> String {
    format!("{}/d1/database", rc.path())
}

fn database_path(rc: &ResourceContainer, database_id: &str) -> Result<String> {
    rc.require_account()?;
    require(database_id, Error::MissingDatabaseId)?;
    Ok(format!("{}/{}", databases_path(rc), database_id))
}

impl Client {
    /// Pagination info in the result is advanced past the page served.
    pub async fn list_d1_databases(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListD1DatabasesParams,
    ) -> Result<(Vec<D1Database>, ResultInfo)> {
        rc.require_account()?;
        self.list_pages(ctx, &databases_path(rc), params, 100).await
    }

    pub async fn get_d1_database(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        database_id: &str,
    ) -> Result<D1Database> {
        let path = database_path(rc, database_id)?;
        self.get(ctx, path).await
    }

    pub async fn create_d1_database(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: &CreateD1DatabaseParams,
    ) -> Result<D1Database> {
        rc.require_account()?;
        require(&params.name, Error::MissingResourceId("database name"))?;
        self.post(ctx, databases_path(rc), params).await
    }

    pub async fn delete_d1_database(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        database_id: &str,
    ) -> Result<()> {
        let path = database_path(rc, database_id)?;
        let _: IgnoredAny = self.delete(ctx, path).await?;
        Ok(())
    }

    /// Run SQL against a database. One result is returned per statement.
    pub async fn query_d1_database(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        database_id: &str,
        params: &QueryD1DatabaseParams,
    ) -> Result<Vec<D1QueryResult>> {
        let path = database_path(rc, database_id)?;
        self.post(ctx, format!("{}/query", path), params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn database_id_is_required() {
        assert!(matches!(
            database_path(&ResourceContainer::account("a"), ""),
            Err(Error::MissingDatabaseId)
        ));
        assert!(matches!(
            database_path(&ResourceContainer::zone("z"), "db"),
            Err(Error::UnsupportedContainer { .. })
        ));
    }

    #[test]
    fn decodes_query_rows() {
        let results: Vec<D1QueryResult> = serde_json::from_value(json!([{
            "success": true,
            "results": [{"id": 1, "name": "alpha"}, {"id": 2, "name": "beta"}],
            "meta": {"changed_db": false, "changes": 0, "duration": 0.21, "rows_read": 2}
        }]))
        .unwrap();
        assert_eq!(results[0].results.len(), 2);
        assert_eq!(results[0].results[1]["name"], "beta");
        assert_eq!(results[0].meta.rows_read, 2);
    }

    #[test]
    fn query_body_omits_empty_params() {
        let body = QueryD1DatabaseParams {
            sql: "SELECT 1".into(),
            params: vec![],
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"sql": "SELECT 1"}));
    }
}
