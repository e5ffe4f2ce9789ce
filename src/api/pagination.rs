//! Automatic pagination for list endpoints
//!
//! Page-based listings are walked until [`ResultInfo::done`] unless the
//! caller pinned `page` or `per_page`, in which case exactly one page is
//! fetched. Cursor-based listings follow the `after` cursor until the server
//! stops returning one.

use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::client::Client;
use crate::api::error::Result;
use crate::api::query::{build_uri, Query, QueryParams};
use crate::api::response::{Envelope, ResultInfo};

/// Page selection embedded in list parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PaginationOptions {
    /// Request one specific page; disables automatic pagination.
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Walk every page only when the caller chose neither bound.
    pub fn is_auto(&self) -> bool {
        self.page.unwrap_or(0) < 1 && self.per_page.unwrap_or(0) < 1
    }
}

impl QueryParams for PaginationOptions {
    fn append_query(&self, query: &mut Query) {
        query.opt("page", self.page).opt("per_page", self.per_page);
    }
}

/// List parameters carrying page-based pagination
pub trait Paginated: QueryParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions;
}

impl Paginated for PaginationOptions {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        self
    }
}

/// List parameters carrying an opaque cursor
pub trait CursorPaginated: QueryParams {
    fn set_cursor(&mut self, cursor: String);
}

impl Client {
    /// Fetch a page-based listing, following pages until done.
    ///
    /// Returns the concatenated items and the pagination info advanced past
    /// the last page served.
    pub(crate) async fn list_pages<T, P>(
        &self,
        ctx: &CancellationToken,
        path: &str,
        mut params: P,
        default_per_page: u32,
    ) -> Result<(Vec<T>, ResultInfo)>
    where
        T: DeserializeOwned,
        P: Paginated,
    {
        let pagination = params.pagination_mut();
        let auto = pagination.is_auto();
        if pagination.per_page.unwrap_or(0) < 1 {
            pagination.per_page = Some(default_per_page);
        }
        if pagination.page.unwrap_or(0) < 1 {
            pagination.page = Some(1);
        }

        let mut items = Vec::new();
        loop {
            let requested = params.pagination_mut().page.unwrap_or(1);
            let uri = build_uri(path, &params);
            let envelope: Envelope<Vec<T>> = self.request(ctx, Method::GET, uri, None).await?;
            items.extend(envelope.result.unwrap_or_default());

            let next = envelope.result_info.unwrap_or_default().next();
            debug!(
                "{}: page {} served, {} items so far, {} pages total",
                path,
                requested,
                items.len(),
                next.total_pages()
            );

            // A server that does not move the page forward would otherwise
            // have us ask for the same page forever.
            let stalled = next.page <= requested;

            let pagination = params.pagination_mut();
            pagination.page = Some(next.page);
            if next.per_page > 0 {
                pagination.per_page = Some(next.per_page);
            }

            if next.done() || !auto || stalled {
                return Ok((items, next));
            }
        }
    }

    /// Fetch a cursor-based listing, following cursors until exhausted.
    pub(crate) async fn list_cursor<T, P>(
        &self,
        ctx: &CancellationToken,
        path: &str,
        mut params: P,
    ) -> Result<(Vec<T>, ResultInfo)>
    where
        T: DeserializeOwned,
        P: CursorPaginated,
    {
        let mut items = Vec::new();
        let mut previous = String::new();
        loop {
            let uri = build_uri(path, &params);
            let envelope: Envelope<Vec<T>> = self.request(ctx, Method::GET, uri, None).await?;
            items.extend(envelope.result.unwrap_or_default());

            let info = envelope.result_info.unwrap_or_default();
            let cursor = info.next_cursor().to_string();
            debug!("{}: {} items so far, next cursor {:?}", path, items.len(), cursor);

            if cursor.is_empty() || cursor == previous {
                return Ok((items, info));
            }
            params.set_cursor(cursor.clone());
            previous = cursor;
        }
    }
}
