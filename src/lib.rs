//! cfapi - typed client for the Cloudflare REST API
//!
//! Requests are scoped to an account or a zone with a
//! [`ResourceContainer`], list calls paginate automatically, failures map to
//! a single [`Error`] taxonomy, and bulk list mutations can be awaited
//! synchronously. HTTP is pluggable through the [`Transport`] trait; the
//! default [`HttpTransport`] uses `reqwest`.
//!
//! ```no_run
//! use cfapi::{Client, Config, ResourceContainer};
//! use cfapi::resources::access_groups::ListAccessGroupsParams;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> cfapi::Result<()> {
//! let client = Client::from_config(&Config::load()?)?;
//! let ctx = CancellationToken::new();
//! let (groups, _info) = client
//!     .list_access_groups(&ctx, &ResourceContainer::account("023e105f4ecef8ad9ca31a8372d0c353"), ListAccessGroupsParams::default())
//!     .await?;
//! println!("{} groups", groups.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod resources;

pub use api::bulk::{BulkOperation, BulkPollSchedule};
pub use api::client::Client;
pub use api::container::{ResourceContainer, ResourceLevel};
pub use api::error::{ApiError, Error, ErrorKind, Result, TransportError};
pub use api::pagination::PaginationOptions;
pub use api::query::{build_uri, Query, QueryParams};
pub use api::response::{Cursors, Envelope, ResponseInfo, ResultInfo};
pub use api::transport::{
    HttpTransport, RequestBody, RetryPolicy, Transport, TransportRequest, TransportResponse,
};
pub use config::{Config, OutputFormat};
