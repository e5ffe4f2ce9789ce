//! Typed resource operations
//!
//! Each module adds `impl Client` blocks for one family of endpoints. They all
//! follow the same shape: check the container and identifiers, build the
//! path, issue the call and decode the result.

pub mod access_applications;
pub mod access_groups;
pub mod access_policies;
pub mod access_users;
pub mod account_members;
pub mod audit_logs;
pub mod d1;
pub mod email_routing;
pub mod hostname_tls;
pub mod intelligence;
pub mod lists;
pub mod pages_domains;
pub mod workers_domains;
pub mod workers_kv;
pub mod zone_lockdowns;

use crate::api::error::{Error, Result};

/// Reject an empty identifier with `error`.
pub(crate) fn require(value: &str, error: Error) -> Result<()> {
    if value.is_empty() {
        return Err(error);
    }
    Ok(())
}

/// Percent-encode a value used as a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
