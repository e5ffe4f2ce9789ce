//! API response types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Standard Cloudflare API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub errors: Vec<ResponseInfo>,
    #[serde(default, deserialize_with = "null_default")]
    pub messages: Vec<ResponseInfo>,
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

/// Error or informational message carried by the envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    #[serde(default, deserialize_with = "null_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,
}

/// Opaque cursors for cursor-paginated endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub before: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub after: String,
}

/// Pagination info
///
/// Page-based endpoints fill `page`, `per_page` and either `total_pages` or
/// `total_count`. Cursor-based endpoints fill `cursors` (or the flat `cursor`
/// used by Workers KV).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    #[serde(default, deserialize_with = "null_default")]
    pub page: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub per_page: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub count: u32,
    #[serde(default, deserialize_with = "null_default", rename = "total_count")]
    pub total: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub total_pages: u32,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub cursor: String,
    #[serde(default, deserialize_with = "null_default")]
    pub cursors: Cursors,
}

impl ResultInfo {
    /// Total page count, derived from `total_count / per_page` when the
    /// server only reports the item total.
    pub fn total_pages(&self) -> u32 {
        if self.total_pages == 0 && self.total > 0 && self.per_page > 0 {
            return self.total.div_ceil(self.per_page);
        }
        self.total_pages
    }

    /// True once every page has been served.
    ///
    /// A response without pagination metadata advances to page 1 with no
    /// page count and is treated as a single page.
    pub fn done(&self) -> bool {
        let total_pages = self.total_pages();
        (self.page == 1 && total_pages == 0) || self.page > total_pages
    }

    pub fn has_more_pages(&self) -> bool {
        let total_pages = self.total_pages();
        self.page >= 1 && self.page < total_pages
    }

    /// Cursor for the following page, empty once exhausted.
    pub fn next_cursor(&self) -> &str {
        if self.cursors.after.is_empty() {
            &self.cursor
        } else {
            &self.cursors.after
        }
    }

    /// Advance to the following page without fetching it. The page never
    /// moves more than one past the last page, which is what [`done`] reports.
    ///
    /// [`done`]: ResultInfo::done
    pub fn next(&self) -> ResultInfo {
        let mut next = self.clone();
        let total_pages = self.total_pages();

        if self.page == 1 && total_pages == 0 {
            return next;
        }
        if self.page > total_pages {
            return next;
        }

        next.page += 1;
        next
    }
}

/// `result` payload of a bulk mutation on a list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRef {
    pub operation_id: String,
}

/// Deserialize a `null` / absent result into `T` when `T` admits it
/// (`()` and `Option<_>`).
pub(crate) fn from_null<T: DeserializeOwned>() -> Option<T> {
    serde_json::from_value(serde_json::Value::Null).ok()
}

/// Decode an explicit `null` as `T::default()`, the same as a missing key.
/// Pair with `#[serde(default)]`.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(page: u32, per_page: u32, total_pages: u32, total: u32) -> ResultInfo {
        ResultInfo {
            page,
            per_page,
            total_pages,
            total,
            ..Default::default()
        }
    }

    #[test]
    fn total_pages_falls_back_to_total_count() {
        assert_eq!(info(1, 25, 0, 51).total_pages(), 3);
        assert_eq!(info(1, 25, 0, 50).total_pages(), 2);
        assert_eq!(info(1, 25, 4, 0).total_pages(), 4);
        assert_eq!(info(1, 0, 0, 10).total_pages(), 0);
    }

    #[test]
    fn both_totals_agree_when_present() {
        let ri = info(1, 25, 2, 50);
        assert_eq!(ri.total_pages(), 50u32.div_ceil(25));
    }

    #[test]
    fn missing_metadata_is_a_single_page() {
        let advanced = ResultInfo::default().next();
        assert_eq!(advanced.page, 1);
        assert!(advanced.done());
    }

    #[test]
    fn next_stops_one_past_the_last_page() {
        let last = info(3, 1, 3, 3);
        assert!(!last.done());
        let past = last.next();
        assert_eq!(past.page, 4);
        assert!(past.done());
        assert_eq!(past.next().page, 4);
    }

    #[test]
    fn more_pages_only_before_the_last() {
        assert!(info(1, 1, 3, 0).has_more_pages());
        assert!(info(2, 1, 3, 0).has_more_pages());
        assert!(!info(3, 1, 3, 0).has_more_pages());
        assert!(!info(0, 1, 3, 0).has_more_pages());
    }

    #[test]
    fn decodes_cursor_metadata() {
        let ri: ResultInfo =
            serde_json::from_str(r#"{"cursors":{"after":"yyy"},"count":1}"#).unwrap();
        assert_eq!(ri.cursors.after, "yyy");
        assert!(ri.cursors.before.is_empty());
        assert_eq!(ri.count, 1);
    }

    #[test]
    fn null_fields_decode_as_defaults() {
        let ri: ResultInfo = serde_json::from_str(
            r#"{"page":null,"per_page":50,"cursors":null,"cursor":null,"total_count":null}"#,
        )
        .unwrap();
        assert_eq!(ri.page, 0);
        assert_eq!(ri.per_page, 50);
        assert_eq!(ri.cursors, Cursors::default());
        assert!(ri.next_cursor().is_empty());

        let envelope: Envelope<()> = serde_json::from_str(
            r#"{"success":false,"errors":[{"code":1003,"message":"not found"}],"messages":null,"result":null}"#,
        )
        .unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.errors[0].code, 1003);
        assert!(envelope.messages.is_empty());
    }

    #[test]
    fn null_result_fits_unit_and_option() {
        assert_eq!(from_null::<()>(), Some(()));
        assert_eq!(from_null::<Option<String>>(), Some(None));
        assert!(from_null::<String>().is_none());
    }
}
