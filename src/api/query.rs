//! URI construction from a base path and typed query parameters
//!
//! Parameter structs describe their own encoding by implementing
//! [`QueryParams`]. Keys are emitted in the order the implementation appends
//! them (declaration order by convention), absent values are skipped, and list
//! values expand to repeated keys.

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use url::form_urlencoded;

/// Typed parameters that render into a query string
pub trait QueryParams {
    fn append_query(&self, query: &mut Query);
}

impl QueryParams for () {
    fn append_query(&self, _query: &mut Query) {}
}

impl<P: QueryParams + ?Sized> QueryParams for &P {
    fn append_query(&self, query: &mut Query) {
        (**self).append_query(query)
    }
}

/// Ordered, percent-encoded query string under construction
#[derive(Debug, Default, Clone)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value unconditionally.
    pub fn push(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a value when present.
    pub fn opt<V: Display>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append a string unless it is empty.
    pub fn str(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.push(key, value);
        }
        self
    }

    /// Append a number unless it is zero.
    pub fn nonzero(&mut self, key: &str, value: u32) -> &mut Self {
        if value != 0 {
            self.push(key, value);
        }
        self
    }

    /// Append one `key=value` pair per element.
    pub fn list<I, V>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        for value in values {
            self.push(key, value);
        }
        self
    }

    /// Append a timestamp as RFC 3339 in UTC when present.
    pub fn time(&mut self, key: &str, value: Option<&DateTime<Utc>>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        self
    }

    /// Append any nested parameter set.
    pub fn extend(&mut self, params: &impl QueryParams) -> &mut Self {
        params.append_query(self);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode as `k1=v1&k2=v2`.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Render `path` followed by the encoded parameters, if any.
pub fn build_uri(path: &str, params: &impl QueryParams) -> String {
    let mut query = Query::new();
    params.append_query(&mut query);

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.encode())
    }
}
