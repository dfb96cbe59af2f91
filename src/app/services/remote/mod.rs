//! Boundary to the hosted record store.
//!
//! Requests are shaped as `{collection, filters?, sort?, limit?}` and come
//! back either as a list of JSON records or as a structured `RemoteError`.
//! `HttpStore` talks to the real service; `MemoryStore` keeps everything
//! in-process and backs the tests.

pub mod http;
pub mod memory;

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// One row of a collection.
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// A record without the field never matches.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field) else {
            return false;
        };
        let ord = compare_values(actual, &self.value);
        match self.op {
            FilterOp::Eq => ord == Some(Ordering::Equal),
            FilterOp::Neq => ord != Some(Ordering::Equal),
            FilterOp::Gt => ord == Some(Ordering::Greater),
            FilterOp::Gte => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => ord == Some(Ordering::Less),
            FilterOp::Lte => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// A read (or the row selector of an update) against one collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

/// Numbers compare numerically, strings lexicographically, booleans and
/// nulls only by equality. Mixed types are unordered.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    AlreadyExists,
    NotFound,
    Unauthorized,
    Transport,
    Malformed,
    Server,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AlreadyExists => "already exists",
            Self::NotFound => "not found",
            Self::Unauthorized => "unauthorized",
            Self::Transport => "transport",
            Self::Malformed => "malformed response",
            Self::Server => "server",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == RemoteErrorKind::AlreadyExists
    }
}

/// Request/response access to the hosted store.
///
/// Implementations must be shareable with the worker thread that performs
/// remote calls off the UI thread.
pub trait RemoteStore: Send + Sync {
    fn select(&self, query: &Query) -> Result<Vec<Record>, RemoteError>;

    /// Create one record. A uniqueness clash is reported as
    /// `RemoteErrorKind::AlreadyExists`; nothing is written in that case.
    fn insert(&self, collection: &str, record: Record) -> Result<Record, RemoteError>;

    /// Merge `patch` into every record selected by `query.filters`.
    fn update(&self, query: &Query, patch: Record) -> Result<Vec<Record>, RemoteError>;
}

pub fn to_record<T: Serialize>(value: &T) -> Result<Record, RemoteError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RemoteError::new(
            RemoteErrorKind::Malformed,
            format!("expected an object, got {other}"),
        )),
        Err(e) => Err(RemoteError::new(RemoteErrorKind::Malformed, e.to_string())),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, RemoteError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| RemoteError::new(RemoteErrorKind::Malformed, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_filter_ops() {
        let r = record(json!({"user_id": 42, "name": "ming"}));

        assert!(Query::new("t").where_eq("user_id", 42).matches(&r));
        assert!(!Query::new("t").where_eq("user_id", 41).matches(&r));
        assert!(Query::new("t").filter("user_id", FilterOp::Gte, 42).matches(&r));
        assert!(Query::new("t").filter("user_id", FilterOp::Lt, 50).matches(&r));
        assert!(Query::new("t").filter("name", FilterOp::Neq, "wing").matches(&r));
        assert!(!Query::new("t").filter("user_id", FilterOp::Gt, 42).matches(&r));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let r = record(json!({"user_id": 42}));
        assert!(!Query::new("t").where_eq("script", "mandarin").matches(&r));
        assert!(!Query::new("t").filter("script", FilterOp::Neq, "x").matches(&r));
    }

    #[test]
    fn test_integer_and_float_compare() {
        assert_eq!(compare_values(&json!(1), &json!(1.0)), Some(Ordering::Equal));
        assert_eq!(compare_values(&json!("a"), &json!(1)), None);
    }

    #[test]
    fn test_builder() {
        let q = Query::new("vocabulary")
            .where_eq("script", "cantonese")
            .order_by("id", SortDirection::Ascending)
            .limit(20);
        assert_eq!(q.collection, "vocabulary");
        assert_eq!(q.filters.len(), 1);
        assert_eq!(q.sort.as_ref().map(|s| s.direction), Some(SortDirection::Ascending));
        assert_eq!(q.limit, Some(20));
    }

    #[test]
    fn test_error_display() {
        let err = RemoteError::new(RemoteErrorKind::AlreadyExists, "user_id=42");
        assert_eq!(err.to_string(), "already exists: user_id=42");
        assert!(err.is_conflict());
    }

    #[test]
    fn test_to_record_rejects_scalars() {
        let err = to_record(&5).unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::Malformed);
    }
}
