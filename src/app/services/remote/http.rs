use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Query, Record, RemoteError, RemoteErrorKind, RemoteStore, SortDirection};
use crate::app::infrastructure::config::RemoteConfig;

/// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST-style HTTP client for the hosted store.
///
/// Calls block; run them off the UI thread.
pub struct HttpStore {
    config: RemoteConfig,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpStore {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, collection)
    }

    fn authorize(&self, request: minreq::Request) -> minreq::Request {
        request
            .with_header("apikey", self.config.api_key.as_str())
            .with_header("Authorization", format!("Bearer {}", self.config.api_key))
            .with_header("Accept", "application/json")
            .with_timeout(self.config.timeout.as_secs())
    }

    fn with_query(request: minreq::Request, query: &Query) -> minreq::Request {
        query_params(query)
            .into_iter()
            .fold(request, |req, (key, value)| req.with_param(key, value))
    }

    fn send(request: minreq::Request) -> Result<Vec<Record>, RemoteError> {
        let response = request
            .send()
            .map_err(|e| RemoteError::new(RemoteErrorKind::Transport, e.to_string()))?;

        let body = response.as_str().unwrap_or_default();
        if !(200..300).contains(&response.status_code) {
            return Err(classify_failure(response.status_code, body));
        }
        parse_records(body)
    }
}

impl RemoteStore for HttpStore {
    fn select(&self, query: &Query) -> Result<Vec<Record>, RemoteError> {
        debug!(collection = %query.collection, filters = query.filters.len(), "select");
        let request = self.authorize(minreq::get(self.endpoint(&query.collection)));
        Self::send(Self::with_query(request, query))
    }

    fn insert(&self, collection: &str, record: Record) -> Result<Record, RemoteError> {
        debug!(collection, "insert");
        let request = self
            .authorize(minreq::post(self.endpoint(collection)))
            .with_header("Prefer", "return=representation")
            .with_json(&record)
            .map_err(|e| RemoteError::new(RemoteErrorKind::Malformed, e.to_string()))?;

        Self::send(request)?.into_iter().next().ok_or_else(|| {
            RemoteError::new(RemoteErrorKind::Malformed, "insert returned no record")
        })
    }

    fn update(&self, query: &Query, patch: Record) -> Result<Vec<Record>, RemoteError> {
        debug!(collection = %query.collection, "update");
        let request = self
            .authorize(minreq::patch(self.endpoint(&query.collection)))
            .with_header("Prefer", "return=representation")
            .with_json(&patch)
            .map_err(|e| RemoteError::new(RemoteErrorKind::Malformed, e.to_string()))?;
        Self::send(Self::with_query(request, query))
    }
}

/// Query-string pairs: `field=op.value`, `order=field.dir`, `limit=n`.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = query
        .filters
        .iter()
        .map(|f| (f.field.clone(), format!("{}.{}", f.op.as_str(), filter_value(&f.value))))
        .collect();

    if let Some(sort) = &query.sort {
        let dir = match sort.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        params.push(("order".to_string(), format!("{}.{}", sort.field, dir)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_records(body: &str) -> Result<Vec<Record>, RemoteError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body)
        .map_err(|e| RemoteError::new(RemoteErrorKind::Malformed, format!("bad record list: {e}")))
}

pub fn classify_failure(status: i32, body: &str) -> RemoteError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.as_deref());
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));

    let kind = match (status, code) {
        (_, Some(UNIQUE_VIOLATION)) | (409, _) => RemoteErrorKind::AlreadyExists,
        (401 | 403, _) => RemoteErrorKind::Unauthorized,
        (404, _) => RemoteErrorKind::NotFound,
        _ => RemoteErrorKind::Server,
    };
    RemoteError::new(kind, message)
}
