use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// HTTP methods a data request can use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            HttpMethod::GET,
            HttpMethod::POST,
            HttpMethod::PUT,
            HttpMethod::DELETE,
            HttpMethod::OPTIONS,
        ]
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    /// GET and OPTIONS requests carry no body
    pub fn allows_body(&self) -> bool {
        !matches!(self, HttpMethod::GET | HttpMethod::OPTIONS)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthetic identity of a header row, stable for the draft's lifetime.
/// Never derived from the key/value, so blank or duplicated rows can still
/// be targeted by edits and removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderId(Uuid);

impl HeaderId {
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

/// One editable header row
#[derive(Debug, Clone)]
pub struct HeaderEntry {
    pub id: HeaderId,
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub(crate) fn blank() -> Self {
        Self {
            id: HeaderId::fresh(),
            key: String::new(),
            value: String::new(),
        }
    }

    pub(crate) fn with(key: &str, value: &str) -> Self {
        Self {
            id: HeaderId::fresh(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// The in-progress, not-yet-persisted request configuration
#[derive(Debug, Clone)]
pub struct RequestDraft {
    pub method: HttpMethod,
    pub route: String,
    pub use_global_headers: bool,
    pub headers: Vec<HeaderEntry>,
    pub body: Option<String>,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            method: HttpMethod::GET,
            route: String::new(),
            use_global_headers: true,
            // A fresh builder starts with one blank row ready to edit
            headers: vec![HeaderEntry::blank()],
            body: None,
        }
    }
}

impl RequestDraft {
    /// Seed a draft from a saved descriptor, converting its key→value header
    /// mapping into editable rows. Row order follows the mapping's iteration
    /// order; every row gets a fresh id.
    pub fn from_descriptor(descriptor: &RequestDescriptor) -> Self {
        let headers = descriptor
            .headers
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                HeaderEntry::with(key, &value)
            })
            .collect();

        Self {
            method: descriptor.method,
            route: descriptor.route.clone(),
            use_global_headers: descriptor.use_global_headers,
            headers,
            body: descriptor.body.clone(),
        }
    }

    /// Structural comparison for change-notification gating. Header ids are
    /// UI-local identity, not request data, so two drafts that differ only in
    /// ids compare equal here.
    pub fn same_request(&self, other: &RequestDraft) -> bool {
        self.method == other.method
            && self.route == other.route
            && self.use_global_headers == other.use_global_headers
            && self.body == other.body
            && self.headers.len() == other.headers.len()
            && self
                .headers
                .iter()
                .zip(&other.headers)
                .all(|(a, b)| a.key == b.key && a.value == b.value)
    }

    /// Collapse the header rows into the key→value mapping sent to the
    /// executor. Rows with a blank key or blank value are dropped.
    pub fn collapse_headers(&self) -> Map<String, Value> {
        let mut collapsed = Map::new();
        for entry in &self.headers {
            if !entry.key.is_empty() && !entry.value.is_empty() {
                collapsed.insert(entry.key.clone(), Value::String(entry.value.clone()));
            }
        }
        collapsed
    }

    /// Freeze the draft into the executor-facing form
    pub fn prepare(&self) -> PreparedRequest {
        PreparedRequest {
            method: self.method,
            route: self.route.clone(),
            use_global_headers: self.use_global_headers,
            headers: self.collapse_headers(),
            body: self.body.clone(),
        }
    }
}

/// A saved request as the backend stores and returns it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub route: String,
    pub use_global_headers: bool,
    pub headers: Map<String, Value>,
    pub body: Option<String>,
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self {
            method: HttpMethod::GET,
            route: String::new(),
            use_global_headers: true,
            headers: Map::new(),
            body: None,
        }
    }
}

/// Pagination settings owned by the host's pagination editor and passed
/// through to the executor untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationSettings {
    pub pagination: bool,
    pub items: String,
    pub offset: String,
    pub items_limit: i64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            pagination: false,
            items: "limit".to_string(),
            offset: "offset".to_string(),
            items_limit: 100,
        }
    }
}

/// Detail view tabs below the method/route bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewTab {
    #[default]
    Headers,
    Body,
    Pagination,
}

/// Status line of a completed test request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatus {
    pub status_code: u16,
    pub status_text: String,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code, self.status_text)
    }
}

/// Successful result returned by the executor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    pub status: ResponseStatus,
    pub body: Value,
}

/// Structured failure returned by the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFailure {
    pub status_code: u16,
    pub status_text: String,
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code, self.status_text)
    }
}

impl std::error::Error for TestFailure {}

/// The draft with its headers collapsed, ready for execution
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub route: String,
    pub use_global_headers: bool,
    pub headers: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Everything the executor needs to perform one test call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPayload {
    pub data_request: PreparedRequest,
    pub pagination: bool,
    pub items: String,
    pub offset: String,
    pub items_limit: i64,
}

impl TestPayload {
    pub fn new(draft: &RequestDraft, pagination: &PaginationSettings) -> Self {
        Self {
            data_request: draft.prepare(),
            pagination: pagination.pagination,
            items: pagination.items.clone(),
            offset: pagination.offset.clone(),
            items_limit: pagination.items_limit,
        }
    }
}
