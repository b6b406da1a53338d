//! Request context abstraction
//!
//! The binding engine reads everything it needs from a [`RequestContext`]:
//! path, mount point, raw query, path parameters, headers, cookies, form
//! attributes and body, plus a per-request data store where resolved context
//! values are kept. [`HttpRequest`] is an in-memory implementation used by
//! dispatch layers without their own request type, and by tests.

use crate::types::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Read access to an incoming request, plus its per-request data store.
pub trait RequestContext: Send + Sync {
    /// Identifier used to correlate log records of one request.
    fn request_id(&self) -> Option<RequestId> {
        None
    }

    /// Request path, including any matrix parameters, without the query.
    fn path(&self) -> &str;

    /// Prefix under which the routes are mounted, if any.
    fn mount_point(&self) -> Option<&str>;

    /// Full request URI as received.
    fn uri(&self) -> &str;

    /// Raw, undecoded query string without the leading `?`.
    fn query(&self) -> Option<&str>;

    fn path_param(&self, name: &str) -> Option<&str>;

    /// Header value. Names are case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;

    fn cookie(&self, name: &str) -> Option<&str>;

    fn form_attribute(&self, name: &str) -> Option<&str>;

    fn body_as_string(&self) -> Option<&str>;

    fn data(&self, key: &str) -> Option<&Value>;

    fn put_data(&mut self, key: &str, value: Value);
}

// =============================================================================
// Request Id
// =============================================================================

/// Time-ordered request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// In-memory Request
// =============================================================================

/// In-memory request built with a fluent builder.
///
/// # Example
/// ```rust,ignore
/// let request = HttpRequest::get("/api/interface/echo?name=world")
///     .with_mount_point("/api")
///     .with_header("Accept", "application/json");
/// assert_eq!(request.query(), Some("name=world"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    id: RequestId,
    method: HttpMethod,
    uri: String,
    path: String,
    query: Option<String>,
    mount_point: Option<String>,
    path_params: HashMap<String, String>,
    headers: Vec<(String, String)>,
    cookies: HashMap<String, String>,
    form: HashMap<String, String>,
    body: Option<String>,
    data: HashMap<String, Value>,
}

impl HttpRequest {
    /// Create a request. The URI is split into path and query at the first `?`.
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri.clone(), None),
        };

        Self {
            id: RequestId::new(),
            method,
            uri,
            path,
            query,
            mount_point: None,
            path_params: HashMap::new(),
            headers: Vec::new(),
            cookies: HashMap::new(),
            form: HashMap::new(),
            body: None,
            data: HashMap::new(),
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, uri)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use = "This method returns a new HttpRequest and does not modify self"]
    pub fn with_mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = Some(mount_point.into());
        self
    }

    #[must_use = "This method returns a new HttpRequest and does not modify self"]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    #[must_use = "This method returns a new HttpRequest and does not modify self"]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use = "This method returns a new HttpRequest and does not modify self"]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    #[must_use = "This method returns a new HttpRequest and does not modify self"]
    pub fn with_form_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    #[must_use = "This method returns a new HttpRequest and does not modify self"]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use = "This method returns a new HttpRequest and does not modify self"]
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

impl RequestContext for HttpRequest {
    fn request_id(&self) -> Option<RequestId> {
        Some(self.id)
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn mount_point(&self) -> Option<&str> {
        self.mount_point.as_deref()
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn form_attribute(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    fn body_as_string(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn put_data(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }
}
