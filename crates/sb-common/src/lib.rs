use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Core Operation Types
// ============================================================================

/// Logical method of an API operation. `Sql` travels as POST on the wire but
/// keeps its own identity for fingerprinting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Sql,
}

impl Method {
    /// Lowercase name used in fingerprints
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Sql => "sql",
        }
    }

    /// HTTP verb sent on the wire
    pub fn http_method(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post | Method::Sql => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// GET and DELETE carry no request body
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Sql)
    }
}

/// Geo-proximity modifier. Participates in fingerprinting but is never
/// copied into request headers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nearby {
    pub lat: f64,
    pub lng: f64,
    /// Search radius in meters
    pub radius: u32,
}

/// Request body for an operation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Body {
    /// Raw SQL request: `{"query": ..., "parameters": [...]}`
    Sql {
        query: String,
        parameters: Vec<Value>,
    },
    /// Plain JSON payload (object or array)
    Json(Value),
}

impl Body {
    /// Whether the payload is array-shaped; feeds the fingerprint input
    pub fn is_array(&self) -> bool {
        matches!(self, Body::Json(Value::Array(_)))
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// Optional shape modifiers of an operation. One typed field per modifier;
/// an empty collection counts as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Modifiers {
    pub fields: Option<Vec<String>>,
    pub hidden: Option<Vec<String>>,
    pub filter: Option<Map<String, Value>>,
    /// Surfaces as the `collections` header on the wire
    pub joins: Option<Vec<String>>,
    pub permissions: Option<Vec<String>>,
    pub validation: Option<Map<String, Value>>,
    pub nearby: Option<Nearby>,
    pub session: Option<String>,
    pub page: Option<u32>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

impl Modifiers {
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref().filter(|v| !v.is_empty())
    }

    pub fn hidden(&self) -> Option<&[String]> {
        self.hidden.as_deref().filter(|v| !v.is_empty())
    }

    pub fn filter(&self) -> Option<&Map<String, Value>> {
        self.filter.as_ref().filter(|m| !m.is_empty())
    }

    pub fn joins(&self) -> Option<&[String]> {
        self.joins.as_deref().filter(|v| !v.is_empty())
    }

    pub fn permissions(&self) -> Option<&[String]> {
        self.permissions.as_deref().filter(|v| !v.is_empty())
    }

    pub fn validation(&self) -> Option<&Map<String, Value>> {
        self.validation.as_ref().filter(|m| !m.is_empty())
    }

    pub fn nearby(&self) -> Option<&Nearby> {
        self.nearby.as_ref()
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref().filter(|s| !s.is_empty())
    }
}

// ============================================================================
// Operation
// ============================================================================

/// One logical API call prior to dispatch. Immutable once constructed;
/// lives only for the duration of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    pub modifiers: Modifiers,
    pub body: Option<Body>,
}

impl Operation {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            modifiers: Modifiers::default(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(Body::Json(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(Body::Json(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Raw SQL operation. The path is synthesized as `/sql-<endpoint>` with
    /// any leading slash on the endpoint stripped, so fingerprinting always
    /// sees the rewritten path.
    pub fn sql(endpoint: &str, query: impl Into<String>, parameters: Vec<Value>) -> Self {
        let path = format!("/sql-{}", endpoint.trim_start_matches('/'));
        Self::new(Method::Sql, path).with_body(Body::Sql {
            query: query.into(),
            parameters,
        })
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.modifiers.fields = Some(fields);
        self
    }

    pub fn with_hidden(mut self, hidden: Vec<String>) -> Self {
        self.modifiers.hidden = Some(hidden);
        self
    }

    pub fn with_filter(mut self, filter: Map<String, Value>) -> Self {
        self.modifiers.filter = Some(filter);
        self
    }

    pub fn with_joins(mut self, joins: Vec<String>) -> Self {
        self.modifiers.joins = Some(joins);
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.modifiers.permissions = Some(permissions);
        self
    }

    pub fn with_validation(mut self, validation: Map<String, Value>) -> Self {
        self.modifiers.validation = Some(validation);
        self
    }

    pub fn with_nearby(mut self, nearby: Nearby) -> Self {
        self.modifiers.nearby = Some(nearby);
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.modifiers.session = Some(session.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.modifiers.page = Some(page);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.modifiers.sort = Some(sort.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.modifiers.search = Some(search.into());
        self
    }

    pub fn body_is_array(&self) -> bool {
        self.body.as_ref().map(Body::is_array).unwrap_or(false)
    }

    pub fn first_path_segment(&self) -> &str {
        first_path_segment(&self.path)
    }
}

/// Substring of `path` up to, but not including, the second `/`.
/// Paths with fewer than two slashes are returned whole; an empty path
/// yields an empty segment.
pub fn first_path_segment(path: &str) -> &str {
    let mut slashes = 0;
    for (i, b) in path.bytes().enumerate() {
        if b == b'/' {
            slashes += 1;
            if slashes == 2 {
                return &path[..i];
            }
        }
    }
    path
}
