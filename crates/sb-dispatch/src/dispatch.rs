//! Credential lookup and header assembly
//!
//! Resolves an operation against the credential table: a hit routes to the
//! primary endpoint with the stored token attached, a miss routes to the
//! fallback endpoint carrying the fingerprint itself so the fallback can
//! register a credential out-of-band.

use sb_common::Operation;
use sb_config::{CredentialTable, EndpointConfig};
use tracing::debug;

use crate::fingerprint::{fingerprint, json_str};

/// Which base endpoint a resolved call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Primary remote endpoint, credential resolved
    Primary,
    /// Local fallback endpoint, no credential
    Fallback,
}

/// Outcome of credential resolution for one operation
#[derive(Debug, Clone)]
pub struct DispatchDecision {
    pub fingerprint: String,
    pub route: Route,
    /// Header name/value pairs, assembled in a fixed order
    pub headers: Vec<(&'static str, String)>,
}

impl DispatchDecision {
    pub fn base_url<'a>(&self, endpoints: &'a EndpointConfig) -> &'a str {
        match self.route {
            Route::Primary => &endpoints.primary_url,
            Route::Fallback => &endpoints.fallback_url,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Resolve an operation into a routing decision and its header set.
/// Exactly one of `token` / `key` is attached, never both, never neither.
pub fn resolve(
    operation: &Operation,
    credentials: &CredentialTable,
    endpoints: &EndpointConfig,
) -> DispatchDecision {
    let fingerprint = fingerprint(operation);
    let mut headers: Vec<(&'static str, String)> = Vec::new();

    let route = match credentials.get(&fingerprint) {
        Some(token) => {
            debug!(fingerprint = %fingerprint, "Credential resolved, routing to primary");
            headers.push(("token", token.to_string()));
            Route::Primary
        }
        None => {
            debug!(fingerprint = %fingerprint, "No credential, routing to fallback");
            headers.push(("key", fingerprint.clone()));
            Route::Fallback
        }
    };

    let modifiers = &operation.modifiers;
    if let Some(fields) = modifiers.fields() {
        headers.push(("fields", json_str(&fields)));
    }
    if let Some(hidden) = modifiers.hidden() {
        headers.push(("hidden", json_str(&hidden)));
    }
    if let Some(filter) = modifiers.filter() {
        headers.push(("filter", json_str(filter)));
    }
    if let Some(session) = modifiers.session() {
        headers.push(("session", session.to_string()));
    }
    if let Some(joins) = modifiers.joins() {
        headers.push(("collections", json_str(&joins)));
    }
    if let Some(validation) = modifiers.validation() {
        headers.push(("validation", json_str(validation)));
    }
    if let Some(permissions) = modifiers.permissions() {
        headers.push(("permissions", json_str(&permissions)));
    }
    // nearby participates in the fingerprint but is not copied to headers

    headers.push(("appid", endpoints.app_id.clone()));

    DispatchDecision {
        fingerprint,
        route,
        headers,
    }
}
