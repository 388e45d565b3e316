//! HTTP invocation
//!
//! Sends resolved operations to the selected base endpoint. Every call is a
//! stateless, independent request/response cycle: single attempt, no retry,
//! no backoff. Failures are logged with the method name and propagated
//! unchanged to the caller.

use reqwest::header::HeaderValue;
use sb_common::{Method, Operation};
use sb_config::ToolkitConfig;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::dispatch::{resolve, DispatchDecision};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("modifier not expressible as header: {name}")]
    Header { name: &'static str },
}

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Authenticated API client
///
/// Holds the read-only configuration and a single reqwest client built with
/// the configured timeouts. Cheap to clone; concurrent invocations share no
/// mutable state.
#[derive(Clone)]
pub struct ApiClient {
    config: ToolkitConfig,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ToolkitConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.endpoints.connect_timeout())
            .timeout(config.endpoints.request_timeout())
            .build()?;

        Ok(Self { config, client })
    }

    /// Resolve an operation without sending it
    pub fn resolve(&self, operation: &Operation) -> DispatchDecision {
        resolve(operation, &self.config.credentials, &self.config.endpoints)
    }

    /// Dispatch one operation and return the response body
    pub async fn invoke(&self, operation: &Operation) -> Result<Value> {
        let decision = self.resolve(operation);
        let url = format!("{}{}", decision.base_url(&self.config.endpoints), operation.path);
        debug!(
            method = operation.method.as_str(),
            url = %url,
            fingerprint = %decision.fingerprint,
            "Dispatching operation"
        );

        let mut request = self.client.request(wire_method(operation.method), &url);

        for &(name, ref value) in &decision.headers {
            let value = HeaderValue::from_str(value)
                .map_err(|_| DispatchError::Header { name })?;
            request = request.header(name, value);
        }

        let query = query_params(operation);
        if !query.is_empty() {
            request = request.query(&query);
        }

        if operation.method.carries_body() {
            if let Some(body) = &operation.body {
                request = request.json(body);
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(method = operation.method.as_str(), error = %e, "Request failed");
                return Err(DispatchError::Transport(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                method = operation.method.as_str(),
                status = status.as_u16(),
                error = %body,
                "Request failed"
            );
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Convenience wrapper for raw SQL calls: rewrites the logical endpoint
    /// into a POST against `/sql-<endpoint>` before dispatch.
    pub async fn sql(
        &self,
        endpoint: &str,
        query: impl Into<String>,
        parameters: Vec<Value>,
    ) -> Result<Value> {
        self.invoke(&Operation::sql(endpoint, query, parameters)).await
    }
}

fn wire_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post | Method::Sql => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// `page`, `sort`, `search` pass through as query parameters; they never
/// participate in fingerprinting.
fn query_params(operation: &Operation) -> Vec<(&'static str, String)> {
    let modifiers = &operation.modifiers;
    let mut params = Vec::new();
    if let Some(page) = modifiers.page {
        params.push(("page", page.to_string()));
    }
    if let Some(sort) = &modifiers.sort {
        params.push(("sort", sort.clone()));
    }
    if let Some(search) = &modifiers.search {
        params.push(("search", search.clone()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_method_mapping() {
        assert_eq!(wire_method(Method::Get), reqwest::Method::GET);
        assert_eq!(wire_method(Method::Sql), reqwest::Method::POST);
        assert_eq!(wire_method(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_query_params_only_when_present() {
        let op = Operation::get("/users");
        assert!(query_params(&op).is_empty());

        let op = Operation::get("/users").with_page(2).with_sort("name");
        assert_eq!(
            query_params(&op),
            vec![("page", "2".to_string()), ("sort", "name".to_string())]
        );
    }
}
