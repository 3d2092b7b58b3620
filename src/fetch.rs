//! Fetch proxy.
//!
//! Page scripts cannot make cross-origin requests; the bridge makes them on
//! their behalf and relays the parsed JSON body. Every field of the request
//! comes from the untrusted page and is validated before any I/O.
//!
//! # Outcome Format
//!
//! Success:
//! ```json
//! { "success": true, "data": { ... }, "status": 200 }
//! ```
//!
//! Failure:
//! ```json
//! { "success": false, "error": "error sending request for url (...)" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::error::Error as StdError;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Methods that are matched case-insensitively and sent upper-cased.
const NORMALIZED_METHODS: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

// ============================================================================
// FetchParams
// ============================================================================

/// Raw fetch arguments as received from the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchParams {
    /// Target URL.
    pub url: Option<Value>,
    /// HTTP method (defaults to GET).
    pub method: Option<Value>,
    /// Header object of string values.
    pub headers: Option<Value>,
    /// JSON body.
    pub body: Option<Value>,
}

impl FetchParams {
    /// Reads the fetch fields of a page message.
    #[must_use]
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            url: fields.get("url").cloned(),
            method: fields.get("method").cloned(),
            headers: fields.get("headers").cloned(),
            body: fields.get("body").cloned(),
        }
    }

    /// Creates a GET request for `url`.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: Some(Value::String(url.into())),
            ..Default::default()
        }
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(Value::String(method.into()));
        self
    }

    /// Adds one header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let headers = self
            .headers
            .get_or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = headers {
            map.insert(name.into(), Value::String(value.into()));
        }
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes the present fields as message fields.
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        let entries = [
            ("url", &self.url),
            ("method", &self.method),
            ("headers", &self.headers),
            ("body", &self.body),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                fields.insert(key.to_string(), value.clone());
            }
        }
        fields
    }
}

// ============================================================================
// FetchRequest
// ============================================================================

/// A validated fetch request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Absolute http(s) URL.
    pub url: Url,
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl FetchRequest {
    /// Validates raw page arguments.
    ///
    /// Relative URLs resolve against `base_url` when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for any invalid field.
    pub fn from_params(params: &FetchParams, base_url: Option<&Url>) -> Result<Self> {
        let method = parse_method(params.method.as_ref())?;
        Ok(Self {
            url: parse_url(params.url.as_ref(), base_url)?,
            body: parse_body(params.body.as_ref(), &method)?,
            method,
            headers: parse_headers(params.headers.as_ref())?,
        })
    }
}

fn parse_url(value: Option<&Value>, base_url: Option<&Url>) -> Result<Url> {
    let raw = match value {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(Error::malformed("url is missing"));
        }
        Some(other) => return Err(Error::malformed(format!("url must be a string, got {other}"))),
    };

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base_url {
            Some(base) => base
                .join(raw)
                .map_err(|e| Error::malformed(format!("invalid url {raw}: {e}")))?,
            None => return Err(Error::malformed(format!("relative url without base: {raw}"))),
        },
        Err(e) => return Err(Error::malformed(format!("invalid url {raw}: {e}"))),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::malformed(format!("unsupported url scheme: {}", url.scheme())));
    }

    Ok(url)
}

fn parse_method(value: Option<&Value>) -> Result<Method> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(Method::GET),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(Error::malformed(format!("method must be a string, got {other}")));
        }
    };

    let upper = raw.to_ascii_uppercase();
    let normalized = if NORMALIZED_METHODS.contains(&upper.as_str()) {
        upper.as_str()
    } else {
        raw
    };

    Method::from_bytes(normalized.as_bytes())
        .map_err(|_| Error::malformed(format!("invalid HTTP method: {raw}")))
}

/// Falsy bodies (`null`, `false`, `0`, `""`) mean "no body".
fn parse_body(value: Option<&Value>, method: &Method) -> Result<Option<Value>> {
    let body = match value {
        None | Some(Value::Null | Value::Bool(false)) => return Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(body) => body,
    };

    if *method == Method::GET || *method == Method::HEAD {
        return Err(Error::malformed(format!("{method} request cannot have a body")));
    }

    Ok(Some(body.clone()))
}

fn parse_headers(value: Option<&Value>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let entries = match value {
        None | Some(Value::Null) => return Ok(headers),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(Error::malformed(format!("headers must be an object, got {other}")));
        }
    };

    for (name, value) in entries {
        let Value::String(value) = value else {
            return Err(Error::malformed(format!("header {name} must be a string")));
        };
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::malformed(format!("invalid header name: {name}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::malformed(format!("invalid value for header {name}")))?;
        headers.append(name, value);
    }

    Ok(headers)
}

// ============================================================================
// FetchOutcome
// ============================================================================

/// Terminal result of a proxied fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// Whether a JSON body was obtained.
    pub success: bool,

    /// Parsed response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// HTTP status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    /// Creates a success outcome.
    #[inline]
    #[must_use]
    pub fn success(data: Value, status: u16) -> Self {
        Self {
            success: true,
            data: Some(data),
            status: Some(status),
            error: None,
        }
    }

    /// Creates a failure outcome.
    #[inline]
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            status: None,
            error: Some(message.into()),
        }
    }

    /// Converts the outcome into wire fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

// ============================================================================
// FetchProxy
// ============================================================================

/// Executes HTTP requests on behalf of the page.
#[derive(Debug, Clone)]
pub struct FetchProxy {
    client: Client,
    base_url: Option<Url>,
}

impl FetchProxy {
    /// Creates a proxy with one shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    /// Runs one proxied fetch. Never fails; errors become the outcome.
    pub async fn execute(&self, params: &FetchParams) -> FetchOutcome {
        match self.send(params).await {
            Ok((status, data)) => FetchOutcome::success(data, status),
            Err(e) => {
                let message = failure_message(&e);
                warn!(error = %message, "Fetch proxy error");
                FetchOutcome::failure(message)
            }
        }
    }

    async fn send(&self, params: &FetchParams) -> Result<(u16, Value)> {
        let request = FetchRequest::from_params(params, self.base_url.as_ref())?;
        debug!(method = %request.method, url = %request.url, "Proxying fetch");

        let has_content_type = request.headers.contains_key(CONTENT_TYPE);
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = &request.body {
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let data = serde_json::from_slice(&bytes)
            .map_err(|e| Error::fetch(format!("response body is not JSON: {e}")))?;

        debug!(status, "Fetch proxied");
        Ok((status, data))
    }
}

/// Human-readable message for the page, including the HTTP error chain.
fn failure_message(err: &Error) -> String {
    match err {
        Error::Http(e) => {
            let mut message = e.to_string();
            let mut source = e.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            message
        }
        Error::Malformed { message } | Error::Fetch { message } => message.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn params(value: Value) -> FetchParams {
        FetchParams::from_fields(value.as_object().expect("object"))
    }

    #[test]
    fn test_defaults() {
        let request = FetchRequest::from_params(&FetchParams::get("https://api.test/x"), None)
            .expect("valid");
        assert_eq!(request.method, Method::GET);
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_method_normalization() {
        let request = FetchRequest::from_params(
            &FetchParams::get("https://api.test").with_method("post"),
            None,
        )
        .expect("valid");
        assert_eq!(request.method, Method::POST);

        let custom = FetchRequest::from_params(
            &FetchParams::get("https://api.test").with_method("Purge"),
            None,
        )
        .expect("valid");
        assert_eq!(custom.method.as_str(), "Purge");
    }

    #[test]
    fn test_rejects_bad_method() {
        let err = FetchRequest::from_params(&params(json!({"url": "https://a.test", "method": "GE T"})), None)
            .expect_err("invalid");
        assert!(err.is_malformed());
    }

    #[test]
    fn test_rejects_missing_or_non_string_url() {
        for value in [json!({}), json!({"url": ""}), json!({"url": 5}), json!({"url": null})] {
            let err = FetchRequest::from_params(&params(value), None).expect_err("invalid");
            assert!(err.is_malformed());
        }
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = FetchRequest::from_params(&FetchParams::get("file:///etc/passwd"), None)
            .expect_err("invalid");
        assert_eq!(err.to_string(), "Malformed request: unsupported url scheme: file");
    }

    #[test]
    fn test_relative_url_needs_base() {
        assert!(FetchRequest::from_params(&FetchParams::get("/api/steps"), None).is_err());

        let base = Url::parse("https://app.test/page/").expect("base");
        let request = FetchRequest::from_params(&FetchParams::get("/api/steps"), Some(&base))
            .expect("valid");
        assert_eq!(request.url.as_str(), "https://app.test/api/steps");
    }

    #[test]
    fn test_headers_must_be_strings() {
        let ok = FetchRequest::from_params(
            &FetchParams::get("https://a.test").with_header("X-Trace", "1"),
            None,
        )
        .expect("valid");
        assert_eq!(ok.headers.get("x-trace").and_then(|v| v.to_str().ok()), Some("1"));

        let err = FetchRequest::from_params(
            &params(json!({"url": "https://a.test", "headers": {"X-Count": 3}})),
            None,
        )
        .expect_err("invalid");
        assert!(err.is_malformed());

        let err = FetchRequest::from_params(
            &params(json!({"url": "https://a.test", "headers": ["a"]})),
            None,
        )
        .expect_err("invalid");
        assert!(err.is_malformed());
    }

    #[test]
    fn test_null_body_is_absent() {
        let request = FetchRequest::from_params(
            &params(json!({"url": "https://a.test", "body": null})),
            None,
        )
        .expect("valid");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_falsy_body_is_absent() {
        for body in [json!(false), json!(0), json!(0.0), json!("")] {
            let request = FetchRequest::from_params(
                &params(json!({"url": "https://a.test", "body": body})),
                None,
            )
            .expect("valid");
            assert!(request.body.is_none(), "body {body} should be dropped");
        }
    }

    #[test]
    fn test_body_rejected_on_get_and_head() {
        for method in ["GET", "head"] {
            let err = FetchRequest::from_params(
                &params(json!({"url": "https://a.test", "method": method, "body": {"a": 1}})),
                None,
            )
            .expect_err("invalid");
            assert!(err.is_malformed());
        }

        let err = FetchRequest::from_params(&params(json!({"url": "https://a.test", "body": true})), None)
            .expect_err("invalid");
        assert_eq!(err.to_string(), "Malformed request: GET request cannot have a body");

        let request = FetchRequest::from_params(
            &params(json!({"url": "https://a.test", "method": "PUT", "body": 0.5})),
            None,
        )
        .expect("valid");
        assert_eq!(request.body, Some(json!(0.5)));
    }

    #[test]
    fn test_outcome_fields() {
        let ok = FetchOutcome::success(json!({"ok": true}), 200).into_fields();
        assert_eq!(Value::Object(ok), json!({"success": true, "data": {"ok": true}, "status": 200}));

        let failed = FetchOutcome::failure("boom").into_fields();
        assert_eq!(Value::Object(failed), json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_params_to_fields_skips_absent() {
        let fields = FetchParams::get("https://a.test").with_method("PUT").to_fields();
        assert_eq!(Value::Object(fields), json!({"url": "https://a.test", "method": "PUT"}));
    }

    #[tokio::test]
    async fn test_invalid_request_fails_without_io() {
        let proxy = FetchProxy::new(&FetchConfig::default()).expect("proxy");
        let outcome = proxy.execute(&FetchParams::get("ftp://files.test")).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("unsupported url scheme: ftp"));
        assert!(outcome.data.is_none());
        assert!(outcome.status.is_none());
    }
}
