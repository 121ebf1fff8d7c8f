//
//  xmatters-client
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Request Builder
//!
//! This module turns a logical request description ([`RequestSpec`]) into a
//! fully-qualified, ready-to-send [`HttpRequest`]: URL string, merged
//! headers, serialized body. Building is pure and deterministic; no network
//! I/O happens here and every validation failure is raised before a single
//! byte leaves the process.
//!
//! ## Target Selection
//!
//! A request targets either a relative API path (prefixed with the fixed
//! `/api/xm/1` segment) or an absolute external URL, never both and never
//! neither. The xMatters API is inconsistent about accepting percent-encoded
//! versus raw identifiers in path segments, so the builder preserves the
//! path's character encoding exactly as supplied; encoding decisions belong
//! to the caller.
//!
//! ## Example
//!
//! ```rust
//! use xmatters_client::RequestSpec;
//!
//! let spec = RequestSpec::get()
//!     .path("/groups")
//!     .query("search", "oncall")
//!     .query("embed", vec!["supervisors", "observers"]);
//! ```

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use crate::error::XmApiError;

/// Fixed API-version prefix applied to every relative path.
pub const API_BASE_PATH: &str = "/api/xm/1";

/// A query parameter value.
///
/// Lists are serialized as a single comma-joined value; [`Absent`](Self::Absent)
/// entries are omitted from the URL entirely rather than rendered empty.
/// `From` impls let callers pass plain strings, string lists, and `Option`s
/// (where `None` maps to `Absent`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// A single value, rendered as `key=value`.
    Single(String),
    /// Multiple values, rendered as `key=a,b,c`.
    List(Vec<String>),
    /// No value; the parameter is dropped from the URL.
    Absent,
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(String::from).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Self::Absent,
        }
    }
}

/// The request body as supplied by the caller.
///
/// JSON payloads are serialized with `serde_json` at build time; raw string
/// bodies pass through untouched (used for the form-encoded token requests).
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// A JSON payload, serialized at build time.
    Json(Value),
    /// A pre-serialized body, sent as-is.
    Raw(String),
}

/// A logical request description.
///
/// Built up with chained setters and handed to the request handler, which
/// turns it into an [`HttpRequest`] via [`build`](Self::build). Exactly one
/// of `path` or `full_url` must be set by the time the request is built.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use xmatters_client::RequestSpec;
///
/// let spec = RequestSpec::post()
///     .path("/groups")
///     .json(json!({ "targetName": "Database On-Call" }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub(crate) method: Method,
    pub(crate) path: Option<String>,
    pub(crate) full_url: Option<String>,
    pub(crate) query: Vec<(String, QueryValue)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) skip_auth: bool,
}

impl RequestSpec {
    /// Creates a request description with the given method.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Creates a GET request description.
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// Creates a POST request description.
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Creates a PUT request description.
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    /// Creates a PATCH request description.
    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    /// Creates a DELETE request description.
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Replaces the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Targets a relative API path. Must start with `/`; the fixed
    /// `/api/xm/1` prefix is added at build time. Mutually exclusive with
    /// [`full_url`](Self::full_url).
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Targets an absolute external URL, used verbatim. Mutually exclusive
    /// with [`path`](Self::path).
    pub fn full_url(mut self, url: impl Into<String>) -> Self {
        self.full_url = Some(url.into());
        self
    }

    /// Appends a query parameter. Parameters render in the order they were
    /// added; see [`QueryValue`] for list and absent-value handling.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a request-specific header, overriding any default header with
    /// the same key.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Attaches a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attaches a pre-serialized body, sent without further processing.
    pub fn raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// Suppresses the `Authorization` header for this request. Used only for
    /// the token endpoint itself.
    pub fn skip_auth(mut self, skip: bool) -> Self {
        self.skip_auth = skip;
        self
    }

    /// Builds the ready-to-send request.
    ///
    /// # Parameters
    ///
    /// * `hostname` - The validated instance hostname, e.g. `acme.xmatters.com`
    /// * `default_headers` - Config-level headers, overridden per key by
    ///   request-specific headers
    ///
    /// # Errors
    ///
    /// Returns `XmApiError::Request` when both or neither of path/full URL
    /// are set, when the path does not start with `/`, or when the JSON body
    /// cannot be serialized.
    pub(crate) fn build(
        &self,
        hostname: &str,
        default_headers: &HashMap<String, String>,
    ) -> Result<HttpRequest, XmApiError> {
        let base = match (&self.path, &self.full_url) {
            (Some(_), Some(_)) => {
                return Err(XmApiError::Request(
                    "exactly one of path or full_url must be set, got both".to_string(),
                ));
            }
            (None, None) => {
                return Err(XmApiError::Request(
                    "exactly one of path or full_url must be set, got neither".to_string(),
                ));
            }
            (Some(path), None) => {
                if !path.starts_with('/') {
                    return Err(XmApiError::Request(format!(
                        "path must start with '/', got '{path}'"
                    )));
                }
                // The path is appended byte-for-byte. The API accepts raw and
                // percent-encoded identifiers inconsistently, so re-encoding
                // here would break callers that already encoded.
                format!("https://{hostname}{API_BASE_PATH}{path}")
            }
            (None, Some(url)) => url.clone(),
        };

        let url = append_query(base, &self.query);

        let mut headers = default_headers.clone();
        if matches!(self.body, Some(RequestBody::Json(_)))
            && !has_header(&headers, &self.headers, "content-type")
        {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        for (key, value) in &self.headers {
            headers.insert(key.clone(), value.clone());
        }

        let body = match &self.body {
            Some(RequestBody::Json(value)) => Some(
                serde_json::to_string(value)
                    .map_err(|e| XmApiError::Request(format!("failed to serialize body: {e}")))?,
            ),
            Some(RequestBody::Raw(raw)) => Some(raw.clone()),
            None => None,
        };

        Ok(HttpRequest {
            method: self.method.clone(),
            url,
            headers,
            body,
        })
    }
}

/// A fully-built request, ready for the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method.
    pub method: Method,
    /// The fully-qualified URL, query string included.
    pub url: String,
    /// Merged headers (defaults, builder-added, then request overrides).
    pub headers: HashMap<String, String>,
    /// The serialized body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Looks up a header value, matching the key case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Appends query parameters to a URL, preserving any query string already
/// present and the order the parameters were provided in.
fn append_query(mut url: String, query: &[(String, QueryValue)]) -> String {
    let has_params = query
        .iter()
        .any(|(_, value)| !matches!(value, QueryValue::Absent));
    // A dangling '?' or '&' already ends the URL; drop it rather than
    // emitting "?&key=value".
    if has_params && (url.ends_with('?') || url.ends_with('&')) {
        url.pop();
    }
    let mut separator = if url.contains('?') { '&' } else { '?' };
    for (key, value) in query {
        let rendered = match value {
            QueryValue::Single(v) => v.clone(),
            QueryValue::List(vs) => vs.join(","),
            QueryValue::Absent => continue,
        };
        url.push(separator);
        url.push_str(key);
        url.push('=');
        url.push_str(&rendered);
        separator = '&';
    }
    url
}

fn has_header(
    defaults: &HashMap<String, String>,
    overrides: &[(String, String)],
    name: &str,
) -> bool {
    defaults.keys().any(|k| k.eq_ignore_ascii_case(name))
        || overrides.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_defaults() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn prefixes_relative_paths_with_api_version() {
        let request = RequestSpec::get()
            .path("/groups")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(request.url, "https://acme.xmatters.com/api/xm/1/groups");
        assert_eq!(request.method, Method::GET);
    }

    #[test]
    fn preserves_path_encoding_exactly() {
        let request = RequestSpec::get()
            .path("/people/mc%20smith")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(
            request.url,
            "https://acme.xmatters.com/api/xm/1/people/mc%20smith"
        );

        let request = RequestSpec::get()
            .path("/people/mc smith")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(
            request.url,
            "https://acme.xmatters.com/api/xm/1/people/mc smith"
        );
    }

    #[test]
    fn appends_query_in_order_with_comma_joined_lists() {
        let request = RequestSpec::get()
            .path("/groups")
            .query("search", "oncall")
            .query("embed", vec!["supervisors", "observers"])
            .query("limit", 10u32)
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(
            request.url,
            "https://acme.xmatters.com/api/xm/1/groups?search=oncall&embed=supervisors,observers&limit=10"
        );
    }

    #[test]
    fn omits_absent_query_values() {
        let offset: Option<u32> = None;
        let request = RequestSpec::get()
            .path("/people")
            .query("offset", offset)
            .query("limit", Some(5u32))
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(request.url, "https://acme.xmatters.com/api/xm/1/people?limit=5");
    }

    #[test]
    fn full_url_used_verbatim_and_merges_query() {
        let request = RequestSpec::get()
            .full_url("https://example.com/hook?a=1")
            .query("b", "2")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(request.url, "https://example.com/hook?a=1&b=2");
    }

    #[test]
    fn full_url_with_dangling_separator_merges_cleanly() {
        let request = RequestSpec::get()
            .full_url("https://example.com/hook?")
            .query("b", "2")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(request.url, "https://example.com/hook?b=2");

        let request = RequestSpec::get()
            .full_url("https://example.com/hook?a=1&")
            .query("b", "2")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(request.url, "https://example.com/hook?a=1&b=2");

        // Without parameters to append, the URL stays verbatim.
        let request = RequestSpec::get()
            .full_url("https://example.com/hook?")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(request.url, "https://example.com/hook?");
    }

    #[test]
    fn full_url_never_gets_api_prefix() {
        let request = RequestSpec::get()
            .full_url("https://example.com/hook")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert!(!request.url.contains(API_BASE_PATH));
    }

    #[test]
    fn rejects_both_path_and_full_url() {
        let err = RequestSpec::get()
            .path("/groups")
            .full_url("https://example.com")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap_err();
        assert!(matches!(err, XmApiError::Request(_)));
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn rejects_neither_path_nor_full_url() {
        let err = RequestSpec::get()
            .build("acme.xmatters.com", &no_defaults())
            .unwrap_err();
        assert!(matches!(err, XmApiError::Request(_)));
        assert!(err.to_string().contains("neither"));
    }

    #[test]
    fn rejects_path_without_leading_slash() {
        let err = RequestSpec::get()
            .path("groups")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap_err();
        assert!(matches!(err, XmApiError::Request(_)));
    }

    #[test]
    fn request_headers_override_defaults() {
        let mut defaults = HashMap::new();
        defaults.insert("X-Source".to_string(), "default".to_string());
        defaults.insert("X-Kept".to_string(), "yes".to_string());

        let request = RequestSpec::get()
            .path("/groups")
            .header("X-Source", "override")
            .build("acme.xmatters.com", &defaults)
            .unwrap();
        assert_eq!(request.headers.get("X-Source").map(String::as_str), Some("override"));
        assert_eq!(request.headers.get("X-Kept").map(String::as_str), Some("yes"));
    }

    #[test]
    fn json_body_serialized_with_content_type() {
        let request = RequestSpec::post()
            .path("/groups")
            .json(json!({ "targetName": "DB On-Call" }))
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"targetName":"DB On-Call"}"#));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn raw_body_passes_through_untouched() {
        let request = RequestSpec::post()
            .path("/oauth2/token")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .raw_body("grant_type=refresh_token&refresh_token=abc")
            .build("acme.xmatters.com", &no_defaults())
            .unwrap();
        assert_eq!(
            request.body.as_deref(),
            Some("grant_type=refresh_token&refresh_token=abc")
        );
        assert_eq!(
            request.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn build_is_deterministic() {
        let spec = RequestSpec::get().path("/on-call").query("groups", "db");
        let first = spec.build("acme.xmatters.com", &no_defaults()).unwrap();
        let second = spec.build("acme.xmatters.com", &no_defaults()).unwrap();
        assert_eq!(first.url, second.url);
        assert_eq!(first.headers, second.headers);
    }
}
