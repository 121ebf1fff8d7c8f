//
//  xmatters-client
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Transport Layer
//!
//! The [`Transport`] trait performs exactly one HTTP exchange. The request
//! handler never talks to the network directly; it hands a built
//! [`HttpRequest`] to whichever transport the client was configured with.
//! The default is [`ReqwestTransport`], backed by a shared `reqwest::Client`.
//!
//! ## Contract
//!
//! - A transport MUST resolve with an [`HttpResponse`] for every HTTP status
//!   code, 4xx and 5xx included. Error statuses are classified by the request
//!   handler, not the transport.
//! - A transport MUST fail only for network-level problems (DNS failure,
//!   connection refused, timeout). Those errors bubble up to the handler to
//!   be wrapped as `XmApiError::Network`.
//! - Response header keys are normalized to lowercase.
//! - Response bodies are parsed as JSON when the content type contains
//!   `application/json`, falling back to raw text when parsing fails.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::api::request::HttpRequest;
use crate::error::XmApiError;

/// A network-level transport failure. No response was received.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Creates a transport error with a message and an underlying cause.
    pub fn new(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a transport error with a message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// A parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The body parsed as JSON (content type contained `application/json`).
    Json(Value),
    /// The raw body text (non-JSON content type, or JSON that failed to parse).
    Text(String),
    /// No body.
    Empty,
}

impl ResponseBody {
    /// Returns the JSON value, if the body parsed as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw text, if the body was not JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A single HTTP response: status, lowercase headers, parsed body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The response status code.
    pub status: StatusCode,
    /// Response headers with keys normalized to lowercase.
    pub headers: HashMap<String, String>,
    /// The parsed response body.
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Looks up a header value. Keys are stored lowercase, so the lookup is
    /// effectively case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Performs one HTTP exchange.
///
/// Implement this to substitute the client's networking, e.g. for tests or
/// to route requests through a proxy layer. See the module docs for the
/// contract an implementation must uphold.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and resolves with the response.
    ///
    /// Must resolve for every HTTP status and fail only on network-level
    /// errors.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// The default transport, backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh `reqwest::Client`.
    pub fn new() -> Result<Self, XmApiError> {
        let http = Client::builder()
            .user_agent(format!("xmatters-client/{}", crate::VERSION))
            .build()
            .map_err(|e| XmApiError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Creates a transport from an existing `reqwest::Client`, sharing its
    /// connection pool.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http.request(request.method.clone(), &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(TransportError::from)?;

        let status = response.status();
        let mut headers = HashMap::with_capacity(response.headers().len());
        for (name, value) in response.headers() {
            if let Ok(text) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), text.to_string());
            }
        }

        let content_type = headers.get("content-type").cloned().unwrap_or_default();
        let text = response.text().await.map_err(TransportError::from)?;

        Ok(HttpResponse {
            status,
            headers,
            body: parse_body(&content_type, text),
        })
    }
}

/// Parses a response body according to its content type: JSON when the
/// content type says so and the body actually parses, raw text otherwise.
fn parse_body(content_type: &str, text: String) -> ResponseBody {
    if text.is_empty() {
        return ResponseBody::Empty;
    }
    if content_type.to_ascii_lowercase().contains("application/json") {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return ResponseBody::Json(value);
        }
    }
    ResponseBody::Text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    fn request_for(url: &str) -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            url: url.to_string(),
            headers: HashMap::new(),
            body: None,
        }
    }

    #[test]
    fn parses_json_bodies() {
        let body = parse_body("application/json; charset=utf-8", r#"{"ok":true}"#.to_string());
        assert_eq!(body, ResponseBody::Json(json!({ "ok": true })));
    }

    #[test]
    fn falls_back_to_text_on_parse_failure() {
        let body = parse_body("application/json", "not json at all".to_string());
        assert_eq!(body, ResponseBody::Text("not json at all".to_string()));
    }

    #[test]
    fn non_json_content_type_stays_text() {
        let body = parse_body("text/plain", r#"{"looks":"like json"}"#.to_string());
        assert_eq!(body, ResponseBody::Text(r#"{"looks":"like json"}"#.to_string()));
    }

    #[test]
    fn empty_body_is_empty() {
        assert_eq!(parse_body("application/json", String::new()), ResponseBody::Empty);
    }

    #[tokio::test]
    async fn returns_response_for_error_statuses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .send(&request_for(&format!("{}/missing", server.url())))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status.as_u16(), 404);
        assert_eq!(
            response.body.as_json().unwrap()["message"],
            json!("Not Found")
        );
    }

    #[tokio::test]
    async fn normalizes_header_keys_to_lowercase() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/limited")
            .with_status(429)
            .with_header("Retry-After", "7")
            .create_async()
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .send(&request_for(&format!("{}/limited", server.url())))
            .await
            .unwrap();

        assert_eq!(response.headers.get("retry-after").map(String::as_str), Some("7"));
        assert_eq!(response.header("Retry-After"), Some("7"));
    }

    #[tokio::test]
    async fn sends_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_header("authorization", "Bearer token-123")
            .match_body("payload")
            .with_status(200)
            .create_async()
            .await;

        let mut request = HttpRequest {
            method: Method::POST,
            url: format!("{}/echo", server.url()),
            headers: HashMap::new(),
            body: Some("payload".to_string()),
        };
        request
            .headers
            .insert("Authorization".to_string(), "Bearer token-123".to_string());

        let transport = ReqwestTransport::new().unwrap();
        let response = transport.send(&request).await.unwrap();

        mock.assert_async().await;
        assert!(response.status.is_success());
    }

    #[tokio::test]
    async fn fails_with_transport_error_on_connection_refused() {
        let transport = ReqwestTransport::new().unwrap();
        // Port 1 is never listening.
        let err = transport
            .send(&request_for("http://127.0.0.1:1/unreachable"))
            .await
            .unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
    }
}
