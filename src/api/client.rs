//
//  xmatters-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Request Handler
//!
//! [`XmApiClient`] is the core orchestrator of this crate. Every resource
//! endpoint funnels through [`send`](XmApiClient::send), which runs the full
//! pipeline for one logical call:
//!
//! 1. Refresh the access token proactively when it is known to be expired.
//! 2. Build the request and attach the `Authorization` header.
//! 3. Send it through the configured [`Transport`].
//! 4. Classify the response: success, retry with backoff (429/5xx),
//!    refresh-and-retry (401 under OAuth), or fail.
//!
//! Retries run as an explicit loop with an attempt counter, so a long retry
//! chain never grows the call stack.
//!
//! ## Retry Policy
//!
//! - 429 and 5xx responses are retried up to `max_retries` times (default 3)
//!   with exponential backoff: `min(1000 * 2^attempt, 10000)` milliseconds.
//! - A 429 carrying a numeric `Retry-After` header (seconds) uses that delay
//!   instead of the computed backoff.
//! - A 401 with OAuth active triggers exactly one token refresh followed by
//!   one retry of the original request; the refresh itself is never retried.
//! - Network-level failures and all other 4xx statuses fail immediately.
//!
//! Every scheduled retry is logged at `debug` level with the status, the
//! literal computed delay, and the attempt count.
//!
//! ## Concurrency
//!
//! Token state is held in an `RwLock` and replaced wholesale on refresh, so
//! concurrent readers see either the old or the new complete state. Two
//! concurrent calls that both find the token expired will both refresh; the
//! refreshes are not de-duplicated. The token endpoint treats refreshes
//! idempotently, so the duplicate costs a round trip but corrupts nothing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use xmatters_client::{ClientConfig, XmApiClient};
//!
//! # async fn example() -> Result<(), xmatters_client::XmApiError> {
//! let client = XmApiClient::new(ClientConfig::oauth(
//!     "acme.xmatters.com",
//!     "access-token",
//!     "refresh-token",
//!     "client-id",
//! ))?;
//!
//! let response = client.groups().get("Database On-Call").await?;
//! println!("status: {}", response.status);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::groups::GroupsEndpoint;
use crate::api::oauth::OAuthEndpoint;
use crate::api::people::PeopleEndpoint;
use crate::api::request::RequestSpec;
use crate::api::transport::{HttpResponse, ReqwestTransport, Transport};
use crate::auth::{self, TokenState};
use crate::config::ClientConfig;
use crate::error::XmApiError;

/// Base delay for exponential backoff, in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Upper bound on the computed backoff delay, in milliseconds.
const MAX_RETRY_DELAY_MS: u64 = 10_000;

/// The xMatters API client and request handler.
///
/// Construct one with [`new`](Self::new) from a validated
/// [`ClientConfig`]. The client owns the token state for its lifetime and
/// is the only component that mutates it.
///
/// # Example
///
/// ```rust,no_run
/// use xmatters_client::{ClientConfig, RequestSpec, XmApiClient};
///
/// # async fn example() -> Result<(), xmatters_client::XmApiError> {
/// let client = XmApiClient::new(ClientConfig::basic(
///     "acme.xmatters.com",
///     "admin",
///     "hunter2",
/// ))?;
///
/// let response = client
///     .get(RequestSpec::get().path("/people").query("search", "smith"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct XmApiClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    token: RwLock<Option<TokenState>>,
}

impl XmApiClient {
    /// Creates a client from the given configuration.
    ///
    /// Validates the configuration (hostname suffix, auth shape
    /// completeness) and seeds the token state when the `OAuth` shape is
    /// supplied. The token's remaining lifetime is unknown at this point;
    /// the first 401 or refresh establishes it.
    ///
    /// # Errors
    ///
    /// Returns `XmApiError::Config` for an invalid configuration or when
    /// the default HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, XmApiError> {
        config.validate()?;

        let transport: Arc<dyn Transport> = match &config.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(ReqwestTransport::new()?),
        };

        let token = match &config.auth {
            crate::config::AuthConfig::OAuth {
                access_token,
                refresh_token,
                client_id,
            } => Some(TokenState {
                access_token: access_token.clone(),
                refresh_token: refresh_token.clone(),
                client_id: client_id.clone(),
                expires_at: None,
                scopes: Vec::new(),
            }),
            _ => None,
        };

        Ok(Self {
            config,
            transport,
            token: RwLock::new(token),
        })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a copy of the current token state, if any.
    pub async fn token_state(&self) -> Option<TokenState> {
        self.token.read().await.clone()
    }

    /// The Groups resource endpoint.
    pub fn groups(&self) -> GroupsEndpoint<'_> {
        GroupsEndpoint::new(self)
    }

    /// The People resource endpoint.
    pub fn people(&self) -> PeopleEndpoint<'_> {
        PeopleEndpoint::new(self)
    }

    /// The OAuth resource endpoint (token acquisition).
    pub fn oauth(&self) -> OAuthEndpoint<'_> {
        OAuthEndpoint::new(self)
    }

    /// Sends a GET request.
    pub async fn get(&self, spec: RequestSpec) -> Result<HttpResponse, XmApiError> {
        self.send(spec.method(Method::GET)).await
    }

    /// Sends a POST request.
    pub async fn post(&self, spec: RequestSpec) -> Result<HttpResponse, XmApiError> {
        self.send(spec.method(Method::POST)).await
    }

    /// Sends a PUT request.
    pub async fn put(&self, spec: RequestSpec) -> Result<HttpResponse, XmApiError> {
        self.send(spec.method(Method::PUT)).await
    }

    /// Sends a PATCH request.
    pub async fn patch(&self, spec: RequestSpec) -> Result<HttpResponse, XmApiError> {
        self.send(spec.method(Method::PATCH)).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, spec: RequestSpec) -> Result<HttpResponse, XmApiError> {
        self.send(spec.method(Method::DELETE)).await
    }

    /// Sends a request, handling authentication, retries, and token
    /// refresh.
    ///
    /// This is the single execution path for every request the client
    /// makes. See the module docs for the retry policy.
    ///
    /// # Errors
    ///
    /// - `XmApiError::Request` for an invalid request description (raised
    ///   before any I/O).
    /// - `XmApiError::Http` when the server responds with a non-retryable
    ///   error status or the retry budget is exhausted.
    /// - `XmApiError::TokenRefresh` when a 401-triggered or proactive token
    ///   refresh fails.
    /// - `XmApiError::Network` when the transport fails; never retried.
    pub async fn send(&self, spec: RequestSpec) -> Result<HttpResponse, XmApiError> {
        let mut attempt: u32 = 0;

        loop {
            if !spec.skip_auth && self.token_needs_refresh().await {
                self.refresh_access_token().await?;
            }

            let mut request = spec.build(&self.config.hostname, &self.config.default_headers)?;
            if !spec.skip_auth {
                let guard = self.token.read().await;
                if let Some(value) = auth::authorization_header(&self.config.auth, guard.as_ref())
                {
                    request.headers.insert("Authorization".to_string(), value);
                }
            }

            debug!("{} {} (attempt {})", request.method, request.url, attempt);
            let started = std::time::Instant::now();

            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(source) => return Err(XmApiError::Network { source }),
            };

            debug!(
                "{} {} -> {} in {}ms",
                request.method,
                request.url,
                response.status,
                started.elapsed().as_millis()
            );

            if response.status.as_u16() < 400 {
                return Ok(response);
            }

            // One refresh-and-retry per call chain, taken only on the first
            // attempt and only once a token state exists.
            if response.status == StatusCode::UNAUTHORIZED
                && attempt == 0
                && !spec.skip_auth
                && self.oauth_active().await
            {
                self.refresh_access_token().await?;
                attempt = 1;
                continue;
            }

            let status = response.status.as_u16();
            if (status == 429 || status >= 500) && attempt < self.config.max_retries {
                let delay = retry_delay(&response, attempt);
                debug!(
                    "retrying after {}ms: status {} (attempt {}/{})",
                    delay.as_millis(),
                    status,
                    attempt + 1,
                    self.config.max_retries
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(XmApiError::Http {
                message: error_message(&response),
                response,
            });
        }
    }

    /// Replaces the token state wholesale. Used by the token acquisition
    /// flows; refresh goes through [`refresh_access_token`](Self::refresh_access_token).
    pub(crate) async fn install_token(&self, state: TokenState) {
        *self.token.write().await = Some(state);
    }

    async fn oauth_active(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn token_needs_refresh(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .map(TokenState::is_expired)
            .unwrap_or(false)
    }

    /// Exchanges the refresh token for a new token pair and replaces the
    /// token state.
    ///
    /// The token request is sent straight through the transport: it carries
    /// no `Authorization` header and is not subject to the retry policy. On
    /// success the `on_token_refresh` callback is invoked with the new pair;
    /// a callback error is logged and swallowed so a misbehaving callback
    /// cannot undo a successful refresh.
    async fn refresh_access_token(&self) -> Result<(), XmApiError> {
        let (refresh_token, client_id) = {
            let guard = self.token.read().await;
            match guard.as_ref() {
                Some(state) => (state.refresh_token.clone(), state.client_id.clone()),
                None => {
                    return Err(XmApiError::Config(
                        "no token state available to refresh".to_string(),
                    ));
                }
            }
        };

        let request = RequestSpec::post()
            .path(auth::TOKEN_PATH)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .raw_body(auth::refresh_grant_body(&refresh_token, &client_id))
            .skip_auth(true)
            .build(&self.config.hostname, &self.config.default_headers)?;

        debug!("refreshing access token via {}", request.url);

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|source| XmApiError::Network { source })?;

        if !response.status.is_success() {
            return Err(XmApiError::TokenRefresh { response });
        }

        let parsed = response
            .body
            .as_json()
            .and_then(|value| serde_json::from_value::<auth::TokenResponse>(value.clone()).ok());
        let token_response = match parsed {
            Some(token_response) => token_response,
            None => return Err(XmApiError::TokenRefresh { response }),
        };

        let state = TokenState::from_response(token_response, client_id);
        let access_token = state.access_token.clone();
        let new_refresh_token = state.refresh_token.clone();
        *self.token.write().await = Some(state);

        debug!("access token refreshed");

        if let Some(callback) = &self.config.on_token_refresh {
            if let Err(err) = callback(&access_token, &new_refresh_token) {
                warn!("token refresh callback failed: {err}");
            }
        }

        Ok(())
    }
}

/// Computes the delay before the next retry.
///
/// A 429 with a numeric `Retry-After` header (seconds) takes precedence;
/// everything else uses exponential backoff capped at
/// [`MAX_RETRY_DELAY_MS`].
fn retry_delay(response: &HttpResponse, attempt: u32) -> Duration {
    if response.status.as_u16() == 429 {
        if let Some(value) = response.header("retry-after") {
            if let Ok(seconds) = value.trim().parse::<u64>() {
                return Duration::from_millis(seconds.saturating_mul(1000));
            }
        }
    }

    let exponent = attempt.min(16);
    let backoff = BASE_RETRY_DELAY_MS.saturating_mul(1 << exponent);
    Duration::from_millis(backoff.min(MAX_RETRY_DELAY_MS))
}

/// Derives a human-readable message from an error response body.
///
/// Prefers the xMatters `reason`/`message` pair, then either alone, then a
/// verbatim text body, then a generic fallback naming the status.
fn error_message(response: &HttpResponse) -> String {
    if let Some(body) = response.body.as_json() {
        let reason = body.get("reason").and_then(Value::as_str);
        let message = body.get("message").and_then(Value::as_str);
        match (reason, message) {
            (Some(reason), Some(message)) => return format!("{reason}: {message}"),
            (Some(reason), None) => return reason.to_string(),
            (None, Some(message)) => return message.to_string(),
            (None, None) => {}
        }
    } else if let Some(text) = response.body.as_text() {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    format!("request failed with status {}", response.status.as_u16())
}
