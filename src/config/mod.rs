//
//  xmatters-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Client Configuration
//!
//! This module defines the construction-time configuration for
//! [`XmApiClient`](crate::api::XmApiClient): the target hostname, exactly one
//! authentication shape, and the common knobs (default headers, retry budget,
//! token refresh notification, injected transport).
//!
//! ## Authentication Shapes
//!
//! Exactly one of three shapes is supplied at construction, modeled as the
//! [`AuthConfig`] tagged union so that ambiguous or incomplete combinations
//! are unrepresentable:
//!
//! - [`AuthConfig::Basic`] - username and password
//! - [`AuthConfig::AuthorizationCode`] - authorization code, client id, and
//!   optional client secret
//! - [`AuthConfig::OAuth`] - access token, refresh token, and client id
//!
//! ## Example
//!
//! ```rust
//! use xmatters_client::ClientConfig;
//!
//! let config = ClientConfig::basic("acme.xmatters.com", "admin", "hunter2")
//!     .with_max_retries(5)
//!     .with_default_header("X-Request-Source", "sandbox");
//! ```
//!
//! ## Notes
//!
//! - The hostname must be a subdomain of `xmatters.com` or `xmatters.com.au`
//!   (case-insensitive). Anything else is rejected at client construction.
//! - `max_retries` is a `u32`, so non-negativity is enforced by the type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::api::transport::Transport;
use crate::error::XmApiError;

/// Default number of automatic retries for 429/5xx responses.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Callback invoked after every successful token refresh with the new
/// access and refresh token pair.
///
/// The callback is fallible: an `Err` return is logged at `warn` level and
/// swallowed, never failing the in-flight request. Typical use is persisting
/// the rotated tokens so a later process can resume the session.
pub type TokenRefreshCallback =
    Arc<dyn Fn(&str, &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// Authentication configuration, exactly one shape per client.
///
/// Each variant carries the complete set of fields its flow requires, so a
/// constructed value is structurally valid; field emptiness is still checked
/// at client construction.
///
/// # Example
///
/// ```rust
/// use xmatters_client::AuthConfig;
///
/// let auth = AuthConfig::OAuth {
///     access_token: "eyJhbGciOiJIUzI1NiIs...".to_string(),
///     refresh_token: "b2c3d4e5...".to_string(),
///     client_id: "c7e8f9a0-1b2c-3d4e".to_string(),
/// };
/// ```
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// HTTP Basic authentication with username and password.
    Basic {
        /// The xMatters username.
        username: String,
        /// The account password.
        password: String,
    },
    /// OAuth 2.0 authorization-code grant. Tokens are obtained on demand
    /// through the token endpoint.
    AuthorizationCode {
        /// The authorization code obtained out of band.
        authorization_code: String,
        /// The OAuth client id of the xMatters instance.
        client_id: String,
        /// Optional client secret for confidential clients.
        client_secret: Option<String>,
    },
    /// OAuth 2.0 with tokens already in hand. The client refreshes the
    /// access token automatically when it expires.
    OAuth {
        /// The current access token.
        access_token: String,
        /// The refresh token used to rotate the access token.
        refresh_token: String,
        /// The OAuth client id of the xMatters instance.
        client_id: String,
    },
}

impl AuthConfig {
    /// Returns `true` for the OAuth-style shapes that participate in token
    /// refresh (`AuthorizationCode` and `OAuth`).
    pub fn is_oauth(&self) -> bool {
        !matches!(self, Self::Basic { .. })
    }

    fn validate(&self) -> Result<(), XmApiError> {
        let missing = |field: &str| {
            Err(XmApiError::Config(format!(
                "auth configuration is missing a required field: {field}"
            )))
        };

        match self {
            Self::Basic { username, password } => {
                if username.is_empty() {
                    return missing("username");
                }
                if password.is_empty() {
                    return missing("password");
                }
            }
            Self::AuthorizationCode {
                authorization_code,
                client_id,
                ..
            } => {
                if authorization_code.is_empty() {
                    return missing("authorization_code");
                }
                if client_id.is_empty() {
                    return missing("client_id");
                }
            }
            Self::OAuth {
                access_token,
                refresh_token,
                client_id,
            } => {
                if access_token.is_empty() {
                    return missing("access_token");
                }
                if refresh_token.is_empty() {
                    return missing("refresh_token");
                }
                if client_id.is_empty() {
                    return missing("client_id");
                }
            }
        }

        Ok(())
    }
}

/// Complete construction configuration for an [`XmApiClient`](crate::api::XmApiClient).
///
/// Build one with the shape-specific constructors ([`basic`](Self::basic),
/// [`authorization_code`](Self::authorization_code), [`oauth`](Self::oauth))
/// and chain the `with_*` setters for the common options. Validation happens
/// when the client is constructed, not while building the config.
///
/// # Example
///
/// ```rust
/// use xmatters_client::ClientConfig;
///
/// let config = ClientConfig::oauth(
///     "acme.xmatters.com",
///     "current-access-token",
///     "current-refresh-token",
///     "my-client-id",
/// )
/// .on_token_refresh(|access, _refresh| {
///     println!("new access token: {access}");
///     Ok(())
/// });
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Target hostname, e.g. `acme.xmatters.com`.
    pub hostname: String,
    /// The authentication shape for this client.
    pub auth: AuthConfig,
    /// Headers applied to every request; per-request headers override by key.
    pub default_headers: HashMap<String, String>,
    /// Retry budget for 429/5xx responses.
    pub max_retries: u32,
    /// Invoked with the new token pair after each successful refresh.
    pub on_token_refresh: Option<TokenRefreshCallback>,
    /// Replacement transport; defaults to the reqwest-backed implementation.
    pub transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hostname", &self.hostname)
            .field("auth", &self.auth)
            .field("default_headers", &self.default_headers)
            .field("max_retries", &self.max_retries)
            .field("on_token_refresh", &self.on_token_refresh.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

impl ClientConfig {
    fn new(hostname: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            hostname: hostname.into(),
            auth,
            default_headers: HashMap::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            on_token_refresh: None,
            transport: None,
        }
    }

    /// Creates a configuration using HTTP Basic authentication.
    pub fn basic(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(
            hostname,
            AuthConfig::Basic {
                username: username.into(),
                password: password.into(),
            },
        )
    }

    /// Creates a configuration using the OAuth authorization-code grant.
    ///
    /// Use [`with_client_secret`](Self::with_client_secret) for confidential
    /// clients.
    pub fn authorization_code(
        hostname: impl Into<String>,
        authorization_code: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self::new(
            hostname,
            AuthConfig::AuthorizationCode {
                authorization_code: authorization_code.into(),
                client_id: client_id.into(),
                client_secret: None,
            },
        )
    }

    /// Creates a configuration from an existing OAuth token pair.
    pub fn oauth(
        hostname: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self::new(
            hostname,
            AuthConfig::OAuth {
                access_token: access_token.into(),
                refresh_token: refresh_token.into(),
                client_id: client_id.into(),
            },
        )
    }

    /// Sets the client secret on an authorization-code configuration.
    ///
    /// Has no effect on the other shapes.
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        if let AuthConfig::AuthorizationCode { client_secret, .. } = &mut self.auth {
            *client_secret = Some(secret.into());
        }
        self
    }

    /// Adds a header applied to every request.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Overrides the retry budget for 429/5xx responses (default: 3).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Replaces the default reqwest transport with a caller-supplied one.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Registers a callback invoked with the new access/refresh token pair
    /// after every successful token refresh.
    ///
    /// A callback error is logged as a warning and swallowed; it never fails
    /// the request that triggered the refresh.
    pub fn on_token_refresh(
        mut self,
        callback: impl Fn(&str, &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.on_token_refresh = Some(Arc::new(callback));
        self
    }

    /// Validates the configuration.
    ///
    /// Checks the hostname suffix and the completeness of the active auth
    /// shape. Called by `XmApiClient::new`; errors are `XmApiError::Config`.
    pub(crate) fn validate(&self) -> Result<(), XmApiError> {
        if !is_valid_hostname(&self.hostname) {
            return Err(XmApiError::Config(format!(
                "hostname must be a subdomain of xmatters.com or xmatters.com.au, got '{}'",
                self.hostname
            )));
        }
        self.auth.validate()
    }
}

/// Checks that a hostname is a subdomain of one of the accepted xMatters
/// domains, case-insensitively.
fn is_valid_hostname(hostname: &str) -> bool {
    let lower = hostname.to_ascii_lowercase();
    for suffix in [".xmatters.com", ".xmatters.com.au"] {
        if let Some(prefix) = lower.strip_suffix(suffix) {
            let valid_prefix = !prefix.is_empty()
                && !prefix.starts_with('.')
                && !prefix.ends_with('.')
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
            if valid_prefix {
                return true;
            }
        }
    }
    false
}
