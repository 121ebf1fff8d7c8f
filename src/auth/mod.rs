//
//  xmatters-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Authentication and Token State
//!
//! This module produces the `Authorization` header for the active
//! [`AuthConfig`](crate::config::AuthConfig) shape and models the OAuth token
//! state owned by the request handler.
//!
//! ## Token Lifecycle
//!
//! A [`TokenState`] is created at client construction when the `OAuth` config
//! shape is supplied (expiry unknown until the first refresh) or when tokens
//! are acquired through one of the grant flows. On every successful refresh
//! the state is replaced wholesale with a single assignment; it is never
//! partially mutated, so a concurrent reader always observes either the old
//! or the new complete state.
//!
//! ## Wire Protocol
//!
//! Grant requests are form-encoded POSTs to `/api/xm/1/oauth2/token`:
//!
//! - `grant_type=password&client_id=...&username=...&password=...[&client_secret=...]`
//! - `grant_type=authorization_code&authorization_code=...[&client_secret=...]`
//! - `grant_type=refresh_token&refresh_token=...&client_id=...`
//!
//! The token request itself carries no `Authorization` header.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use url::form_urlencoded;

use crate::config::AuthConfig;

/// Path of the token endpoint, relative to the API base.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Safety margin applied when checking token expiry. A token within this
/// many seconds of its expiry is treated as already expired.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

/// The OAuth token state owned by the request handler.
///
/// Replaced atomically on every successful refresh. The expiry timestamp is
/// `None` when the tokens were supplied directly at construction, because
/// the remaining lifetime is unknown until the first refresh reports an
/// `expires_in`.
#[derive(Debug, Clone)]
pub struct TokenState {
    /// The current access token, sent as `Bearer <token>`.
    pub access_token: String,
    /// The refresh token used to rotate the access token.
    pub refresh_token: String,
    /// The OAuth client id, required by the refresh grant.
    pub client_id: String,
    /// When the access token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes granted with this token.
    pub scopes: Vec<String>,
}

impl TokenState {
    /// Builds a state from a token endpoint response.
    ///
    /// The expiry is derived as `now + expires_in`; the safety margin is
    /// applied at check time in [`is_expired`](Self::is_expired), not here.
    pub(crate) fn from_response(response: TokenResponse, client_id: String) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs as i64));
        let scopes = response
            .scope
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            client_id,
            expires_at,
            scopes,
        }
    }

    /// Returns `true` when the expiry is known and the current time is
    /// within [`TOKEN_EXPIRY_MARGIN_SECS`] of it.
    ///
    /// An unknown expiry is never considered expired; the 401-refresh path
    /// covers tokens that turn out to be stale.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() >= expires_at - Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS)
            }
            None => false,
        }
    }
}

/// Response from the token endpoint.
///
/// Shared by all three grant flows.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    #[allow(dead_code)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Produces the `Authorization` header value for the current credentials.
///
/// A live [`TokenState`] always wins: once tokens exist, requests are
/// authenticated with `Bearer`, whatever the original config shape was.
/// Without token state, Basic credentials produce a `Basic` header (UTF-8
/// bytes, then base64); the authorization-code shape has nothing to send
/// until tokens are acquired.
pub(crate) fn authorization_header(auth: &AuthConfig, token: Option<&TokenState>) -> Option<String> {
    if let Some(state) = token {
        return Some(format!("Bearer {}", state.access_token));
    }

    match auth {
        AuthConfig::Basic { username, password } => {
            let encoded = BASE64_STANDARD.encode(format!("{username}:{password}").as_bytes());
            Some(format!("Basic {encoded}"))
        }
        AuthConfig::AuthorizationCode { .. } | AuthConfig::OAuth { .. } => None,
    }
}

/// Builds the form body for the password grant.
pub(crate) fn password_grant_body(
    client_id: &str,
    username: &str,
    password: &str,
    client_secret: Option<&str>,
) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair("grant_type", "password")
        .append_pair("client_id", client_id)
        .append_pair("username", username)
        .append_pair("password", password);
    if let Some(secret) = client_secret {
        serializer.append_pair("client_secret", secret);
    }
    serializer.finish()
}

/// Builds the form body for the authorization-code grant.
pub(crate) fn authorization_code_grant_body(
    authorization_code: &str,
    client_secret: Option<&str>,
) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair("grant_type", "authorization_code")
        .append_pair("authorization_code", authorization_code);
    if let Some(secret) = client_secret {
        serializer.append_pair("client_secret", secret);
    }
    serializer.finish()
}

/// Builds the form body for the refresh-token grant.
pub(crate) fn refresh_grant_body(refresh_token: &str, client_id: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "refresh_token")
        .append_pair("refresh_token", refresh_token)
        .append_pair("client_id", client_id)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_state(expires_at: Option<DateTime<Utc>>) -> TokenState {
        TokenState {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            client_id: "cid".to_string(),
            expires_at,
            scopes: Vec::new(),
        }
    }

    #[test]
    fn basic_header_is_base64_of_utf8_pair() {
        let auth = AuthConfig::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(
            authorization_header(&auth, None).as_deref(),
            Some("Basic dXNlcjpwYXNz")
        );
    }

    #[test]
    fn bearer_header_wins_when_token_state_exists() {
        let auth = AuthConfig::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        let state = token_state(None);
        assert_eq!(
            authorization_header(&auth, Some(&state)).as_deref(),
            Some("Bearer at")
        );
    }

    #[test]
    fn no_header_for_auth_code_shape_before_acquisition() {
        let auth = AuthConfig::AuthorizationCode {
            authorization_code: "code".to_string(),
            client_id: "cid".to_string(),
            client_secret: None,
        };
        assert_eq!(authorization_header(&auth, None), None);
    }

    #[test]
    fn expiry_check_applies_safety_margin() {
        // Well past the margin: not expired.
        let state = token_state(Some(Utc::now() + Duration::seconds(300)));
        assert!(!state.is_expired());

        // Inside the 30s margin: expired.
        let state = token_state(Some(Utc::now() + Duration::seconds(10)));
        assert!(state.is_expired());

        // Already past: expired.
        let state = token_state(Some(Utc::now() - Duration::seconds(5)));
        assert!(state.is_expired());

        // Unknown expiry: never expired.
        let state = token_state(None);
        assert!(!state.is_expired());
    }

    #[test]
    fn refresh_grant_body_shape() {
        assert_eq!(
            refresh_grant_body("rt-1", "cid-1"),
            "grant_type=refresh_token&refresh_token=rt-1&client_id=cid-1"
        );
    }

    #[test]
    fn password_grant_body_shape() {
        assert_eq!(
            password_grant_body("cid", "user", "pass", None),
            "grant_type=password&client_id=cid&username=user&password=pass"
        );
        assert_eq!(
            password_grant_body("cid", "user", "pass", Some("shh")),
            "grant_type=password&client_id=cid&username=user&password=pass&client_secret=shh"
        );
    }

    #[test]
    fn grant_bodies_are_form_encoded() {
        let body = password_grant_body("cid", "user@acme.com", "p&ss word", None);
        assert_eq!(
            body,
            "grant_type=password&client_id=cid&username=user%40acme.com&password=p%26ss+word"
        );
    }

    #[test]
    fn authorization_code_grant_body_shape() {
        assert_eq!(
            authorization_code_grant_body("abc", None),
            "grant_type=authorization_code&authorization_code=abc"
        );
        assert_eq!(
            authorization_code_grant_body("abc", Some("shh")),
            "grant_type=authorization_code&authorization_code=abc&client_secret=shh"
        );
    }

    #[test]
    fn state_from_response_derives_expiry_and_scopes() {
        let response = TokenResponse {
            access_token: "new-at".to_string(),
            refresh_token: "new-rt".to_string(),
            expires_in: Some(3600),
            token_type: Some("bearer".to_string()),
            scope: Some("read write".to_string()),
        };
        let before = Utc::now();
        let state = TokenState::from_response(response, "cid".to_string());

        assert_eq!(state.access_token, "new-at");
        assert_eq!(state.client_id, "cid");
        assert_eq!(state.scopes, vec!["read".to_string(), "write".to_string()]);

        let expires_at = state.expires_at.unwrap();
        assert!(expires_at >= before + Duration::seconds(3600));
        assert!(expires_at <= Utc::now() + Duration::seconds(3600));
        assert!(!state.is_expired());
    }
}
