//
//  xmatters-client
//  api/oauth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! OAuth resource endpoint: token acquisition.
//!
//! Acquisition is distinct from refresh. Refresh rotates an existing token
//! pair and lives inside the request handler; acquisition obtains the first
//! pair through one of the grant flows, driven by the configured auth shape:
//!
//! - `Basic` - password grant. A client id must be supplied explicitly;
//!   discovering one automatically is not implemented and fails clearly.
//! - `AuthorizationCode` - authorization-code grant, using the code and
//!   optional client secret from the configuration.
//! - `OAuth` - tokens already exist; acquiring again is an error.
//!
//! On success the new token state is installed on the client, so subsequent
//! requests authenticate with `Bearer` and refresh automatically.

use crate::api::client::XmApiClient;
use crate::api::request::RequestSpec;
use crate::auth::{self, TokenState};
use crate::config::AuthConfig;
use crate::error::XmApiError;

/// Pass-through endpoint for the `/oauth2` resource.
///
/// Obtained from [`XmApiClient::oauth`].
pub struct OAuthEndpoint<'a> {
    client: &'a XmApiClient,
}

impl<'a> OAuthEndpoint<'a> {
    pub(crate) fn new(client: &'a XmApiClient) -> Self {
        Self { client }
    }

    /// Obtains an access/refresh token pair via the grant flow matching the
    /// configured auth shape, installs it on the client, and returns it.
    ///
    /// # Parameters
    ///
    /// * `client_id` - Required for the password grant (Basic config);
    ///   ignored by the other shapes, which carry their own client id.
    ///
    /// # Errors
    ///
    /// - `XmApiError::Config` when the password grant is attempted without
    ///   a client id, or when tokens are already configured.
    /// - `XmApiError::Http` when the token endpoint rejects the grant.
    pub async fn obtain_access_token(
        &self,
        client_id: Option<&str>,
    ) -> Result<TokenState, XmApiError> {
        match &self.client.config().auth {
            AuthConfig::Basic { username, password } => {
                let client_id = client_id.ok_or_else(|| {
                    XmApiError::Config(
                        "the password grant requires an explicit client id; \
                         automatic client id discovery is not implemented"
                            .to_string(),
                    )
                })?;
                let body = auth::password_grant_body(client_id, username, password, None);
                self.request_token(body, client_id.to_string()).await
            }
            AuthConfig::AuthorizationCode {
                authorization_code,
                client_id,
                client_secret,
            } => {
                let body = auth::authorization_code_grant_body(
                    authorization_code,
                    client_secret.as_deref(),
                );
                self.request_token(body, client_id.clone()).await
            }
            AuthConfig::OAuth { .. } => Err(XmApiError::Config(
                "access and refresh tokens are already configured; \
                 they refresh automatically and cannot be acquired again"
                    .to_string(),
            )),
        }
    }

    async fn request_token(
        &self,
        body: String,
        client_id: String,
    ) -> Result<TokenState, XmApiError> {
        let response = self
            .client
            .send(
                RequestSpec::post()
                    .path(auth::TOKEN_PATH)
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .raw_body(body)
                    .skip_auth(true),
            )
            .await?;

        let parsed = response
            .body
            .as_json()
            .and_then(|value| serde_json::from_value::<auth::TokenResponse>(value.clone()).ok());
        let token_response = match parsed {
            Some(token_response) => token_response,
            None => {
                return Err(XmApiError::Http {
                    message: "token endpoint returned an unexpected response body".to_string(),
                    response,
                });
            }
        };

        let state = TokenState::from_response(token_response, client_id);
        self.client.install_token(state.clone()).await;
        Ok(state)
    }
}
