//
//  xmatters-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # xMatters Client Library
//!
//! A client library for the xMatters REST API (people, groups, and
//! notifications). Typed method calls become authenticated HTTP requests;
//! transient failures are recovered transparently; OAuth token lifecycle is
//! managed without the caller babysitting credentials.
//!
//! ## Features
//!
//! - **Three auth shapes**: Basic, authorization-code grant, and existing
//!   OAuth token pairs, validated once at construction
//! - **Automatic retries**: exponential backoff for 429/5xx with
//!   `Retry-After` support
//! - **Token lifecycle**: proactive refresh near expiry, one
//!   refresh-and-retry on 401, rotation notification callback
//! - **Injectable transport**: swap the networking layer for testing or
//!   proxying
//! - **Uniform errors**: every failure is an [`XmApiError`] carrying enough
//!   structure to handle it programmatically
//!
//! ## Module Structure
//!
//! - [`api`]: The request execution engine and resource endpoints
//! - [`auth`]: Authorization headers, token state, grant bodies
//! - [`config`]: Construction configuration and validation
//! - [`error`]: The unified error type
//!
//! ## Example
//!
//! ```rust,no_run
//! use xmatters_client::{ClientConfig, XmApiClient};
//!
//! # async fn example() -> Result<(), xmatters_client::XmApiError> {
//! let client = XmApiClient::new(
//!     ClientConfig::oauth(
//!         "acme.xmatters.com",
//!         "access-token",
//!         "refresh-token",
//!         "client-id",
//!     )
//!     .on_token_refresh(|access, refresh| {
//!         // Persist the rotated pair for the next session.
//!         println!("tokens rotated: {access} / {refresh}");
//!         Ok(())
//!     }),
//! )?;
//!
//! let response = client.people().search("smith").await?;
//! println!("status: {}", response.status);
//! # Ok(())
//! # }
//! ```

/// The API layer: request handler, builder, transport, resource endpoints.
pub mod api;

/// Authentication: authorization headers, token state, and grant bodies.
pub mod auth;

/// Client construction configuration and validation.
pub mod config;

/// The unified error type for all operations.
pub mod error;

pub use api::{
    GroupsEndpoint, HttpRequest, HttpResponse, OAuthEndpoint, PeopleEndpoint, QueryValue,
    ReqwestTransport, RequestBody, RequestSpec, ResponseBody, Transport, TransportError,
    XmApiClient, API_BASE_PATH,
};
pub use auth::{TokenState, TOKEN_EXPIRY_MARGIN_SECS, TOKEN_PATH};
pub use config::{AuthConfig, ClientConfig, TokenRefreshCallback, DEFAULT_MAX_RETRIES};
pub use error::XmApiError;

/// Crate version, derived from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
