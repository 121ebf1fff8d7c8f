//
//  xmatters-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # API Layer
//!
//! This module contains the request execution engine and the resource
//! endpoints built on top of it.
//!
//! ## Architecture
//!
//! - [`client`]: The request handler ([`XmApiClient`]) orchestrating build,
//!   auth, send, classify, retry.
//! - [`request`]: The pure request builder ([`RequestSpec`] to
//!   [`HttpRequest`]).
//! - [`transport`]: The injectable [`Transport`] trait and its reqwest-backed
//!   default.
//! - [`groups`], [`people`], [`oauth`]: Thin resource endpoints forwarding to
//!   the handler.
//!
//! ## Control Flow
//!
//! ```text
//! caller -> endpoint -> XmApiClient::send()
//!             -> RequestSpec::build() -> attach Authorization -> Transport::send()
//!             -> [success: return]
//!              | [429/5xx: backoff, retry]
//!              | [401 + OAuth: refresh once, retry]
//!              | [fatal: XmApiError]
//! ```

/// The request handler: orchestrates auth, retries, and token refresh.
pub mod client;

/// Groups resource endpoint.
pub mod groups;

/// OAuth resource endpoint (token acquisition).
pub mod oauth;

/// People resource endpoint.
pub mod people;

/// Pure request building: logical descriptions to ready-to-send requests.
pub mod request;

/// The injectable transport layer and its reqwest-backed default.
pub mod transport;

pub use client::XmApiClient;
pub use groups::GroupsEndpoint;
pub use oauth::OAuthEndpoint;
pub use people::PeopleEndpoint;
pub use request::{HttpRequest, QueryValue, RequestBody, RequestSpec, API_BASE_PATH};
pub use transport::{
    HttpResponse, ReqwestTransport, ResponseBody, Transport, TransportError,
};
