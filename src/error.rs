//
//  xmatters-client
//  error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Error Types
//!
//! This module defines [`XmApiError`], the single error type surfaced by every
//! operation in this crate. Callers always receive either a typed success
//! response or an `XmApiError` with enough structure (status, body, cause) to
//! distinguish the failure origin programmatically.
//!
//! ## Error Origins
//!
//! | Variant | Origin | Response attached | Cause attached |
//! |---------|--------|-------------------|----------------|
//! | `Config` | Invalid construction configuration | No | No |
//! | `Request` | Invalid request description (pre-I/O) | No | No |
//! | `Http` | HTTP error response (status >= 400) | Yes | No |
//! | `TokenRefresh` | Failed OAuth token refresh | Yes | No |
//! | `Network` | Transport-level failure (DNS, refused, timeout) | No | Yes |
//!
//! ## Example
//!
//! ```rust
//! use xmatters_client::XmApiError;
//!
//! fn handle_error(err: &XmApiError) {
//!     match err {
//!         XmApiError::Http { response, .. } if response.status.as_u16() == 404 => {
//!             println!("Resource not found");
//!         }
//!         XmApiError::Network { .. } => println!("Check your connection"),
//!         other => println!("Request failed: {}", other),
//!     }
//! }
//! ```

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::transport::{HttpResponse, TransportError};

/// Unified error type for all xMatters API operations.
///
/// Every fallible operation in this crate returns this type. The variants
/// separate the three failure origins the API surface distinguishes:
/// validation errors (no response), HTTP error responses (response present),
/// and transport failures (underlying cause present, no response).
///
/// # Example
///
/// ```rust
/// use xmatters_client::XmApiError;
///
/// fn is_rate_limited(err: &XmApiError) -> bool {
///     err.status().map(|s| s.as_u16() == 429).unwrap_or(false)
/// }
/// ```
///
/// # Notes
///
/// - Retryable failures (429, 5xx, 401 under OAuth) are handled inside the
///   request handler; an `Http` error reaching the caller means retries were
///   exhausted or the status was not retryable.
/// - `TokenRefresh` is distinct from `Http` so callers can tell a failed
///   refresh apart from a failure of the request that triggered it.
#[derive(Error, Debug)]
pub enum XmApiError {
    /// The construction configuration was invalid.
    ///
    /// Raised synchronously at client construction. Never retried.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request description was invalid (e.g. both or neither of
    /// path/full URL set, path missing its leading slash).
    ///
    /// Raised before any network I/O takes place. Never retried.
    #[error("invalid request: {0}")]
    Request(String),

    /// The server returned an HTTP error response (status >= 400).
    ///
    /// The message is derived from the response body: a `reason` and
    /// `message` combination when both are present, else whichever one is,
    /// else a generic "request failed with status N".
    #[error("{message}")]
    Http {
        /// Human-readable message extracted from the error response body.
        message: String,
        /// Snapshot of the full error response (status, headers, body).
        response: HttpResponse,
    },

    /// Refreshing the OAuth access token failed.
    ///
    /// Carries the token endpoint's response. The refresh itself is never
    /// retried; this error propagates to the caller of the original request.
    #[error("failed to refresh access token")]
    TokenRefresh {
        /// The token endpoint's non-2xx response.
        response: HttpResponse,
    },

    /// A network-level failure occurred and no response was received.
    ///
    /// Covers DNS resolution failures, refused connections, and timeouts.
    /// These are surfaced immediately and not retried.
    #[error("network error: {source}")]
    Network {
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },
}

impl XmApiError {
    /// Returns the response snapshot attached to this error, if any.
    ///
    /// Present for `Http` and `TokenRefresh` errors, absent for validation
    /// and network errors.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Http { response, .. } | Self::TokenRefresh { response } => Some(response),
            _ => None,
        }
    }

    /// Returns the HTTP status of the attached response, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }

    /// Returns `true` if this error originated at the transport level
    /// (no response was received from the server).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
