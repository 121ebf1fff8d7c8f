//
//  xmatters-client
//  api/groups.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Groups resource endpoint.
//!
//! Thin pass-through wrappers over the request handler for the `/groups`
//! resource. Each method maps its parameters onto a path and forwards; all
//! retry, auth, and error behavior lives in the handler.
//!
//! Group identifiers are used in paths exactly as supplied. The API accepts
//! both raw and percent-encoded target names inconsistently, so encoding is
//! the caller's decision.

use serde_json::Value;

use crate::api::client::XmApiClient;
use crate::api::request::RequestSpec;
use crate::api::transport::HttpResponse;
use crate::error::XmApiError;

/// Pass-through endpoint for the `/groups` resource.
///
/// Obtained from [`XmApiClient::groups`].
pub struct GroupsEndpoint<'a> {
    client: &'a XmApiClient,
}

impl<'a> GroupsEndpoint<'a> {
    pub(crate) fn new(client: &'a XmApiClient) -> Self {
        Self { client }
    }

    /// Lists groups. `GET /groups`
    pub async fn list(&self) -> Result<HttpResponse, XmApiError> {
        self.client.send(RequestSpec::get().path("/groups")).await
    }

    /// Searches groups by term. `GET /groups?search=...`
    pub async fn search(&self, term: &str) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::get().path("/groups").query("search", term))
            .await
    }

    /// Fetches one group by id or target name. `GET /groups/{group}`
    pub async fn get(&self, group: &str) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::get().path(format!("/groups/{group}")))
            .await
    }

    /// Creates a group. `POST /groups`
    pub async fn create(&self, body: Value) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::post().path("/groups").json(body))
            .await
    }

    /// Deletes a group. `DELETE /groups/{group}`
    pub async fn delete(&self, group: &str) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::delete().path(format!("/groups/{group}")))
            .await
    }

    /// Lists a group's members. `GET /groups/{group}/members`
    pub async fn members(&self, group: &str) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::get().path(format!("/groups/{group}/members")))
            .await
    }
}
