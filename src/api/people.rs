//
//  xmatters-client
//  api/people.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! People resource endpoint.
//!
//! Thin pass-through wrappers over the request handler for the `/people`
//! resource. Identifier encoding is left to the caller, as with groups.

use serde_json::Value;

use crate::api::client::XmApiClient;
use crate::api::request::RequestSpec;
use crate::api::transport::HttpResponse;
use crate::error::XmApiError;

/// Pass-through endpoint for the `/people` resource.
///
/// Obtained from [`XmApiClient::people`].
pub struct PeopleEndpoint<'a> {
    client: &'a XmApiClient,
}

impl<'a> PeopleEndpoint<'a> {
    pub(crate) fn new(client: &'a XmApiClient) -> Self {
        Self { client }
    }

    /// Lists people. `GET /people`
    pub async fn list(&self) -> Result<HttpResponse, XmApiError> {
        self.client.send(RequestSpec::get().path("/people")).await
    }

    /// Searches people by term. `GET /people?search=...`
    pub async fn search(&self, term: &str) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::get().path("/people").query("search", term))
            .await
    }

    /// Fetches one person by id or target name. `GET /people/{person}`
    pub async fn get(&self, person: &str) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::get().path(format!("/people/{person}")))
            .await
    }

    /// Creates a person. `POST /people`
    pub async fn create(&self, body: Value) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::post().path("/people").json(body))
            .await
    }

    /// Deletes a person. `DELETE /people/{person}`
    pub async fn delete(&self, person: &str) -> Result<HttpResponse, XmApiError> {
        self.client
            .send(RequestSpec::delete().path(format!("/people/{person}")))
            .await
    }
}
