// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! HTTP client for the upstream user directory.

use std::fmt;
use std::time::Duration;

use http::header::{ACCEPT, HeaderName, HeaderValue};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::rt::TokioExecutor;
use tracing::{Level, event};

use crate::config::DirectoryConfig;
use crate::error::SourceError;
use crate::model::UserInfo;
use crate::source::UserSource;

/// Media type requested from the upstream API.
pub const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Header pinning the upstream API version.
pub const API_VERSION_HEADER: &str = "x-github-api-version";

/// Upstream API version requested with every call.
pub const API_VERSION: &str = "2022-11-28";

/// A [`UserSource`] that issues `GET {api_url}/{api_user}/{login}` against an HTTP directory.
///
/// Each request carries the `Accept` and API version headers and is bounded by
/// [`DirectoryConfig::request_timeout`], which covers both the response head and the body.
///
/// A `404 Not Found` whose body is the directory's not-found record is returned as that record,
/// so callers see an unknown user rather than a failure. Any other non-success status becomes
/// [`SourceError::Status`].
///
/// [`HttpUserSource::new`] speaks plain HTTP. Pass a client with a TLS-capable connector to
/// [`with_client`](HttpUserSource::with_client) to reach `https` endpoints.
pub struct HttpUserSource<C = HttpConnector> {
    client: Client<C, Empty<Bytes>>,
    config: DirectoryConfig,
}

impl HttpUserSource {
    /// Creates a source with a plain HTTP client.
    #[must_use]
    pub fn new(config: &DirectoryConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self::with_client(config, client)
    }
}

impl<C> HttpUserSource<C> {
    /// Creates a source over an existing client.
    #[must_use]
    pub fn with_client(config: &DirectoryConfig, client: Client<C, Empty<Bytes>>) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Returns the configuration requests are built from.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }
}

impl<C> HttpUserSource<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    async fn request(&self, login: &str) -> Result<UserInfo, SourceError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.config.user_url(login))
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE))
            .header(HeaderName::from_static(API_VERSION_HEADER), HeaderValue::from_static(API_VERSION))
            .body(Empty::new())
            .map_err(|error| SourceError::transport(error.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|error| SourceError::transport(error.to_string()))?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|error| SourceError::transport(error.to_string()))?
            .to_bytes();

        event!(Level::DEBUG, login, status = status.as_u16(), bytes = body.len(), "upstream answered");

        if status.is_success() {
            return UserInfo::from_json(&body);
        }

        match UserInfo::from_json(&body) {
            Ok(user) if status == StatusCode::NOT_FOUND && user.is_not_found() => Ok(user),
            _ => Err(SourceError::Status(status.as_u16())),
        }
    }
}

impl<C> UserSource for HttpUserSource<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    async fn fetch(&self, login: &str) -> Result<UserInfo, SourceError> {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, self.request(login)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(SourceError::Timeout(timeout)),
        }
    }
}

impl<C> fmt::Debug for HttpUserSource<C> {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpUserSource")
            .field("api_url", &self.config.api_url())
            .field("api_user", &self.config.api_user())
            .field("request_timeout", &self.config.request_timeout())
            .finish_non_exhaustive()
    }
}
