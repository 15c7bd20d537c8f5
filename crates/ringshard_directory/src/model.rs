// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Records exchanged with the upstream directory and returned to callers.

use std::sync::Arc;

use ringshard::Cacheable;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::SourceError;

/// Message the upstream directory returns in place of a user that does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Not Found";

/// A user as described by the upstream directory.
///
/// The same shape is used to decode upstream responses, to cache users and to render them back
/// to callers. `avg_followers_per_public_repo` is not provided by the upstream directory; it is
/// filled in by [`with_derived_ratio`](Self::with_derived_ratio) before a record is cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Status message, only present on error responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Login handle; also the cache key.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub login: String,
    /// Company the user lists on their profile.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    /// Number of followers.
    #[serde(default)]
    pub followers: u64,
    /// Number of public repositories.
    #[serde(default)]
    pub public_repos: u64,
    /// Followers divided by public repositories, zero when there are none.
    #[serde(default)]
    pub avg_followers_per_public_repo: f32,
}

impl UserInfo {
    /// Decodes an upstream response body.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Decode`] if the body is not a JSON user object.
    pub fn from_json(body: &[u8]) -> Result<Self, SourceError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Returns the record with `avg_followers_per_public_repo` computed from its counts.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "the ratio is an approximate statistic")]
    pub fn with_derived_ratio(mut self) -> Self {
        self.avg_followers_per_public_repo = if self.public_repos > 0 {
            self.followers as f32 / self.public_repos as f32
        } else {
            0.0
        };
        self
    }

    /// Returns `true` if the record is the upstream directory's answer for an unknown user.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.message.as_deref() == Some(NOT_FOUND_MESSAGE)
    }
}

impl Cacheable for UserInfo {
    fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A per-login failure reported alongside the users that were resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl ResultError {
    /// Creates an error entry.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl Cacheable for ResultError {
    fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Outcome of [`UserDirectory::retrieve_users`][crate::UserDirectory::retrieve_users].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrieveUsersResult {
    /// Resolved users, sorted by login.
    pub users: Vec<Arc<UserInfo>>,
    /// Failures, in the order the logins were requested.
    pub errors: Vec<ResultError>,
}

impl RetrieveUsersResult {
    /// Renders the result as JSON indented with four spaces.
    ///
    /// Field order and indentation match the directory's HTTP response. Floats always carry a
    /// fractional part (`0.0`, not `0`) and `<`, `>` and `&` are written as-is rather than as
    /// `\u003c`-style escapes, so the output is equivalent JSON but not byte-identical to an
    /// HTML-safe encoder.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        if self.serialize(&mut serializer).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Cacheable for RetrieveUsersResult {
    fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
