// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

/// An error raised by a [`UserSource`][crate::UserSource] while fetching a user.
///
/// These errors never escape [`UserDirectory::retrieve_users`][crate::UserDirectory::retrieve_users];
/// they are reported per login in the result's `errors` list.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The request could not be sent or the response could not be read.
    #[error("{0}")]
    Transport(Cow<'static, str>),

    /// The upstream directory did not answer within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream directory answered with an unexpected status code.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body was not a valid user record.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl SourceError {
    /// Creates a transport error from a description.
    pub fn transport(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Transport(message.into())
    }
}

/// An error raised while configuring a [`UserDirectory`][crate::UserDirectory].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// A configuration value could not be parsed.
    #[error("invalid value {value:?} for {name}")]
    InvalidSetting {
        /// Name of the setting.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The cache could not be constructed.
    #[error(transparent)]
    Cache(#[from] ringshard::Error),
}
