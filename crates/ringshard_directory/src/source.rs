// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::future::Future;
use std::sync::Arc;

use crate::error::SourceError;
use crate::model::UserInfo;

/// The authoritative directory users are fetched from on a cache miss.
///
/// An implementation typically issues `GET {api_url}/{api_user}/{login}` (see
/// [`DirectoryConfig::user_url`][crate::DirectoryConfig::user_url]) and decodes the body with
/// [`UserInfo::from_json`]. A response describing an unknown user is a successful fetch whose
/// record satisfies [`UserInfo::is_not_found`], not an error.
///
/// # Examples
///
/// ```
/// use ringshard_directory::{SourceError, UserInfo, UserSource};
///
/// struct Fixed;
///
/// impl UserSource for Fixed {
///     async fn fetch(&self, login: &str) -> Result<UserInfo, SourceError> {
///         Ok(UserInfo {
///             login: login.to_string(),
///             ..UserInfo::default()
///         })
///     }
/// }
/// ```
pub trait UserSource: Send + Sync {
    /// Fetches the record of `login`.
    fn fetch(&self, login: &str) -> impl Future<Output = Result<UserInfo, SourceError>> + Send;
}

impl<S: UserSource> UserSource for Arc<S> {
    fn fetch(&self, login: &str) -> impl Future<Output = Result<UserInfo, SourceError>> + Send {
        (**self).fetch(login)
    }
}
