// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use ringshard::Cache;
use tracing::{debug, warn};

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, SourceError};
use crate::model::{ResultError, RetrieveUsersResult, UserInfo};
use crate::source::UserSource;

/// Resolves user logins, serving repeated lookups from a partitioned cache.
///
/// Every record fetched from the [`UserSource`] is cached under its login, including records
/// describing unknown users, so each login reaches the source at most once per cache lifetime.
/// Failed fetches are not cached.
pub struct UserDirectory<S> {
    cache: Cache<UserInfo>,
    source: S,
}

impl<S: UserSource> UserDirectory<S> {
    /// Creates a directory with a cache sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Cache`] if the configured partition count is negative.
    pub fn new(config: &DirectoryConfig, source: S) -> Result<Self, DirectoryError> {
        let cache = Cache::builder().partitions(config.cache_partitions()).build()?;
        Ok(Self::with_cache(cache, source))
    }

    /// Creates a directory over an existing cache.
    #[must_use]
    pub fn with_cache(cache: Cache<UserInfo>, source: S) -> Self {
        Self { cache, source }
    }

    /// Returns the cache backing this directory.
    #[must_use]
    pub fn cache(&self) -> &Cache<UserInfo> {
        &self.cache
    }

    /// Resolves a comma-separated list of logins.
    ///
    /// Entries that are blank after trimming are skipped, and an entry identical to an earlier
    /// one is only resolved once. Known users are returned sorted by login; unknown users and
    /// fetch failures are reported in `errors` in request order.
    pub async fn retrieve_users(&self, usernames: &str) -> RetrieveUsersResult {
        let mut result = RetrieveUsersResult::default();
        let mut processed = HashSet::new();

        for login in usernames.split(',') {
            if login.trim().is_empty() || !processed.insert(login) {
                continue;
            }

            match self.lookup(login).await {
                Ok(user) if user.is_not_found() => {
                    result.errors.push(ResultError::new(format!("username {login:?} not found")));
                }
                Ok(user) => result.users.push(user),
                Err(error) => {
                    warn!(login, %error, "user lookup failed");
                    result
                        .errors
                        .push(ResultError::new(format!("encounter err for username {login:?}: {error}")));
                }
            }
        }

        result.users.sort_by(|a, b| a.login.cmp(&b.login));
        result
    }

    async fn lookup(&self, login: &str) -> Result<Arc<UserInfo>, SourceError> {
        if let Some(user) = self.cache.get(login) {
            debug!(login, "user served from cache");
            return Ok(user);
        }

        debug!(login, "user not cached, fetching");
        let user = Arc::new(self.source.fetch(login).await?.with_derived_ratio());
        self.cache.set(login, Arc::clone(&user));
        Ok(user)
    }
}

impl<S> fmt::Debug for UserDirectory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDirectory")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
