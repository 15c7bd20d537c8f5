// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Directory configuration.

use std::str::FromStr;
use std::time::Duration;

use tracing::{Level, event};

use crate::error::DirectoryError;

/// Default number of cache partitions.
pub const DEFAULT_CACHE_PARTITIONS: isize = 7;

/// Default base URL of the upstream directory API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default path segment under which the upstream API serves users.
pub const DEFAULT_API_USER: &str = "users";

/// Default limit on a single upstream request, including reading the response body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable overriding [`DirectoryConfig::api_url`].
pub const API_URL_VAR: &str = "GITHUB_API_URL";

/// Environment variable overriding [`DirectoryConfig::api_user`].
pub const API_USER_VAR: &str = "GITHUB_API_USER";

/// Environment variable overriding [`DirectoryConfig::cache_partitions`].
pub const CACHE_PARTITIONS_VAR: &str = "CACHE_PARTITIONS";

/// Settings of a [`UserDirectory`][crate::UserDirectory].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use ringshard_directory::DirectoryConfig;
///
/// let config = DirectoryConfig::default()
///     .with_api_url("http://localhost:9000")
///     .with_cache_partitions(3)
///     .with_request_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.user_url("octocat"), "http://localhost:9000/users/octocat");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    cache_partitions: isize,
    api_url: String,
    api_user: String,
    request_timeout: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            cache_partitions: DEFAULT_CACHE_PARTITIONS,
            api_url: DEFAULT_API_URL.to_string(),
            api_user: DEFAULT_API_USER.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl DirectoryConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Unset or empty variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidSetting`] if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, DirectoryError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidSetting`] if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DirectoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let mut config = Self::default();

        if let Some(partitions) = read(CACHE_PARTITIONS_VAR) {
            config.cache_partitions = parse(CACHE_PARTITIONS_VAR, partitions)?;
        }
        if let Some(api_url) = read(API_URL_VAR) {
            config.api_url = api_url;
        }
        if let Some(api_user) = read(API_USER_VAR) {
            config.api_user = api_user;
        }

        event!(
            Level::DEBUG,
            cache_partitions = config.cache_partitions,
            api_url = %config.api_url,
            "directory configuration loaded"
        );
        Ok(config)
    }

    /// Sets the number of cache partitions.
    #[must_use]
    pub const fn with_cache_partitions(mut self, partitions: isize) -> Self {
        self.cache_partitions = partitions;
        self
    }

    /// Sets the base URL of the upstream API.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the path segment under which the upstream API serves users.
    #[must_use]
    pub fn with_api_user(mut self, api_user: impl Into<String>) -> Self {
        self.api_user = api_user.into();
        self
    }

    /// Sets the limit on a single upstream request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the number of cache partitions.
    #[must_use]
    pub const fn cache_partitions(&self) -> isize {
        self.cache_partitions
    }

    /// Returns the base URL of the upstream API.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the path segment under which the upstream API serves users.
    #[must_use]
    pub fn api_user(&self) -> &str {
        &self.api_user
    }

    /// Returns the limit on a single upstream request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the upstream URL describing `login`.
    #[must_use]
    pub fn user_url(&self, login: &str) -> String {
        format!("{}/{}/{}", self.api_url, self.api_user, login)
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, DirectoryError> {
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|_parse_error| DirectoryError::InvalidSetting { name, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = DirectoryConfig::from_lookup(lookup(&[])).expect("defaults are valid");

        assert_eq!(config, DirectoryConfig::default());
        assert_eq!(config.cache_partitions(), 7);
        assert_eq!(config.api_url(), "https://api.github.com");
        assert_eq!(config.api_user(), "users");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.user_url("thienohs"), "https://api.github.com/users/thienohs");
    }

    #[test]
    fn environment_overrides() {
        let config = DirectoryConfig::from_lookup(lookup(&[
            (CACHE_PARTITIONS_VAR, "3"),
            (API_URL_VAR, "http://127.0.0.1:1234"),
            (API_USER_VAR, "people"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.cache_partitions(), 3);
        assert_eq!(config.user_url("x"), "http://127.0.0.1:1234/people/x");
    }

    #[test]
    fn empty_values_keep_defaults() {
        let config = DirectoryConfig::from_lookup(lookup(&[(CACHE_PARTITIONS_VAR, ""), (API_URL_VAR, "")])).expect("valid");

        assert_eq!(config, DirectoryConfig::default());
    }

    #[test]
    fn unparsable_partition_count_is_rejected() {
        let error = DirectoryConfig::from_lookup(lookup(&[(CACHE_PARTITIONS_VAR, "many")])).expect_err("invalid count");

        assert!(matches!(
            error,
            DirectoryError::InvalidSetting { name: CACHE_PARTITIONS_VAR, ref value } if value == "many"
        ));
    }

    #[test]
    fn negative_partitions_parse_and_are_left_to_the_cache() {
        let config = DirectoryConfig::from_lookup(lookup(&[(CACHE_PARTITIONS_VAR, " -1 ")])).expect("parses");

        assert_eq!(config.cache_partitions(), -1);
    }

    #[test]
    fn builder_setters() {
        let config = DirectoryConfig::default()
            .with_cache_partitions(0)
            .with_api_url("http://upstream")
            .with_api_user("u")
            .with_request_timeout(Duration::from_millis(250));

        assert_eq!(config.cache_partitions(), 0);
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.user_url("a"), "http://upstream/u/a");
    }
}
