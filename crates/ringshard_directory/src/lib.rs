// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! User-directory lookups served through a [`ringshard`] cache.
//!
//! [`UserDirectory`] resolves comma-separated login lists against a [`UserSource`], caching every
//! record it fetches in a partitioned [`ringshard::Cache`]. Records are [`UserInfo`] values whose
//! follower-per-repository ratio is derived before they are cached, so the cache only ever holds
//! complete records.
//!
//! [`HttpUserSource`] is the stock [`UserSource`]: it queries a GitHub-compatible REST API
//! through `hyper`.
//!
//! # Example
//!
//! ```
//! use ringshard_directory::{DirectoryConfig, SourceError, UserDirectory, UserInfo, UserSource};
//!
//! struct Upstream;
//!
//! impl UserSource for Upstream {
//!     async fn fetch(&self, login: &str) -> Result<UserInfo, SourceError> {
//!         Ok(UserInfo {
//!             login: login.to_string(),
//!             followers: 10,
//!             public_repos: 4,
//!             ..UserInfo::default()
//!         })
//!     }
//! }
//!
//! # block_on(async {
//! let directory = UserDirectory::new(&DirectoryConfig::default(), Upstream)?;
//! let result = directory.retrieve_users("zed,amy,zed").await;
//!
//! let logins: Vec<_> = result.users.iter().map(|user| user.login.as_str()).collect();
//! assert_eq!(logins, ["amy", "zed"]);
//! assert_eq!(result.users[0].avg_followers_per_public_repo, 2.5);
//! # Ok::<(), ringshard_directory::DirectoryError>(())
//! # }).unwrap();
//! # fn block_on<F: std::future::Future>(future: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
//! # }
//! ```

mod config;
mod directory;
mod error;
mod model;
mod source;
mod upstream;

pub use config::{
    API_URL_VAR, API_USER_VAR, CACHE_PARTITIONS_VAR, DEFAULT_API_URL, DEFAULT_API_USER, DEFAULT_CACHE_PARTITIONS,
    DEFAULT_REQUEST_TIMEOUT, DirectoryConfig,
};
pub use directory::UserDirectory;
pub use error::{DirectoryError, SourceError};
pub use model::{NOT_FOUND_MESSAGE, ResultError, RetrieveUsersResult, UserInfo};
pub use source::UserSource;
pub use upstream::{ACCEPT_MEDIA_TYPE, API_VERSION, API_VERSION_HEADER, HttpUserSource};
