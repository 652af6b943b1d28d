use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use yumsync_utils::path::resolve_path;

use crate::{config::get_config, error::Result};

/// Defines a remote YUM repository.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Repository {
    /// Unique name of the repository.
    pub name: String,

    /// Base URL of the repository; `repodata/repomd.xml` lives below it.
    pub url: String,

    /// Ordered list of backends to try for this repository.
    /// Default: the global `backends` list
    pub backends: Option<Vec<String>>,

    /// Directory holding the cached metadata and backend databases.
    /// Default: `<cache_path>/<name>`
    pub cache_dir: Option<String>,

    /// Whether the repository is enabled.
    /// Default: true
    pub enabled: Option<bool>,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            backends: None,
            cache_dir: None,
            enabled: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Base URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Cache directory of this repository using the global configuration.
    pub fn get_cache_dir(&self) -> Result<PathBuf> {
        self.cache_dir_in(&get_config().get_cache_path()?)
    }

    /// Cache directory of this repository below `cache_root` unless overridden.
    pub fn cache_dir_in(&self, cache_root: &Path) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(resolve_path(dir)?),
            None => Ok(cache_root.join(&self.name)),
        }
    }

    /// Candidate backend names in priority order.
    pub fn backends_or<'a>(&'a self, defaults: &'a [String]) -> &'a [String] {
        self.backends.as_deref().unwrap_or(defaults)
    }
}
