use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use yumsync_config::{config::Config, repository::Repository as RepositoryConfig};
use yumsync_registry::{repomd_url, MetadataSource, REPOMD_FILE};
use yumsync_utils::fs::ensure_dir_exists;

use crate::{
    backend::Backend,
    error::YumError,
    package::Package,
    sync::{SyncMode, Synchronizer},
    YumResult,
};

/// Where a repository lives, remotely and in the cache.
///
/// This is what backend factories receive; it never changes after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub name: String,
    /// Base URL without trailing slash.
    pub url: String,
    pub repomd_url: String,
    /// Cached copy of the last repomd.xml that came with a successful download.
    pub local_repomd: PathBuf,
    pub cache_dir: PathBuf,
}

impl RepositoryInfo {
    pub fn new(name: impl Into<String>, url: &str, cache_dir: impl Into<PathBuf>) -> Self {
        let url = url.trim_end_matches('/').to_string();
        let cache_dir = cache_dir.into();
        Self {
            name: name.into(),
            repomd_url: repomd_url(&url),
            local_repomd: cache_dir.join(REPOMD_FILE),
            url,
            cache_dir,
        }
    }

    /// Absolute URL of a `location` listed in repomd.xml.
    pub fn location_url(&self, location: &str) -> String {
        format!("{}/{}", self.url, location)
    }
}

/// A YUM repository together with the backend selected to query it.
pub struct Repository {
    info: RepositoryInfo,
    backends: Vec<String>,
    active: Option<(String, Box<dyn Backend>)>,
}

impl Repository {
    /// Creates the repository and its cache directory. No backend is active yet.
    pub fn new(
        name: impl Into<String>,
        url: &str,
        cache_dir: impl Into<PathBuf>,
        backends: Vec<String>,
    ) -> YumResult<Self> {
        let info = RepositoryInfo::new(name, url, cache_dir);
        ensure_dir_exists(&info.cache_dir)?;

        Ok(Self {
            info,
            backends,
            active: None,
        })
    }

    /// Builds the repository described by a configuration entry.
    pub fn from_config(repo: &RepositoryConfig, config: &Config) -> YumResult<Self> {
        let cache_dir = repo.cache_dir_in(&config.get_cache_path()?)?;
        Self::new(
            repo.name.clone(),
            repo.base_url(),
            cache_dir,
            config.backends_for(repo),
        )
    }

    /// Creates the repository and, when `setup` is given, synchronizes it so that
    /// a backend is active on return.
    pub fn open<S: MetadataSource>(
        repo: &RepositoryConfig,
        config: &Config,
        setup: Option<SyncMode>,
        synchronizer: &Synchronizer<'_, S>,
    ) -> YumResult<Self> {
        let mut repository = Self::from_config(repo, config)?;
        if let Some(mode) = setup {
            synchronizer.sync(&mut repository, mode)?;
        }
        Ok(repository)
    }

    pub fn info(&self) -> &RepositoryInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn cache_dir(&self) -> &Path {
        &self.info.cache_dir
    }

    /// Candidate backend names in priority order.
    pub fn backends(&self) -> &[String] {
        &self.backends
    }

    /// Name of the active backend, if any.
    pub fn active_backend(&self) -> Option<&str> {
        self.active.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn backend(&self) -> Option<&dyn Backend> {
        self.active.as_ref().map(|(_, backend)| backend.as_ref())
    }

    pub(crate) fn set_backend(&mut self, name: String, backend: Box<dyn Backend>) {
        self.active = Some((name, backend));
    }

    pub(crate) fn clear_backend(&mut self) {
        self.active = None;
    }

    fn require_backend(&self) -> YumResult<&dyn Backend> {
        self.backend()
            .ok_or_else(|| YumError::NoActiveBackend(self.info.name.clone()))
    }

    pub fn find_latest_matching_name(
        &self,
        name: &str,
        version: Option<&str>,
        release: Option<&str>,
    ) -> YumResult<Arc<Package>> {
        self.require_backend()?
            .find_latest_matching_name(name, version, release)
    }

    pub fn find_latest_matching_require(&self, requirement: &str) -> YumResult<Arc<Package>> {
        self.require_backend()?
            .find_latest_matching_require(requirement)
    }

    pub fn packages(&self) -> YumResult<Vec<Arc<Package>>> {
        Ok(self.require_backend()?.packages())
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("info", &self.info)
            .field("backends", &self.backends)
            .field("active", &self.active_backend())
            .finish()
    }
}
