use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;
use yumsync_utils::{
    path::{resolve_path, xdg_cache_home, xdg_config_home},
    time::parse_duration,
};

use crate::{
    error::{ConfigError, Result},
    repository::Repository,
};

pub const DEFAULT_BACKEND: &str = "primary";

/// Application's configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Root directory for per-repository caches.
    /// Default: $XDG_CACHE_HOME/yumsync
    pub cache_path: Option<String>,

    /// Backends tried for every repository without its own list, in priority order.
    /// Default: ["primary"]
    pub backends: Option<Vec<String>>,

    /// Whether `sync` compares against the remote repomd.xml or trusts the local cache.
    /// Default: true
    pub check_for_updates: Option<bool>,

    /// Global HTTP timeout (e.g. "30s", "2m"). Unset means no timeout.
    pub timeout: Option<String>,

    /// List of configured repositories.
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("YUMSYNC_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("yumsync").join("config.toml"),
    })
});

pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .to_path_buf()
}

pub fn set_config_path(path: PathBuf) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path;
}

pub fn init() -> Result<()> {
    let config = Config::new()?;
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    Ok(())
}

pub fn get_config() -> Config {
    let mut guard = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    guard.get_or_insert_with(Config::default_config).clone()
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            cache_path: Some(format!("{}/yumsync", xdg_cache_home().display())),
            backends: Some(vec![DEFAULT_BACKEND.to_string()]),
            check_for_updates: Some(true),
            timeout: None,
            repositories: Vec::new(),
        }
    }

    /// Loads the configuration file, falling back to the default configuration when the
    /// file does not exist.
    pub fn new() -> Result<Self> {
        Self::from_path(&config_path())
    }

    pub fn from_path(config_path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Config file {} not found, using defaults",
                    config_path.display()
                );
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills defaults and validates the repository list.
    pub fn resolve(&mut self) -> Result<()> {
        let default_backends = self
            .backends
            .get_or_insert_with(|| vec![DEFAULT_BACKEND.to_string()]);
        if default_backends.is_empty() {
            return Err(ConfigError::EmptyBackendList("global configuration".into()));
        }

        self.check_for_updates.get_or_insert(true);

        if let Some(timeout) = &self.timeout {
            if parse_duration(timeout).is_none() {
                return Err(ConfigError::InvalidTimeout(timeout.clone()));
            }
        }

        let mut seen_repos = HashSet::new();

        for repo in &mut self.repositories {
            if repo.name.trim().is_empty() || repo.name.contains('/') {
                return Err(ConfigError::InvalidRepository(repo.name.clone()));
            }
            if !seen_repos.insert(repo.name.clone()) {
                return Err(ConfigError::DuplicateRepositoryName(repo.name.clone()));
            }

            let valid_url = Url::parse(&repo.url)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid_url {
                return Err(ConfigError::InvalidRepositoryUrl {
                    name: repo.name.clone(),
                    url: repo.url.clone(),
                });
            }

            if repo.backends.as_ref().is_some_and(|b| b.is_empty()) {
                return Err(ConfigError::EmptyBackendList(repo.name.clone()));
            }

            repo.enabled.get_or_insert(true);
        }

        Ok(())
    }

    pub fn get_cache_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("YUMSYNC_CACHE") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.cache_path {
            Some(cache_path) => Ok(resolve_path(cache_path)?),
            None => Ok(xdg_cache_home().join("yumsync")),
        }
    }

    pub fn default_backends(&self) -> Vec<String> {
        self.backends
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_BACKEND.to_string()])
    }

    /// Candidate backend names for `repo`, in priority order.
    pub fn backends_for(&self, repo: &Repository) -> Vec<String> {
        repo.backends_or(&self.default_backends()).to_vec()
    }

    pub fn check_for_updates(&self) -> bool {
        self.check_for_updates.unwrap_or(true)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.as_deref().and_then(parse_duration)
    }

    pub fn get_repository(&self, repo_name: &str) -> Result<&Repository> {
        self.repositories
            .iter()
            .find(|repo| repo.name == repo_name && repo.is_enabled())
            .ok_or_else(|| ConfigError::MissingRepository(repo_name.to_string()))
    }

    pub fn enabled_repositories(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.iter().filter(|repo| repo.is_enabled())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = config_path();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    Config::default_config().save()?;
    info!(
        "Default configuration file generated at: {}",
        config_path.display()
    );
    Ok(())
}
