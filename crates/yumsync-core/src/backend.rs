//! The backend contract and the registry mapping backend names to factories.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    backends::primary::PrimaryBackend, constants::PRIMARY_BACKEND, error::YumError,
    package::Package, repository::RepositoryInfo, YumResult,
};

/// A package database technology able to answer queries for one repository.
///
/// A backend is created unloaded. [`Backend::load_db`] must succeed before the
/// query methods return anything useful.
pub trait Backend: Send {
    /// Key of this backend's entry in repomd.xml.
    fn yum_data_type(&self) -> &str;

    /// Whether a loadable database is already on disk. Must not touch it.
    fn has_db(&self) -> bool;

    /// Downloads the database from `url` and commits it.
    ///
    /// Safe to call repeatedly. A failure leaves any previously committed
    /// database in place.
    fn get_latest_db(&mut self, url: &str) -> YumResult<()>;

    /// Loads the committed database.
    fn load_db(&mut self) -> YumResult<()>;

    /// Newest package called `name`, optionally pinned to an exact version and release.
    fn find_latest_matching_name(
        &self,
        name: &str,
        version: Option<&str>,
        release: Option<&str>,
    ) -> YumResult<Arc<Package>>;

    /// Newest package satisfying `requirement` (`name [op evr]`).
    fn find_latest_matching_require(&self, requirement: &str) -> YumResult<Arc<Package>>;

    /// Every loaded package; empty before [`Backend::load_db`].
    fn packages(&self) -> Vec<Arc<Package>>;
}

type BackendFactory = Box<dyn Fn(&RepositoryInfo) -> YumResult<Box<dyn Backend>> + Send + Sync>;

/// Name-to-factory table used to instantiate candidate backends.
///
/// Names are registered once; populate the registry at startup and hand it to
/// the [`Synchronizer`](crate::sync::Synchronizer).
#[derive(Default)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.factories.insert(
            PRIMARY_BACKEND.to_string(),
            Box::new(|repo| Ok(Box::new(PrimaryBackend::new(repo)) as Box<dyn Backend>)),
        );
        registry
    }

    /// Registers `factory` under `name`.
    ///
    /// # Errors
    ///
    /// [`YumError::DuplicateBackend`] if `name` is already taken.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> YumResult<()>
    where
        F: Fn(&RepositoryInfo) -> YumResult<Box<dyn Backend>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(YumError::DuplicateBackend(name));
        }
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    /// Instantiates backend `name` bound to `repo`.
    ///
    /// # Errors
    ///
    /// [`YumError::UnknownBackend`] for unregistered names, or whatever the
    /// factory itself reports.
    pub fn create(&self, name: &str, repo: &RepositoryInfo) -> YumResult<Box<dyn Backend>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| YumError::UnknownBackend(name.to_string()))?;
        factory(repo)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::package;

    struct NullBackend;

    impl Backend for NullBackend {
        fn yum_data_type(&self) -> &str {
            "null"
        }

        fn has_db(&self) -> bool {
            false
        }

        fn get_latest_db(&mut self, _url: &str) -> YumResult<()> {
            Ok(())
        }

        fn load_db(&mut self) -> YumResult<()> {
            Ok(())
        }

        fn find_latest_matching_name(
            &self,
            name: &str,
            version: Option<&str>,
            release: Option<&str>,
        ) -> YumResult<Arc<Package>> {
            package::find_latest_matching_name(&[], name, version, release)
        }

        fn find_latest_matching_require(&self, requirement: &str) -> YumResult<Arc<Package>> {
            package::find_latest_matching_require(&[], requirement)
        }

        fn packages(&self) -> Vec<Arc<Package>> {
            Vec::new()
        }
    }

    fn repo_info() -> RepositoryInfo {
        RepositoryInfo::new("base", "https://mirror.example.org/base", PathBuf::from("/cache/base"))
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = BackendRegistry::new();
        registry
            .register("null", |_| Ok(Box::new(NullBackend) as Box<dyn Backend>))
            .unwrap();

        let backend = registry.create("null", &repo_info()).unwrap();
        assert_eq!(backend.yum_data_type(), "null");
        assert!(registry.contains("null"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = BackendRegistry::new();
        registry
            .register("null", |_| Ok(Box::new(NullBackend) as Box<dyn Backend>))
            .unwrap();
        let err = registry
            .register("null", |_| Ok(Box::new(NullBackend) as Box<dyn Backend>))
            .unwrap_err();
        assert!(matches!(err, YumError::DuplicateBackend(name) if name == "null"));
    }

    #[test]
    fn test_unknown_backend() {
        let registry = BackendRegistry::new();
        assert!(matches!(
            registry.create("sqlite", &repo_info()),
            Err(YumError::UnknownBackend(name)) if name == "sqlite"
        ));
    }

    #[test]
    fn test_with_defaults() {
        let registry = BackendRegistry::with_defaults();
        assert_eq!(registry.names(), ["primary"]);

        let backend = registry.create("primary", &repo_info()).unwrap();
        assert_eq!(backend.yum_data_type(), "primary");
        assert!(backend.packages().is_empty());
    }
}
