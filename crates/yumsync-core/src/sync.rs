//! Backend selection and metadata synchronization.
//!
//! Candidates are tried in the configured order. Each one ends as either
//! [`Candidate::Selected`] or [`Candidate::Skipped`]; the first selected
//! candidate becomes the repository's active backend and later names are never
//! looked at. Only errors reading or decoding repomd.xml abort a run early.

use std::fmt;

use tracing::{debug, info, warn};
use yumsync_registry::{parse_repomd, write_metadata, MetadataSource, RepoMdMap};

use crate::{
    backend::{Backend, BackendRegistry},
    error::YumError,
    repository::{Repository, RepositoryInfo},
    YumResult,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Compare remote and cached repomd.xml and download stale databases.
    Remote,
    /// Use whatever the cache holds without touching the network.
    Local,
}

impl SyncMode {
    pub fn from_check_for_updates(check_for_updates: bool) -> Self {
        if check_for_updates {
            Self::Remote
        } else {
            Self::Local
        }
    }
}

/// Why a candidate backend was passed over.
#[derive(Debug)]
pub enum SkipReason {
    /// The registry could not instantiate it.
    Unavailable(YumError),
    /// repomd.xml has no entry for its data type.
    MissingDataType(String),
    Download(YumError),
    /// The database downloaded but repomd.xml could not be cached.
    Persist(YumError),
    Load(YumError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "unavailable: {err}"),
            Self::MissingDataType(data_type) => {
                write!(f, "repository does not provide [{data_type}] data")
            }
            Self::Download(err) => write!(f, "problem updating database: {err}"),
            Self::Persist(err) => write!(f, "problem updating local repomd.xml: {err}"),
            Self::Load(err) => write!(f, "problem loading database: {err}"),
        }
    }
}

/// Outcome of evaluating one candidate backend.
pub enum Candidate {
    Selected {
        backend: Box<dyn Backend>,
        /// Whether a fresh database was downloaded.
        updated: bool,
    },
    Skipped(SkipReason),
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selected { backend, updated } => {
                f.debug_struct("Selected")
                    .field("data_type", &backend.yum_data_type())
                    .field("updated", updated)
                    .finish()
            }
            Self::Skipped(reason) => f.debug_tuple("Skipped").field(reason).finish(),
        }
    }
}

/// Summary of a successful synchronization.
#[derive(Debug)]
pub struct SyncReport {
    /// Name of the backend that became active.
    pub backend: String,
    pub updated: bool,
    /// Candidates tried before the winner, in order.
    pub skipped: Vec<(String, SkipReason)>,
}

/// Evaluates a candidate against remote and cached metadata.
///
/// The database is downloaded when none exists yet or when the remote entry is
/// strictly newer than the cached one. A data type missing from the cached
/// metadata does not by itself force a download. After a successful download
/// `remote_data` replaces the cached repomd.xml.
pub fn remote_candidate(
    name: &str,
    info: &RepositoryInfo,
    mut backend: Box<dyn Backend>,
    remote: &RepoMdMap,
    local: &RepoMdMap,
    remote_data: &[u8],
) -> Candidate {
    let data_type = backend.yum_data_type().to_string();
    let Some(remote_md) = remote.get(&data_type) else {
        return Candidate::Skipped(SkipReason::MissingDataType(data_type));
    };

    let newer = local
        .get(&data_type)
        .is_some_and(|local_md| remote_md.timestamp > local_md.timestamp);
    let updated = !backend.has_db() || newer;

    if updated {
        let url = info.location_url(&remote_md.location);
        info!("Updating the database for [{}] from {}", name, url);

        if let Err(err) = backend.get_latest_db(&url) {
            return Candidate::Skipped(SkipReason::Download(err));
        }
        if let Err(err) = write_metadata(remote_data, &info.local_repomd) {
            return Candidate::Skipped(SkipReason::Persist(err.into()));
        }
    } else {
        debug!("Database for [{}] is up to date", name);
    }

    match backend.load_db() {
        Ok(()) => Candidate::Selected { backend, updated },
        Err(err) => Candidate::Skipped(SkipReason::Load(err)),
    }
}

/// Evaluates a candidate against cached metadata only. Never downloads.
pub fn local_candidate(mut backend: Box<dyn Backend>, local: &RepoMdMap) -> Candidate {
    let data_type = backend.yum_data_type().to_string();
    if !local.contains_key(&data_type) {
        return Candidate::Skipped(SkipReason::MissingDataType(data_type));
    }

    match backend.load_db() {
        Ok(()) => {
            Candidate::Selected {
                backend,
                updated: false,
            }
        }
        Err(err) => Candidate::Skipped(SkipReason::Load(err)),
    }
}

/// Selects and activates one backend per repository.
pub struct Synchronizer<'r, S> {
    registry: &'r BackendRegistry,
    source: S,
}

impl<'r, S: MetadataSource> Synchronizer<'r, S> {
    pub fn new(registry: &'r BackendRegistry, source: S) -> Self {
        Self { registry, source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sync(&self, repo: &mut Repository, mode: SyncMode) -> YumResult<SyncReport> {
        match mode {
            SyncMode::Remote => self.sync_remote(repo),
            SyncMode::Local => self.sync_local(repo),
        }
    }

    /// Fetches the remote repomd.xml, refreshes stale databases and activates
    /// the first candidate that loads.
    ///
    /// # Errors
    ///
    /// Fetch, read or parse failures of either repomd.xml abort immediately.
    /// Any previously active backend is dropped first, whatever the outcome.
    /// [`YumError::NoValidBackend`] when every candidate was skipped.
    pub fn sync_remote(&self, repo: &mut Repository) -> YumResult<SyncReport> {
        info!("Checking [{}] for metadata updates", repo.name());
        repo.clear_backend();

        let remote_data = self.source.remote(&repo.info().repomd_url)?;
        let remote = parse_repomd(&remote_data)?;

        let local_data = self.source.local(&repo.info().local_repomd)?;
        let local = parse_repomd(&local_data)?;

        self.select(repo, |name, info, backend| {
            remote_candidate(name, info, backend, &remote, &local, &remote_data)
        })
    }

    /// Activates the first candidate whose database loads from the cache.
    pub fn sync_local(&self, repo: &mut Repository) -> YumResult<SyncReport> {
        info!("Loading [{}] from the local cache", repo.name());
        repo.clear_backend();

        let local_data = self.source.local(&repo.info().local_repomd)?;
        let local = parse_repomd(&local_data)?;

        self.select(repo, |_, _, backend| local_candidate(backend, &local))
    }

    fn select<F>(&self, repo: &mut Repository, evaluate: F) -> YumResult<SyncReport>
    where
        F: Fn(&str, &RepositoryInfo, Box<dyn Backend>) -> Candidate,
    {
        let mut skipped = Vec::new();
        for name in repo.backends().to_vec() {
            info!("Checking availability of backend [{}]", name);

            let candidate = match self.registry.create(&name, repo.info()) {
                Ok(backend) => evaluate(&name, repo.info(), backend),
                Err(err) => Candidate::Skipped(SkipReason::Unavailable(err)),
            };

            match candidate {
                Candidate::Selected { backend, updated } => {
                    info!("Repository [{}] - chosen backend [{}]", repo.name(), name);
                    repo.set_backend(name.clone(), backend);
                    return Ok(SyncReport {
                        backend: name,
                        updated,
                        skipped,
                    });
                }
                Candidate::Skipped(reason) => {
                    warn!("Skipping backend [{}]: {}", name, reason);
                    skipped.push((name, reason));
                }
            }
        }

        Err(YumError::NoValidBackend)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        fs,
        path::Path,
        sync::{Arc, Mutex},
    };

    use yumsync_registry::{RegistryError, Result as RegistryResult};

    use super::*;
    use crate::package::{self, Package};

    #[derive(Default)]
    struct Calls {
        created: Vec<String>,
        downloads: Vec<String>,
        loads: Vec<String>,
    }

    #[derive(Clone)]
    struct FakeBackend {
        name: &'static str,
        data_type: &'static str,
        has_db: bool,
        fail_download: bool,
        fail_load: bool,
        calls: Arc<Mutex<Calls>>,
    }

    impl FakeBackend {
        fn new(name: &'static str, calls: &Arc<Mutex<Calls>>) -> Self {
            Self {
                name,
                data_type: name,
                has_db: false,
                fail_download: false,
                fail_load: false,
                calls: Arc::clone(calls),
            }
        }

        fn with_db(mut self) -> Self {
            self.has_db = true;
            self
        }

        fn failing_download(mut self) -> Self {
            self.fail_download = true;
            self
        }

        fn failing_load(mut self) -> Self {
            self.fail_load = true;
            self
        }
    }

    impl Backend for FakeBackend {
        fn yum_data_type(&self) -> &str {
            self.data_type
        }

        fn has_db(&self) -> bool {
            self.has_db
        }

        fn get_latest_db(&mut self, url: &str) -> YumResult<()> {
            self.calls.lock().unwrap().downloads.push(url.to_string());
            if self.fail_download {
                return Err(YumError::IoError {
                    action: format!("downloading {url}"),
                    source: std::io::Error::other("connection reset"),
                });
            }
            self.has_db = true;
            Ok(())
        }

        fn load_db(&mut self) -> YumResult<()> {
            self.calls.lock().unwrap().loads.push(self.name.to_string());
            if self.fail_load || !self.has_db {
                return Err(YumError::Load {
                    path: format!("/cache/{}.db", self.name).into(),
                    reason: "truncated".into(),
                });
            }
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

    struct FakeSource {
        remote: Option<String>,
        remote_calls: Cell<usize>,
    }

    impl FakeSource {
        fn new(remote: Option<String>) -> Self {
            Self {
                remote,
                remote_calls: Cell::new(0),
            }
        }
    }

    impl MetadataSource for FakeSource {
        fn remote(&self, url: &str) -> RegistryResult<Vec<u8>> {
            self.remote_calls.set(self.remote_calls.get() + 1);
            self.remote
                .clone()
                .map(String::into_bytes)
                .ok_or_else(|| {
                    RegistryError::IoError {
                        action: format!("fetching {url}"),
                        source: std::io::Error::other("unreachable"),
                    }
                })
        }

        fn local(&self, path: &Path) -> RegistryResult<Vec<u8>> {
            yumsync_registry::HttpMetadataSource.local(path)
        }
    }

    fn repomd(entries: &[(&str, &str)]) -> String {
        let data: String = entries
            .iter()
            .map(|(data_type, timestamp)| {
                format!(
                    r#"<data type="{data_type}"><checksum type="sha256">{data_type}-sum</checksum><location href="repodata/{data_type}.db"/><timestamp>{timestamp}</timestamp></data>"#
                )
            })
            .collect();
        format!(r#"<?xml version="1.0"?><repomd xmlns="http://linux.duke.edu/metadata/repo">{data}</repomd>"#)
    }

    fn registry(backends: Vec<FakeBackend>) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        for backend in backends {
            let name = backend.name;
            registry
                .register(name, move |_| {
                    backend.calls.lock().unwrap().created.push(name.to_string());
                    Ok(Box::new(backend.clone()) as Box<dyn Backend>)
                })
                .unwrap();
        }
        registry
    }

    fn repository(dir: &Path, backends: &[&str]) -> Repository {
        Repository::new(
            "base",
            "https://mirror.example.org/base",
            dir.join("base"),
            backends.iter().map(|b| b.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_fallback_after_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![
            FakeBackend::new("sqlite", &calls).failing_download(),
            FakeBackend::new("flat", &calls),
        ]);
        let remote = repomd(&[("sqlite", "200"), ("flat", "100")]);
        let sync = Synchronizer::new(&registry, FakeSource::new(Some(remote.clone())));
        let mut repo = repository(dir.path(), &["sqlite", "flat"]);

        let report = sync.sync_remote(&mut repo).unwrap();

        assert_eq!(report.backend, "flat");
        assert!(report.updated);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].1, SkipReason::Download(_)));
        assert_eq!(repo.active_backend(), Some("flat"));
        assert_eq!(
            calls.lock().unwrap().downloads,
            [
                "https://mirror.example.org/base/repodata/sqlite.db",
                "https://mirror.example.org/base/repodata/flat.db"
            ]
        );
        assert_eq!(
            fs::read_to_string(&repo.info().local_repomd).unwrap(),
            remote
        );
    }

    #[test]
    fn test_failed_candidate_does_not_persist_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![
            FakeBackend::new("sqlite", &calls).failing_download(),
            FakeBackend::new("flat", &calls).with_db(),
        ]);
        let local = repomd(&[("flat", "100")]);
        let remote = repomd(&[("sqlite", "200"), ("flat", "100")]);
        let sync = Synchronizer::new(&registry, FakeSource::new(Some(remote)));
        let mut repo = repository(dir.path(), &["sqlite", "flat"]);
        fs::write(&repo.info().local_repomd, &local).unwrap();

        let report = sync.sync_remote(&mut repo).unwrap();

        assert_eq!(report.backend, "flat");
        assert!(!report.updated);
        assert_eq!(
            fs::read_to_string(&repo.info().local_repomd).unwrap(),
            local
        );
    }

    #[test]
    fn test_no_download_when_timestamps_equal() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls).with_db()]);
        let doc = repomd(&[("primary", "1714049135.5")]);
        let sync = Synchronizer::new(&registry, FakeSource::new(Some(doc.clone())));
        let mut repo = repository(dir.path(), &["primary"]);
        fs::write(&repo.info().local_repomd, &doc).unwrap();

        let report = sync.sync_remote(&mut repo).unwrap();

        assert!(!report.updated);
        let calls = calls.lock().unwrap();
        assert!(calls.downloads.is_empty());
        assert_eq!(calls.loads, ["primary"]);
    }

    #[test]
    fn test_newer_remote_forces_download() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls).with_db()]);
        let sync = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("primary", "1000.5")]))),
        );
        let mut repo = repository(dir.path(), &["primary"]);
        fs::write(&repo.info().local_repomd, repomd(&[("primary", "1000.25")])).unwrap();

        let report = sync.sync_remote(&mut repo).unwrap();

        assert!(report.updated);
        assert_eq!(calls.lock().unwrap().downloads.len(), 1);
    }

    #[test]
    fn test_missing_local_record_does_not_force_download() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls).with_db()]);
        let sync = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("primary", "2000")]))),
        );
        let mut repo = repository(dir.path(), &["primary"]);
        fs::write(&repo.info().local_repomd, repomd(&[("filelists", "1000")])).unwrap();

        let report = sync.sync_remote(&mut repo).unwrap();

        assert!(!report.updated);
        assert!(calls.lock().unwrap().downloads.is_empty());
    }

    #[test]
    fn test_no_candidate_data_type_in_remote() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![
            FakeBackend::new("sqlite", &calls),
            FakeBackend::new("flat", &calls),
        ]);
        let sync = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("filelists", "1")]))),
        );
        let mut repo = repository(dir.path(), &["sqlite", "flat"]);

        let err = sync.sync_remote(&mut repo).unwrap_err();

        assert!(matches!(err, YumError::NoValidBackend));
        assert!(repo.active_backend().is_none());
        assert!(calls.lock().unwrap().downloads.is_empty());
    }

    #[test]
    fn test_local_mode_never_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![
            FakeBackend::new("sqlite", &calls),
            FakeBackend::new("flat", &calls).with_db(),
        ]);
        let sync = Synchronizer::new(&registry, FakeSource::new(None));
        let mut repo = repository(dir.path(), &["sqlite", "flat"]);
        fs::write(
            &repo.info().local_repomd,
            repomd(&[("sqlite", "1"), ("flat", "1")]),
        )
        .unwrap();

        let report = sync.sync(&mut repo, SyncMode::Local).unwrap();

        assert_eq!(report.backend, "flat");
        assert!(matches!(report.skipped[0].1, SkipReason::Load(_)));
        assert_eq!(sync.source().remote_calls.get(), 0);
        assert!(calls.lock().unwrap().downloads.is_empty());
    }

    #[test]
    fn test_local_mode_without_cached_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls).with_db()]);
        let sync = Synchronizer::new(&registry, FakeSource::new(None));
        let mut repo = repository(dir.path(), &["primary"]);

        let err = sync.sync_local(&mut repo).unwrap_err();

        assert!(matches!(err, YumError::NoValidBackend));
        assert!(calls.lock().unwrap().loads.is_empty());
    }

    #[test]
    fn test_sqlite_preferred_over_flat() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![
            FakeBackend::new("sqlite", &calls).with_db(),
            FakeBackend::new("flat", &calls).with_db(),
        ]);
        let remote = repomd(&[("sqlite", "2000"), ("flat", "1000")]);
        let sync = Synchronizer::new(&registry, FakeSource::new(Some(remote)));
        let mut repo = repository(dir.path(), &["sqlite", "flat"]);
        fs::write(&repo.info().local_repomd, repomd(&[("sqlite", "1000")])).unwrap();

        let report = sync.sync_remote(&mut repo).unwrap();

        assert_eq!(report.backend, "sqlite");
        assert!(report.updated);
        assert!(report.skipped.is_empty());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.created, ["sqlite"]);
        assert_eq!(
            calls.downloads,
            ["https://mirror.example.org/base/repodata/sqlite.db"]
        );
    }

    #[test]
    fn test_unknown_backend_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("flat", &calls)]);
        let sync = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("flat", "1")]))),
        );
        let mut repo = repository(dir.path(), &["sqlite", "flat"]);

        let report = sync.sync_remote(&mut repo).unwrap();

        assert_eq!(report.backend, "flat");
        assert!(matches!(
            &report.skipped[0],
            (name, SkipReason::Unavailable(YumError::UnknownBackend(_))) if name == "sqlite"
        ));
    }

    #[test]
    fn test_load_failure_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![
            FakeBackend::new("sqlite", &calls).failing_load(),
            FakeBackend::new("flat", &calls),
        ]);
        let sync = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("sqlite", "1"), ("flat", "1")]))),
        );
        let mut repo = repository(dir.path(), &["sqlite", "flat"]);

        let report = sync.sync_remote(&mut repo).unwrap();

        assert_eq!(report.backend, "flat");
        assert!(matches!(report.skipped[0].1, SkipReason::Load(_)));
    }

    #[test]
    fn test_remote_fetch_error_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls).with_db()]);
        let sync = Synchronizer::new(&registry, FakeSource::new(None));
        let mut repo = repository(dir.path(), &["primary"]);

        let err = sync.sync_remote(&mut repo).unwrap_err();

        assert!(matches!(err, YumError::Registry(_)));
        assert!(calls.lock().unwrap().created.is_empty());
    }

    #[test]
    fn test_corrupt_local_metadata_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls)]);
        let sync = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("primary", "1")]))),
        );
        let mut repo = repository(dir.path(), &["primary"]);
        fs::write(&repo.info().local_repomd, "<html>oops</html>").unwrap();

        let err = sync.sync_remote(&mut repo).unwrap_err();

        assert!(matches!(err, YumError::Registry(ref e) if e.is_parse()));
        assert!(calls.lock().unwrap().created.is_empty());
    }

    #[test]
    fn test_failed_resync_clears_active_backend() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls)]);
        let mut repo = repository(dir.path(), &["primary"]);

        let online = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("primary", "1")]))),
        );
        online.sync_remote(&mut repo).unwrap();
        assert_eq!(repo.active_backend(), Some("primary"));

        let offline = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("other", "1")]))),
        );
        assert!(offline.sync_remote(&mut repo).is_err());
        assert!(repo.active_backend().is_none());
    }

    #[test]
    fn test_fetch_failure_on_resync_clears_active_backend() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls)]);
        let mut repo = repository(dir.path(), &["primary"]);

        let online = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("primary", "1")]))),
        );
        online.sync_remote(&mut repo).unwrap();
        assert_eq!(repo.active_backend(), Some("primary"));

        let unreachable = Synchronizer::new(&registry, FakeSource::new(None));
        let err = unreachable.sync_remote(&mut repo).unwrap_err();
        assert!(matches!(err, YumError::Registry(_)));
        assert!(repo.active_backend().is_none());
        assert!(matches!(
            repo.packages(),
            Err(YumError::NoActiveBackend(_))
        ));
    }

    #[test]
    fn test_corrupt_cache_on_local_resync_clears_active_backend() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let registry = registry(vec![FakeBackend::new("primary", &calls)]);
        let mut repo = repository(dir.path(), &["primary"]);

        let online = Synchronizer::new(
            &registry,
            FakeSource::new(Some(repomd(&[("primary", "1")]))),
        );
        online.sync_remote(&mut repo).unwrap();
        assert_eq!(repo.active_backend(), Some("primary"));

        fs::write(&repo.info().local_repomd, "<metalink/>").unwrap();
        let offline = Synchronizer::new(&registry, FakeSource::new(None));
        assert!(offline.sync_local(&mut repo).is_err());
        assert!(repo.active_backend().is_none());
    }

    #[test]
    fn test_persist_failure_skips_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Calls::default()));
        let repo = repository(dir.path(), &["primary"]);
        // A directory where repomd.xml should go makes the rename fail.
        fs::create_dir_all(repo.info().local_repomd.join("blocker")).unwrap();

        let remote_data = repomd(&[("primary", "1")]);
        let remote = parse_repomd(remote_data.as_bytes()).unwrap();
        let candidate = remote_candidate(
            "primary",
            repo.info(),
            Box::new(FakeBackend::new("primary", &calls)),
            &remote,
            &RepoMdMap::new(),
            remote_data.as_bytes(),
        );

        assert!(matches!(
            candidate,
            Candidate::Skipped(SkipReason::Persist(_))
        ));
        assert!(calls.lock().unwrap().loads.is_empty());
    }

    #[test]
    fn test_local_candidate_missing_data_type() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let candidate = local_candidate(
            Box::new(FakeBackend::new("primary", &calls).with_db()),
            &RepoMdMap::new(),
        );
        assert!(matches!(
            candidate,
            Candidate::Skipped(SkipReason::MissingDataType(ref t)) if t == "primary"
        ));
    }
}
