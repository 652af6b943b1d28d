use nu_ansi_term::Color::{Blue, Cyan, Green, Red, Yellow};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{debug, error, info, warn};
use yumsync_config::{
    config::{get_config, Config},
    repository::Repository as RepositoryConfig,
};
use yumsync_core::{
    backend::BackendRegistry,
    error::YumError,
    repository::Repository,
    sync::{SyncMode, SyncReport, Synchronizer},
    YumResult,
};
use yumsync_registry::HttpMetadataSource;

use crate::utils::Colored;

fn sync_one(
    synchronizer: &Synchronizer<'_, HttpMetadataSource>,
    config: &Config,
    entry: &RepositoryConfig,
    mode: SyncMode,
) -> YumResult<SyncReport> {
    let mut repo = Repository::from_config(entry, config)?;
    debug!(repo = entry.name, backends = ?repo.backends(), "synchronizing");
    synchronizer.sync(&mut repo, mode)
}

/// Synchronizes `repo_name`, or every enabled repository when `None`.
///
/// Every repository is attempted; the first failure is returned afterwards.
pub fn sync_repositories(repo_name: Option<&str>, mode: SyncMode) -> YumResult<()> {
    let config = get_config();
    let entries: Vec<RepositoryConfig> = match repo_name {
        Some(name) => vec![config.get_repository(name)?.clone()],
        None => config.enabled_repositories().cloned().collect(),
    };

    if entries.is_empty() {
        warn!("No repositories configured");
        return Ok(());
    }

    let registry = BackendRegistry::with_defaults();
    let synchronizer = Synchronizer::new(&registry, HttpMetadataSource);

    let mut first_error: Option<YumError> = None;
    let mut updated = 0;
    let mut cached = 0;
    let mut failed = 0;

    for entry in &entries {
        match sync_one(&synchronizer, &config, entry, mode) {
            Ok(report) => {
                for (backend, reason) in &report.skipped {
                    debug!(repo = entry.name, backend, "skipped: {}", reason);
                }
                let state = if report.updated {
                    updated += 1;
                    Colored(Green, "updated")
                } else {
                    cached += 1;
                    Colored(Blue, "up to date")
                };
                info!(
                    repo = entry.name,
                    backend = report.backend,
                    updated = report.updated,
                    "[{}] {} via {}",
                    Colored(Cyan, &entry.name),
                    state,
                    report.backend,
                );
            }
            Err(err) => {
                failed += 1;
                error!(repo = entry.name, "[{}] {}", Colored(Cyan, &entry.name), err);
                first_error.get_or_insert(err);
            }
        }
    }

    if entries.len() > 1 {
        let mut builder = Builder::new();
        builder.push_record(["Updated".to_string(), format!("{}", Colored(Green, updated))]);
        builder.push_record(["Up to date".to_string(), format!("{}", Colored(Blue, cached))]);
        builder.push_record([
            "Failed".to_string(),
            format!("{}", Colored(if failed > 0 { Red } else { Yellow }, failed)),
        ]);

        let table = builder
            .build()
            .with(Panel::header("Sync Summary"))
            .with(Style::rounded())
            .with(BorderCorrection {})
            .to_string();
        info!("\n{table}");
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
