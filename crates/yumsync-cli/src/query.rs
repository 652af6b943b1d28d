use std::sync::Arc;

use nu_ansi_term::Color::{Blue, Cyan, LightRed, Magenta};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{debug, info};
use yumsync_config::config::get_config;
use yumsync_core::{
    backend::BackendRegistry,
    package::Package,
    repository::Repository,
    sync::{SyncMode, Synchronizer},
    YumResult,
};
use yumsync_registry::HttpMetadataSource;

use crate::utils::{vec_string, Colored};

fn open_repository(repo_name: &str, mode: SyncMode) -> YumResult<Repository> {
    let config = get_config();
    let entry = config.get_repository(repo_name)?;
    let registry = BackendRegistry::with_defaults();
    let synchronizer = Synchronizer::new(&registry, HttpMetadataSource);

    let repo = Repository::open(entry, &config, Some(mode), &synchronizer)?;
    debug!(
        repo = repo_name,
        backend = repo.active_backend(),
        "repository ready"
    );
    Ok(repo)
}

fn display_package(package: &Package) {
    info!(
        name = package.name,
        arch = package.arch,
        version = %package.evr,
        location = package.location,
        "{}-{}.{} | {}",
        Colored(Blue, &package.name),
        Colored(LightRed, &package.evr),
        Colored(Magenta, &package.arch),
        package.summary,
    );
}

fn display_details(package: &Package) {
    display_package(package);
    debug!(
        provides = vec_string(&package.provides.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
        requires = vec_string(&package.requires.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
        files = vec_string(&package.files),
        "{} provides {} capabilities, requires {}, owns {} files",
        package.nevra(),
        package.provides.len(),
        package.requires.len(),
        package.files.len(),
    );
}

pub fn list_packages(repo_name: &str, mode: SyncMode) -> YumResult<()> {
    let repo = open_repository(repo_name, mode)?;
    let mut packages: Vec<Arc<Package>> = repo.packages()?;
    packages.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.evr.compare(&b.evr)));

    for package in &packages {
        display_package(package);
    }

    let mut builder = Builder::new();
    builder.push_record([
        "Repository".to_string(),
        format!("{}", Colored(Cyan, repo.name())),
    ]);
    builder.push_record([
        "Backend".to_string(),
        repo.active_backend().unwrap_or_default().to_string(),
    ]);
    builder.push_record([
        "Packages".to_string(),
        format!("{}", Colored(Blue, packages.len())),
    ]);

    let table = builder
        .build()
        .with(Panel::header("Package List"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();
    info!("\n{table}");

    Ok(())
}

pub fn find_package(
    repo_name: &str,
    name: &str,
    version: Option<&str>,
    release: Option<&str>,
    mode: SyncMode,
) -> YumResult<()> {
    let repo = open_repository(repo_name, mode)?;
    let package = repo.find_latest_matching_name(name, version, release)?;
    display_details(&package);
    Ok(())
}

pub fn find_provider(repo_name: &str, requirement: &str, mode: SyncMode) -> YumResult<()> {
    let repo = open_repository(repo_name, mode)?;
    let package = repo.find_latest_matching_require(requirement)?;
    display_details(&package);
    Ok(())
}
