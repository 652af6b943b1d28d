use std::{env, process::ExitCode};

use clap::Parser;
use cli::{Args, Commands};
use logging::setup_logging;
use query::{find_package, find_provider, list_packages};
use sync::sync_repositories;
use tracing::{debug, info};
use ureq::Proxy;
use yumsync_config::{
    config::{self, config_path, generate_default_config, get_config, set_config_path},
    error::ConfigError,
};
use yumsync_core::{error::ErrorContext, sync::SyncMode, YumResult};
use yumsync_dl::http_client::configure_http_client;
use yumsync_utils::path::resolve_path;

mod cli;
mod logging;
mod query;
mod sync;
mod utils;

fn configure_paths(args: &Args) -> YumResult<()> {
    if let Some(ref c) = args.config {
        let path = resolve_path(c).map_err(ConfigError::from)?;
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        set_config_path(path);
    }
    Ok(())
}

fn configure_http(args: &Args) -> YumResult<()> {
    let proxy = match args.proxy.as_deref() {
        Some(proxy) => Some(Proxy::new(proxy).map_err(yumsync_dl::error::DownloadError::from)?),
        None => None,
    };
    let user_agent = args.user_agent.clone();
    let timeout = get_config().timeout();

    configure_http_client(|config| {
        if proxy.is_some() {
            config.proxy = proxy;
        }

        if let Some(user_agent) = user_agent {
            config.user_agent = Some(user_agent);
        }

        config.timeout = timeout;
    });

    Ok(())
}

/// Remote checks are skipped when offline or when disabled in the configuration.
fn query_mode(args: &Args) -> SyncMode {
    SyncMode::from_check_for_updates(!args.offline && get_config().check_for_updates())
}

fn handle_cli() -> YumResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::disable_color();
    }

    configure_paths(&args)?;

    if let Commands::DefConfig = args.command {
        generate_default_config()?;
        return Ok(());
    }

    config::init()?;
    configure_http(&args)?;

    match &args.command {
        Commands::Sync {
            repo_name,
        } => {
            let mode = if args.offline {
                SyncMode::Local
            } else {
                SyncMode::Remote
            };
            sync_repositories(repo_name.as_deref(), mode)?;
        }
        Commands::List {
            repo_name,
        } => list_packages(repo_name, query_mode(&args))?,
        Commands::Find {
            repo_name,
            name,
            version,
            release,
        } => {
            find_package(
                repo_name,
                name,
                version.as_deref(),
                release.as_deref(),
                query_mode(&args),
            )?;
        }
        Commands::Provides {
            repo_name,
            requirement,
        } => find_provider(repo_name, requirement, query_mode(&args))?,
        Commands::Config => {
            let content = toml::to_string_pretty(&get_config()).map_err(ConfigError::from)?;
            debug!("configuration loaded from {}", config_path().display());
            info!("{}", content);
        }
        Commands::Env => {
            let config = get_config();

            info!("YUMSYNC_CONFIG={}", config_path().display());
            let cache_root = config.get_cache_path()?;
            info!("YUMSYNC_CACHE={}", cache_root.display());
            for repo in config.enabled_repositories() {
                let cache_dir = repo.cache_dir_in(&cache_root)?;
                info!(repo = repo.name, "{}={}", repo.name, cache_dir.display());
            }
        }
        Commands::DefConfig => {}
    }

    Ok(())
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    match handle_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}
