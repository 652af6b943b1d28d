//! Error types for yumsync-core.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use yumsync_config::error::ConfigError;
use yumsync_registry::RegistryError;
use yumsync_utils::error::FileSystemError;

#[derive(Error, Diagnostic, Debug)]
pub enum YumError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(code(yumsync::filesystem))]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] yumsync_dl::error::DownloadError),

    #[error("Error while {action}")]
    #[diagnostic(code(yumsync::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No such backend [{0}]")]
    #[diagnostic(
        code(yumsync::unknown_backend),
        help("Check the backend names listed in your configuration")
    )]
    UnknownBackend(String),

    #[error("Backend [{0}] is already registered")]
    #[diagnostic(code(yumsync::duplicate_backend))]
    DuplicateBackend(String),

    #[error("Unsupported compression for {0}")]
    #[diagnostic(
        code(yumsync::unsupported_compression),
        help("Only gzip, zstd and uncompressed metadata are supported")
    )]
    UnsupportedCompression(PathBuf),

    #[error("Failed to load database {path}: {reason}")]
    #[diagnostic(
        code(yumsync::load),
        help("Run 'yumsync sync' to fetch a fresh copy of the database")
    )]
    Load { path: PathBuf, reason: String },

    #[error("No valid backend found")]
    #[diagnostic(
        code(yumsync::no_valid_backend),
        help("None of the configured backends could be set up for this repository")
    )]
    NoValidBackend,

    #[error("Repository [{0}] has no active backend")]
    #[diagnostic(
        code(yumsync::no_active_backend),
        help("Synchronize the repository before querying it")
    )]
    NoActiveBackend(String),

    #[error("Package '{0}' not found")]
    #[diagnostic(
        code(yumsync::package_not_found),
        help("Run 'yumsync sync' to update the package list, or check the package name")
    )]
    PackageNotFound(String),

    #[error("Invalid requirement: {0}")]
    #[diagnostic(
        code(yumsync::invalid_requirement),
        help("Use the form 'name', or 'name OP version' with OP one of <, <=, =, >=, >")
    )]
    InvalidRequirement(String),
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, YumError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, YumError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            YumError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
