use miette::Diagnostic;
use thiserror::Error;
use yumsync_utils::error::PathError;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(yumsync_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(yumsync_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(yumsync_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid repository name: {0:?}")]
    #[diagnostic(
        code(yumsync_config::invalid_repository),
        help("Repository names must be non-empty and must not contain path separators")
    )]
    InvalidRepository(String),

    #[error("Invalid repository URL for {name}: {url}")]
    #[diagnostic(
        code(yumsync_config::invalid_repository_url),
        help("Repository URLs must be absolute http:// or https:// URLs")
    )]
    InvalidRepositoryUrl { name: String, url: String },

    #[error("Duplicate repository name: {0}")]
    #[diagnostic(
        code(yumsync_config::duplicate_repo),
        help("Each repository must have a unique name")
    )]
    DuplicateRepositoryName(String),

    #[error("No backends configured for {0}")]
    #[diagnostic(
        code(yumsync_config::empty_backends),
        help("List at least one backend, e.g. backends = [\"primary\"]")
    )]
    EmptyBackendList(String),

    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(yumsync_config::invalid_timeout),
        help("Use a duration such as \"30s\", \"2m\" or \"1m30s\"")
    )]
    InvalidTimeout(String),

    #[error("Repository not found: {0}")]
    #[diagnostic(
        code(yumsync_config::missing_repository),
        help("Check the repository name against your config file")
    )]
    MissingRepository(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(yumsync_config::io))]
    IoError(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    #[diagnostic(
        code(yumsync_config::path),
        help("Check that every $VARIABLE used in the path is set")
    )]
    Path(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
