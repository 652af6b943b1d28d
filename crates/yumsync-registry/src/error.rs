//! Error types for the registry crate.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while fetching or decoding repository metadata.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(yumsync_registry::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}")]
    #[diagnostic(
        code(yumsync_registry::fetch),
        help("Verify the repository URL is correct and accessible")
    )]
    Fetch {
        url: String,
        #[source]
        source: yumsync_dl::error::DownloadError,
    },

    #[error("Malformed repository metadata: {0}")]
    #[diagnostic(
        code(yumsync_registry::xml),
        help("The repomd.xml document may be truncated or corrupted")
    )]
    Xml(#[from] quick_xml::Error),

    #[error("Missing <repomd> root element")]
    #[diagnostic(
        code(yumsync_registry::missing_root),
        help("The document does not look like a YUM repomd.xml file")
    )]
    MissingRoot,

    #[error("Unexpected root element <{0}>, expected <repomd>")]
    #[diagnostic(
        code(yumsync_registry::unexpected_root),
        help("The document does not look like a YUM repomd.xml file")
    )]
    UnexpectedRoot(String),

    #[error("Unexpected end of repository metadata")]
    #[diagnostic(
        code(yumsync_registry::truncated),
        help("The repomd.xml document may be truncated")
    )]
    Truncated,

    #[error("Invalid timestamp {value:?} for data type {data_type:?}")]
    #[diagnostic(
        code(yumsync_registry::invalid_timestamp),
        help("Timestamps must be seconds since the Unix epoch")
    )]
    InvalidTimestamp { data_type: String, value: String },
}

impl RegistryError {
    /// Whether the error comes from decoding a document rather than from
    /// reaching it.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::Xml(_)
                | Self::MissingRoot
                | Self::UnexpectedRoot(_)
                | Self::Truncated
                | Self::InvalidTimestamp { .. }
        )
    }
}

impl From<quick_xml::events::attributes::AttrError> for RegistryError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.into())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            RegistryError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
