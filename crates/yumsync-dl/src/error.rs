use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(yumsync_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(
        code(yumsync_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(yumsync_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error("I/O error while {action}: {source}")]
    #[diagnostic(code(yumsync_dl::io), help("Check file permissions and disk space"))]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<ureq::Error> for DownloadError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

pub(crate) trait IoContext<T> {
    fn io_context<C>(self, action: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<C>(self, action: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|source| {
            DownloadError::Io {
                action: action(),
                source,
            }
        })
    }
}
