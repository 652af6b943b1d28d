//! Retrieval of repomd.xml documents.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use tracing::{debug, warn};
use yumsync_dl::{download::part_path, http::Http};
use yumsync_utils::fs::safe_remove;

use crate::error::{ErrorContext, RegistryError, Result};

/// Where repository index documents come from.
///
/// Both operations return raw bytes; decoding is left to
/// [`parse_repomd`](crate::repomd::parse_repomd).
pub trait MetadataSource {
    /// Fetches the index document at `url`, failing with
    /// [`RegistryError::Fetch`] on any transport error or non-success status.
    fn remote(&self, url: &str) -> Result<Vec<u8>>;

    /// Reads the cached index document at `path`.
    ///
    /// A missing file yields an empty buffer, the same as an empty file.
    fn local(&self, path: &Path) -> Result<Vec<u8>>;
}

/// [`MetadataSource`] backed by the shared HTTP agent and the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpMetadataSource;

impl MetadataSource for HttpMetadataSource {
    fn remote(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching repository metadata from {}", url);
        Http::bytes(url).map_err(|source| {
            RegistryError::Fetch {
                url: url.to_string(),
                source,
            }
        })
    }

    fn local(&self, path: &Path) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No cached metadata at {}", path.display());
                Ok(Vec::new())
            }
            Err(err) => {
                Err(RegistryError::IoError {
                    action: format!("reading {}", path.display()),
                    source: err,
                })
            }
        }
    }
}

/// Replaces the cached index document at `path` with `content`.
///
/// The bytes go to `<path>.part` first and are renamed over `path` once fully
/// written, so readers never observe a half-written document.
pub fn write_metadata<P: AsRef<Path>>(content: &[u8], path: P) -> Result<()> {
    let path = path.as_ref();
    let staged = part_path(path);

    let write_staged = || -> Result<()> {
        let mut writer = BufWriter::new(
            File::create(&staged)
                .with_context(|| format!("creating metadata file {}", staged.display()))?,
        );
        writer
            .write_all(content)
            .with_context(|| format!("writing to metadata file {}", staged.display()))?;
        writer
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
            .and_then(|file| file.sync_all())
            .with_context(|| format!("flushing metadata file {}", staged.display()))
    };

    if let Err(err) = write_staged() {
        if let Err(cleanup) = safe_remove(&staged) {
            warn!("{cleanup}");
        }
        return Err(err);
    }

    fs::rename(&staged, path)
        .with_context(|| format!("moving {} to {}", staged.display(), path.display()))
}
