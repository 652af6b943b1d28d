use std::{
    ffi::OsString,
    fs::{self, File},
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use ureq::{
    http::{header::CONTENT_LENGTH, Response},
    Body,
};
use yumsync_utils::fs::safe_remove;

use crate::{
    error::{IoContext, Result},
    http::Http,
    types::Progress,
};

pub struct Download {
    pub url: String,
    pub output: PathBuf,
    pub on_progress: Option<Box<dyn Fn(Progress) + Send + Sync>>,
}

impl Download {
    /// Creates a download of `url` into `output`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use yumsync_dl::download::Download;
    ///
    /// let path = Download::new(
    ///     "https://mirror.example.org/base/repodata/primary.xml.gz",
    ///     "/var/cache/yumsync/base/primary.xml.gz",
    /// )
    /// .execute()
    /// .expect("download failed");
    /// ```
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
            on_progress: None,
        }
    }

    /// Registers a progress callback invoked with [`Progress`] events.
    pub fn progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Performs the download and returns the final output path.
    ///
    /// The body is streamed into `<output>.part`; only after the whole body has been
    /// written and flushed is the staged file renamed over `output`. On any failure the
    /// staged file is removed and a previously existing `output` is left untouched.
    pub fn execute(self) -> Result<PathBuf> {
        if let Some(parent) = self.output.parent() {
            fs::create_dir_all(parent)
                .io_context(|| format!("creating directory {}", parent.display()))?;
        }

        let staged = part_path(&self.output);
        debug!("downloading {} -> {}", self.url, staged.display());

        if let Err(err) = self.download_to_file(&staged) {
            if let Err(cleanup) = safe_remove(&staged) {
                warn!("{cleanup}");
            }
            return Err(err);
        }

        fs::rename(&staged, &self.output).io_context(|| {
            format!(
                "moving {} to {}",
                staged.display(),
                self.output.display()
            )
        })?;

        Ok(self.output)
    }

    fn download_to_file(&self, path: &Path) -> Result<()> {
        let resp = Http::fetch(&self.url)?;
        let total = Self::parse_content_length(&resp);

        if let Some(ref cb) = self.on_progress {
            cb(Progress::Starting {
                total,
            });
        }

        let mut file =
            File::create(path).io_context(|| format!("creating {}", path.display()))?;

        let mut reader = resp.into_body().into_reader();
        let mut buffer = [0u8; 8192];
        let mut downloaded = 0u64;

        loop {
            let n = reader
                .read(&mut buffer)
                .io_context(|| format!("reading response body of {}", self.url))?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n])
                .io_context(|| format!("writing {}", path.display()))?;
            downloaded += n as u64;

            if let Some(ref cb) = self.on_progress {
                cb(Progress::Chunk {
                    current: downloaded,
                    total,
                });
            }
        }

        file.sync_all()
            .io_context(|| format!("flushing {}", path.display()))?;

        if let Some(ref cb) = self.on_progress {
            cb(Progress::Complete {
                total: downloaded,
            });
        }

        Ok(())
    }

    fn parse_content_length(resp: &Response<Body>) -> u64 {
        resp.headers()
            .get(CONTENT_LENGTH)
            .and_then(|h| h.to_str().ok())
            .and_then(|len| len.parse::<u64>().ok())
            .unwrap_or(0)
    }
}

/// Returns the staging path used while `output` is being written: `<output>.part`.
pub fn part_path(output: &Path) -> PathBuf {
    let mut name: OsString = output.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
