//! Backend reading the `primary` XML database.
//!
//! The database is fetched compressed (gzip or zstd), decompressed next to the
//! committed copy and renamed over `primary.xml` only once complete.

use std::{
    fmt,
    fs::{self, File},
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use flate2::read::GzDecoder;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use tracing::{debug, info, trace, warn};
use yumsync_dl::{
    download::{part_path, Download},
    types::Progress,
};
use yumsync_utils::fs::{read_file_signature, safe_remove};

use crate::{
    backend::Backend,
    constants::{
        BZIP2_MAGIC_BYTES, GZIP_MAGIC_BYTES, PRIMARY_BACKEND, PRIMARY_DB_FILE,
        PRIMARY_DOWNLOAD_FILE, XZ_MAGIC_BYTES, ZST_MAGIC_BYTES,
    },
    error::{ErrorContext, YumError},
    package::{self, Capability, Comparison, Package},
    repository::RepositoryInfo,
    version::Evr,
    YumResult,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Zstd,
    Unsupported,
}

impl Compression {
    fn from_magic_bytes(magic: &[u8]) -> Self {
        if magic.starts_with(&GZIP_MAGIC_BYTES) {
            Self::Gzip
        } else if magic.starts_with(&ZST_MAGIC_BYTES) {
            Self::Zstd
        } else if magic.starts_with(&BZIP2_MAGIC_BYTES) || magic.starts_with(&XZ_MAGIC_BYTES) {
            Self::Unsupported
        } else {
            Self::None
        }
    }
}

pub struct PrimaryBackend {
    repo: String,
    db_path: PathBuf,
    download_path: PathBuf,
    packages: Vec<Arc<Package>>,
}

impl PrimaryBackend {
    pub fn new(repo: &RepositoryInfo) -> Self {
        Self {
            repo: repo.name.clone(),
            db_path: repo.cache_dir.join(PRIMARY_DB_FILE),
            download_path: repo.cache_dir.join(PRIMARY_DOWNLOAD_FILE),
            packages: Vec::new(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl Backend for PrimaryBackend {
    fn yum_data_type(&self) -> &str {
        PRIMARY_BACKEND
    }

    fn has_db(&self) -> bool {
        self.db_path.is_file()
    }

    fn get_latest_db(&mut self, url: &str) -> YumResult<()> {
        let repo = self.repo.clone();
        let downloaded = Download::new(url, &self.download_path)
            .progress(move |progress| {
                trace!("[{}] primary metadata: {}", repo, describe(progress));
            })
            .execute()?;

        let result = decompress_into(&downloaded, &self.db_path);
        if let Err(err) = safe_remove(&downloaded) {
            warn!("{err}");
        }
        result?;

        info!("[{}] primary database updated", self.repo);
        Ok(())
    }

    fn load_db(&mut self) -> YumResult<()> {
        let file = File::open(&self.db_path).map_err(|err| load_error(&self.db_path, err))?;
        let packages = parse_primary(BufReader::new(file), &self.db_path)?;

        info!("[{}] loaded {} packages", self.repo, packages.len());
        self.packages = packages.into_iter().map(Arc::new).collect();
        Ok(())
    }

    fn find_latest_matching_name(
        &self,
        name: &str,
        version: Option<&str>,
        release: Option<&str>,
    ) -> YumResult<Arc<Package>> {
        package::find_latest_matching_name(&self.packages, name, version, release)
    }

    fn find_latest_matching_require(&self, requirement: &str) -> YumResult<Arc<Package>> {
        package::find_latest_matching_require(&self.packages, requirement)
    }

    fn packages(&self) -> Vec<Arc<Package>> {
        self.packages.clone()
    }
}

fn load_error(path: &Path, reason: impl fmt::Display) -> YumError {
    YumError::Load {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn describe(progress: Progress) -> String {
    match progress {
        Progress::Starting { total: 0 } => "download started".to_string(),
        Progress::Starting { total } => format!("download started, {total} bytes expected"),
        Progress::Chunk { current, total: 0 } => format!("{current} bytes received"),
        Progress::Chunk { current, total } => format!("{current}/{total} bytes received"),
        Progress::Complete { total } => format!("fetched {total} bytes"),
    }
}

/// Decompresses `src` into `dest` through a staged file.
fn decompress_into(src: &Path, dest: &Path) -> YumResult<()> {
    let compression = Compression::from_magic_bytes(&read_file_signature(src, 6)?);
    debug!("decompressing {} ({:?})", src.display(), compression);

    let input = File::open(src).with_context(|| format!("opening {}", src.display()))?;
    let mut reader: Box<dyn Read> = match compression {
        Compression::None => Box::new(input),
        Compression::Gzip => Box::new(GzDecoder::new(input)),
        Compression::Zstd => {
            Box::new(
                zstd::Decoder::new(input)
                    .with_context(|| format!("creating zstd decoder for {}", src.display()))?,
            )
        }
        Compression::Unsupported => return Err(YumError::UnsupportedCompression(src.into())),
    };

    let staged = part_path(dest);
    let write_staged = |reader: &mut dyn Read| -> YumResult<()> {
        let mut output =
            File::create(&staged).with_context(|| format!("creating {}", staged.display()))?;
        io::copy(reader, &mut output)
            .with_context(|| format!("decompressing {}", src.display()))?;
        output
            .sync_all()
            .with_context(|| format!("flushing {}", staged.display()))
    };

    if let Err(err) = write_staged(reader.as_mut()) {
        if let Err(cleanup) = safe_remove(&staged) {
            warn!("{cleanup}");
        }
        return Err(err);
    }

    fs::rename(&staged, dest)
        .with_context(|| format!("moving {} to {}", staged.display(), dest.display()))
}

#[derive(Clone, Copy, Default, PartialEq)]
enum Section {
    #[default]
    None,
    Provides,
    Requires,
}

#[derive(Default)]
struct PrimaryParser {
    path: PathBuf,
    depth: usize,
    seen_root: bool,
    current: Option<Package>,
    section: Section,
    text: String,
    packages: Vec<Package>,
}

/// Parses a `<metadata>` primary document.
fn parse_primary<R: BufRead>(reader: R, path: &Path) -> YumResult<Vec<Package>> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut parser = PrimaryParser {
        path: path.to_path_buf(),
        ..Default::default()
    };
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| load_error(path, err))?;
        match event {
            Event::Start(e) => parser.open(&e)?,
            Event::Empty(e) => {
                parser.open(&e)?;
                parser.close(e.local_name().as_ref());
            }
            Event::End(e) => parser.close(e.local_name().as_ref()),
            Event::Text(text) => {
                let text = text.unescape().map_err(|err| load_error(path, err))?;
                parser.text.push_str(&text);
            }
            Event::CData(cdata) => parser.text.push_str(&String::from_utf8_lossy(&cdata)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !parser.seen_root {
        return Err(load_error(path, "missing <metadata> root element"));
    }
    if parser.depth > 0 {
        return Err(load_error(path, "unexpected end of document"));
    }
    Ok(parser.packages)
}

impl PrimaryParser {
    fn open(&mut self, e: &BytesStart) -> YumResult<()> {
        self.depth += 1;
        self.text.clear();
        let name = e.local_name();

        if self.depth == 1 {
            if name.as_ref() != b"metadata" {
                return Err(load_error(
                    &self.path,
                    format!(
                        "unexpected root element <{}>",
                        String::from_utf8_lossy(name.as_ref())
                    ),
                ));
            }
            self.seen_root = true;
            return Ok(());
        }

        if name.as_ref() == b"package" {
            self.current = Some(Package::default());
            self.section = Section::None;
            return Ok(());
        }

        let Some(pkg) = self.current.as_mut() else {
            return Ok(());
        };

        match name.as_ref() {
            b"version" => {
                pkg.evr = Evr::new(
                    attribute(e, b"epoch", &self.path)?.and_then(|epoch| epoch.parse().ok()),
                    attribute(e, b"ver", &self.path)?.unwrap_or_default(),
                    attribute(e, b"rel", &self.path)?,
                );
            }
            b"location" => {
                pkg.location = attribute(e, b"href", &self.path)?.unwrap_or_default();
            }
            b"provides" => self.section = Section::Provides,
            b"requires" => self.section = Section::Requires,
            b"entry" => {
                let capability = capability(e, &self.path)?;
                match self.section {
                    Section::Provides => pkg.provides.push(capability),
                    Section::Requires => pkg.requires.push(capability),
                    Section::None => {}
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        self.depth = self.depth.saturating_sub(1);
        let text = std::mem::take(&mut self.text);

        if name == b"package" {
            if let Some(pkg) = self.current.take() {
                self.packages.push(pkg);
            }
            self.section = Section::None;
            return;
        }

        let Some(pkg) = self.current.as_mut() else {
            return;
        };

        match name {
            b"name" => pkg.name = text,
            b"arch" => pkg.arch = text,
            b"summary" => pkg.summary = text,
            b"file" => pkg.files.push(text),
            b"provides" | b"requires" => self.section = Section::None,
            _ => {}
        }
    }
}

fn attribute(e: &BytesStart, name: &[u8], path: &Path) -> YumResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| load_error(path, err))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|err| load_error(path, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Builds a capability from an `<rpm:entry>` element.
fn capability(e: &BytesStart, path: &Path) -> YumResult<Capability> {
    let name = attribute(e, b"name", path)?.unwrap_or_default();
    let flags = attribute(e, b"flags", path)?.and_then(|flags| Comparison::from_flags(&flags));
    let version = attribute(e, b"ver", path)?;

    match (flags, version) {
        (Some(op), Some(version)) => {
            let evr = Evr::new(
                attribute(e, b"epoch", path)?.and_then(|epoch| epoch.parse().ok()),
                version,
                attribute(e, b"rel", path)?,
            );
            Ok(Capability::with_constraint(name, op, evr))
        }
        _ => Ok(Capability::new(name)),
    }
}
