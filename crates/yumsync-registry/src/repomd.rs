//! Decoding of `repodata/repomd.xml` documents.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use tracing::debug;

use crate::error::{RegistryError, Result};

/// Location of the index document relative to a repository base URL.
pub const REPOMD_PATH: &str = "repodata/repomd.xml";

/// File name of the cached index document inside a repository cache directory.
pub const REPOMD_FILE: &str = "repomd.xml";

/// One `<data>` entry of a repomd.xml document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoMd {
    /// Opaque checksum of the referenced file, not verified here.
    pub checksum: String,
    pub timestamp: DateTime<Utc>,
    /// Path of the database relative to the repository base URL.
    pub location: String,
}

/// Records keyed by data type (`primary`, `primary_db`, `filelists`, ...).
pub type RepoMdMap = HashMap<String, RepoMd>;

/// Builds the URL of the index document for the repository at `base_url`.
pub fn repomd_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), REPOMD_PATH)
}

/// Parses a repomd.xml document.
///
/// Zero bytes decode to an empty map: no index has been cached yet. Anything
/// else must have a `<repomd>` root. When a data type is listed more than once
/// the last entry wins.
///
/// # Errors
///
/// Returns a parse error ([`RegistryError::is_parse`]) for malformed XML, a
/// missing or foreign root element, or a timestamp that is not a number of
/// seconds since the epoch.
pub fn parse_repomd(data: &[u8]) -> Result<RepoMdMap> {
    if data.is_empty() {
        return Ok(RepoMdMap::new());
    }

    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut parser = RepoMdParser::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => parser.open(&e)?,
            Event::Empty(e) => {
                parser.open(&e)?;
                parser.close()?;
            }
            Event::End(_) => parser.close()?,
            Event::Text(text) => parser.text(&text.unescape()?),
            Event::CData(cdata) => parser.text(&String::from_utf8_lossy(&cdata)),
            Event::Eof => break,
            _ => {}
        }

        if parser.finished() {
            break;
        }
    }

    parser.into_records()
}

#[derive(Default, PartialEq)]
enum Field {
    Checksum,
    Timestamp,
    #[default]
    Other,
}

#[derive(Default)]
struct DataEntry {
    data_type: String,
    checksum: String,
    location: String,
    timestamp: String,
}

impl DataEntry {
    fn finish(self) -> Result<(String, RepoMd)> {
        let timestamp = decode_timestamp(&self.data_type, &self.timestamp)?;
        Ok((
            self.data_type,
            RepoMd {
                checksum: self.checksum,
                timestamp,
                location: self.location,
            },
        ))
    }
}

#[derive(Default)]
struct RepoMdParser {
    depth: usize,
    seen_root: bool,
    entry: Option<DataEntry>,
    field: Field,
    records: RepoMdMap,
}

impl RepoMdParser {
    fn open(&mut self, e: &BytesStart) -> Result<()> {
        self.depth += 1;
        let name = e.local_name();

        match self.depth {
            1 => {
                if name.as_ref() != b"repomd" {
                    return Err(RegistryError::UnexpectedRoot(
                        String::from_utf8_lossy(name.as_ref()).into_owned(),
                    ));
                }
                self.seen_root = true;
            }
            2 if name.as_ref() == b"data" => {
                self.entry = Some(DataEntry {
                    data_type: attribute(e, b"type")?.unwrap_or_default(),
                    ..Default::default()
                });
            }
            3 => {
                if let Some(entry) = self.entry.as_mut() {
                    self.field = match name.as_ref() {
                        b"checksum" => {
                            entry.checksum.clear();
                            Field::Checksum
                        }
                        b"timestamp" => {
                            entry.timestamp.clear();
                            Field::Timestamp
                        }
                        b"location" => {
                            if let Some(href) = attribute(e, b"href")? {
                                entry.location = href;
                            }
                            Field::Other
                        }
                        _ => Field::Other,
                    };
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.depth != 3 {
            return;
        }
        if let Some(entry) = self.entry.as_mut() {
            match self.field {
                Field::Checksum => entry.checksum.push_str(text),
                Field::Timestamp => entry.timestamp.push_str(text),
                Field::Other => {}
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        match self.depth {
            2 => {
                if let Some(entry) = self.entry.take() {
                    let (data_type, record) = entry.finish()?;
                    debug!(
                        "repomd {}: location={} timestamp={} checksum={}",
                        data_type, record.location, record.timestamp, record.checksum
                    );
                    self.records.insert(data_type, record);
                }
            }
            3 => self.field = Field::Other,
            _ => {}
        }
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn finished(&self) -> bool {
        self.seen_root && self.depth == 0
    }

    fn into_records(self) -> Result<RepoMdMap> {
        if !self.seen_root {
            return Err(RegistryError::MissingRoot);
        }
        if self.depth > 0 {
            return Err(RegistryError::Truncated);
        }
        Ok(self.records)
    }
}

fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Splits fractional epoch seconds into whole seconds (floor) and the
/// truncated nanosecond remainder. A missing timestamp decodes to the epoch.
fn decode_timestamp(data_type: &str, raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    let invalid = || {
        RegistryError::InvalidTimestamp {
            data_type: data_type.to_string(),
            value: raw.to_string(),
        }
    };

    let seconds = if raw.is_empty() {
        0.0
    } else {
        raw.parse::<f64>().map_err(|_| invalid())?
    };
    if !seconds.is_finite() {
        return Err(invalid());
    }

    let sec = seconds.floor();
    let nsec = ((seconds - sec) * 1e9) as u32;

    DateTime::from_timestamp(sec as i64, nsec).ok_or_else(invalid)
}
