//! Repository metadata handling for yumsync.
//!
//! A YUM repository publishes `repodata/repomd.xml`, an index listing one
//! `<data>` entry per database flavor together with its checksum, timestamp
//! and location. This crate fetches that document from the remote repository
//! or from the local cache ([`source`]) and decodes it into a map keyed by
//! data type ([`repomd`]).
//!
//! # Example
//!
//! ```no_run
//! use yumsync_registry::{parse_repomd, HttpMetadataSource, MetadataSource};
//!
//! fn newest_primary(url: &str) -> yumsync_registry::Result<()> {
//!     let bytes = HttpMetadataSource.remote(url)?;
//!     let records = parse_repomd(&bytes)?;
//!     if let Some(primary) = records.get("primary") {
//!         println!("{} published at {}", primary.location, primary.timestamp);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod repomd;
pub mod source;

pub use error::{ErrorContext, RegistryError, Result};
pub use repomd::{parse_repomd, repomd_url, RepoMd, RepoMdMap, REPOMD_FILE, REPOMD_PATH};
pub use source::{write_metadata, HttpMetadataSource, MetadataSource};
