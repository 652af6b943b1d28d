/// Name and data type of the built-in XML backend.
pub const PRIMARY_BACKEND: &str = "primary";

/// Decompressed primary metadata inside a repository cache directory.
pub const PRIMARY_DB_FILE: &str = "primary.xml";

/// Compressed primary metadata as fetched from the repository.
pub const PRIMARY_DOWNLOAD_FILE: &str = "primary.xml.download";

pub const GZIP_MAGIC_BYTES: [u8; 2] = [0x1f, 0x8b];
pub const ZST_MAGIC_BYTES: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];
pub const BZIP2_MAGIC_BYTES: [u8; 3] = *b"BZh";
pub const XZ_MAGIC_BYTES: [u8; 6] = [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
