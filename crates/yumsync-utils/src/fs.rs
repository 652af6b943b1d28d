use std::{
    fs::{self, File},
    io::{self, Read},
    path::Path,
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates `path` and its parents unless it already is a directory.
///
/// # Errors
///
/// [`FileSystemError::NotADirectory`] when something else occupies `path`.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FileSystemError::NotADirectory(path.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path)
                .map_err(|err| FileSystemError::io("create directory", path, err))
        }
        Err(err) => Err(FileSystemError::io("inspect", path, err)),
    }
}

/// Removes a file or a whole directory tree. Missing paths are not an error.
pub fn safe_remove<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(FileSystemError::io("inspect", path, err)),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|err| FileSystemError::io("remove", path, err))
}

/// Reads up to `bytes` leading bytes of a file.
///
/// Shorter files yield a shorter signature rather than an error.
pub fn read_file_signature<P: AsRef<Path>>(path: P, bytes: usize) -> FileSystemResult<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FileSystemError::io("open", path, err))?;

    let mut signature = Vec::with_capacity(bytes);
    file.take(bytes as u64)
        .read_to_end(&mut signature)
        .map_err(|err| FileSystemError::io("read", path, err))?;

    Ok(signature)
}
