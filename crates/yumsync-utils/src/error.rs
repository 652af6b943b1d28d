//! Errors raised by the path and filesystem helpers.

use std::{error::Error, fmt, io, path::PathBuf};

/// Failure expanding a configured path.
#[derive(Debug)]
pub enum PathError {
    Empty,
    /// A relative path could not be anchored because the working directory is gone.
    CurrentDir(io::Error),
    UndefinedVariable { name: String, path: String },
    /// `${` without a closing brace.
    UnterminatedBrace { path: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty path"),
            Self::CurrentDir(err) => write!(f, "cannot determine working directory: {err}"),
            Self::UndefinedVariable { name, path } => {
                write!(f, "${name} is not set (in {path:?})")
            }
            Self::UnterminatedBrace { path } => write!(f, "missing '}}' in {path:?}"),
        }
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            _ => None,
        }
    }
}

/// Failure touching the cache directory tree.
#[derive(Debug)]
pub enum FileSystemError {
    Io {
        /// What was attempted, e.g. "remove" or "create directory".
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    NotADirectory(PathBuf),
}

impl FileSystemError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                action,
                path,
                source,
            } => write!(f, "cannot {action} {}: {source}", path.display()),
            Self::NotADirectory(path) => {
                write!(f, "{} exists and is not a directory", path.display())
            }
        }
    }
}

impl Error for FileSystemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NotADirectory(_) => None,
        }
    }
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;
pub type PathResult<T> = std::result::Result<T, PathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_error_messages() {
        let err = PathError::UndefinedVariable {
            name: "YUMSYNC_MIRROR".into(),
            path: "$YUMSYNC_MIRROR/base".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"$YUMSYNC_MIRROR is not set (in "$YUMSYNC_MIRROR/base")"#
        );

        let err = PathError::UnterminatedBrace {
            path: "${XDG_CACHE_HOME/yumsync".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"missing '}' in "${XDG_CACHE_HOME/yumsync""#
        );
        assert!(err.source().is_none());

        let err = PathError::CurrentDir(io::Error::other("deleted"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_file_system_error_messages() {
        let err = FileSystemError::io(
            "create directory",
            "/var/cache/yumsync/baseos",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(
            err.to_string(),
            "cannot create directory /var/cache/yumsync/baseos: permission denied"
        );
        assert!(err.source().is_some());

        let err = FileSystemError::NotADirectory("/var/cache/yumsync/repomd.xml".into());
        assert_eq!(
            err.to_string(),
            "/var/cache/yumsync/repomd.xml exists and is not a directory"
        );
    }
}
