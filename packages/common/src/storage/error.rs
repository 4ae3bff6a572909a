use std::fmt;

/// Failures from the blob store and from parsing blob names.
#[derive(Debug)]
pub enum StorageError {
    /// No blob at `namespace/name`.
    NotFound(String),
    Io(std::io::Error),
    /// Name could escape its namespace directory (separators, `..`, leading
    /// dot, control characters) or is empty.
    UnsafeName(String),
    /// Name does not start with a known role prefix such as `mainFile-`.
    UnknownPrefix(String),
    /// Stream ran past the role's byte limit; `actual` is the count read so far.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "no blob at {path}"),
            Self::Io(err) => write!(f, "blob store io: {err}"),
            Self::UnsafeName(name) => write!(f, "unsafe blob name {name:?}"),
            Self::UnknownPrefix(name) => write!(f, "blob name {name:?} has no known role prefix"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "blob over limit: read {actual} of at most {limit} bytes")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
