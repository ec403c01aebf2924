use snafu::Snafu;

/// Every way a filesystem operation can fail.
///
/// Each variant carries the path as given by the caller. A failed operation
/// never leaves a partial change behind.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FsError {
    #[snafu(display("No such file or directory: {}", path))]
    NotFound { path: String },
    #[snafu(display("File exists: {}", path))]
    AlreadyExists { path: String },
    #[snafu(display("Not a directory: {}", path))]
    NotADirectory { path: String },
    #[snafu(display("Is a directory: {}", path))]
    IsADirectory { path: String },
    #[snafu(display("Directory not empty: {}", path))]
    DirectoryNotEmpty { path: String },
    #[snafu(display("Invalid path '{}': {}", path, reason))]
    InvalidPath { path: String, reason: String },
}

impl FsError {
    /// The path the failing operation was called with.
    pub fn path(&self) -> &str {
        match self {
            FsError::NotFound { path }
            | FsError::AlreadyExists { path }
            | FsError::NotADirectory { path }
            | FsError::IsADirectory { path }
            | FsError::DirectoryNotEmpty { path }
            | FsError::InvalidPath { path, .. } => path,
        }
    }
}
