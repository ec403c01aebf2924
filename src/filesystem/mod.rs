//! The public facade: a root directory, a current directory, and the
//! operations that walk and mutate the tree between them.

mod details;
mod error;
mod filesystem;

pub use details::{EntryDetails, EntryKind};
pub(crate) use error::{
    AlreadyExistsSnafu, DirectoryNotEmptySnafu, InvalidPathSnafu, IsADirectorySnafu,
    NotADirectorySnafu, NotFoundSnafu,
};
pub use error::FsError;
pub use filesystem::FileSystem;
