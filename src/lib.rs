//! An in-memory hierarchical filesystem.
//!
//! The tree lives entirely in process memory: directories and files addressed
//! by Unix-like paths, with hard links, link counts and creation, modification
//! and access timestamps. [`FileSystem`] is the entry point.
//!
//! ```
//! use memfs::FileSystem;
//!
//! let mut fs = FileSystem::new();
//! fs.mkdir("docs").unwrap();
//! fs.write_file("docs/hello.txt", "hello, world!").unwrap();
//! fs.ln("docs/hello.txt", "greeting.txt").unwrap();
//! assert_eq!(fs.read_file("greeting.txt").unwrap(), b"hello, world!");
//! assert_eq!(fs.ls("").unwrap(), vec!["docs", "greeting.txt"]);
//! ```

mod entry;
mod filesystem;
mod metadata;
mod path;

pub use filesystem::{EntryDetails, EntryKind, FileSystem, FsError};
pub use metadata::{Clock, SteppingClock, SystemClock, TIMESTAMP_FORMAT, Timestamp};
