use std::fmt;

use derive_more::Display;
use serde::Serialize;

use crate::entry::{Node, NodeKind};
use crate::metadata::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntryKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// Snapshot of one entry's metadata, as returned by
/// [`FileSystem::ls_details`](crate::FileSystem::ls_details) and
/// [`FileSystem::stat`](crate::FileSystem::stat).
///
/// `Display` renders the record as a single JSON object whose keys are, in
/// order, `name`, `ctime`, `mtime`, `atime` and `links`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDetails {
    pub name: String,
    #[serde(skip)]
    pub kind: EntryKind,
    #[serde(rename = "ctime")]
    pub created: Timestamp,
    #[serde(rename = "mtime")]
    pub modified: Timestamp,
    #[serde(rename = "atime")]
    pub accessed: Timestamp,
    pub links: u32,
}

impl EntryDetails {
    pub(crate) fn new(name: impl Into<String>, node: &Node) -> Self {
        let kind = match node.kind {
            NodeKind::Directory(_) => EntryKind::Directory,
            NodeKind::File(_) => EntryKind::File,
        };
        Self {
            name: name.into(),
            kind,
            created: node.metadata.created(),
            modified: node.metadata.modified(),
            accessed: node.metadata.accessed(),
            links: node.metadata.links(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

impl fmt::Display for EntryDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
