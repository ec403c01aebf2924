use snafu::{OptionExt, ensure};

use super::{CURRENT_DIR, PARENT_DIR, PathSegments};
use crate::entry::{Directory, NodeArena, NodeId};
use crate::filesystem::{
    AlreadyExistsSnafu, FsError, InvalidPathSnafu, NotADirectorySnafu, NotFoundSnafu,
};

/// Where a create/replace/remove operation lands: the parent directory, the
/// final path segment, and whatever currently occupies that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParentSlot<'p> {
    pub(crate) parent: NodeId,
    pub(crate) name: &'p str,
    pub(crate) existing: Option<NodeId>,
}

impl ParentSlot<'_> {
    pub(crate) fn is_same_slot(&self, other: &ParentSlot<'_>) -> bool {
        self.parent == other.parent && self.name == other.name
    }
}

/// Read-only view used to turn path strings into node ids.
///
/// Every error carries the path exactly as the caller spelled it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolver<'a> {
    arena: &'a NodeArena,
    root: NodeId,
    cwd: NodeId,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(arena: &'a NodeArena, root: NodeId, cwd: NodeId) -> Self {
        Self { arena, root, cwd }
    }

    /// Locates an existing entry. An empty path is the base directory.
    pub(crate) fn resolve(&self, path: &str) -> Result<NodeId, FsError> {
        let segments = PathSegments::parse(path)?;
        self.walk(self.base(&segments), segments.as_slice(), path)
    }

    pub(crate) fn resolve_directory(&self, path: &str) -> Result<(NodeId, &'a Directory), FsError> {
        let id = self.resolve(path)?;
        let directory = self.arena.directory(id).context(NotADirectorySnafu { path })?;
        Ok((id, directory))
    }

    /// Resolves everything but the final segment, which is returned as a name
    /// together with its (existing) parent directory.
    pub(crate) fn resolve_parent<'p>(&self, path: &'p str) -> Result<ParentSlot<'p>, FsError> {
        let segments = PathSegments::parse(path)?;
        let (name, leading) = segments.split_last().context(InvalidPathSnafu {
            path,
            reason: "does not name an entry",
        })?;
        let parent = self.walk(self.base(&segments), leading, path)?;
        let directory = self.arena.directory(parent).context(NotADirectorySnafu { path })?;
        ensure!(
            name != CURRENT_DIR && name != PARENT_DIR,
            InvalidPathSnafu {
                path,
                reason: format!("'{name}' cannot be created, moved or removed"),
            }
        );
        Ok(ParentSlot {
            parent,
            name,
            existing: directory.child(name),
        })
    }

    /// Dry run of a recursive mkdir: fails exactly when creating every
    /// missing directory along `path` would fail, and creates nothing.
    pub(crate) fn check_directory_chain(&self, path: &str) -> Result<(), FsError> {
        // Once a segment is missing, everything below it will be a fresh, empty
        // directory; only `..` can climb back to nodes that already exist.
        enum Position {
            Existing(NodeId),
            Planned { anchor: NodeId, depth: usize },
        }

        let segments = PathSegments::parse(path)?;
        let mut position = Position::Existing(self.base(&segments));

        for segment in segments.iter() {
            position = match position {
                Position::Existing(id) => {
                    let directory = self.arena.directory(id).context(NotADirectorySnafu { path })?;
                    match segment {
                        CURRENT_DIR => Position::Existing(id),
                        PARENT_DIR => Position::Existing(directory.parent().unwrap_or(id)),
                        name => match directory.child(name) {
                            Some(child) => Position::Existing(child),
                            None => Position::Planned {
                                anchor: id,
                                depth: 1,
                            },
                        },
                    }
                }
                Position::Planned { anchor, depth } => match segment {
                    CURRENT_DIR => Position::Planned { anchor, depth },
                    PARENT_DIR if depth == 1 => Position::Existing(anchor),
                    PARENT_DIR => Position::Planned {
                        anchor,
                        depth: depth - 1,
                    },
                    _ => Position::Planned {
                        anchor,
                        depth: depth + 1,
                    },
                },
            };
        }

        if let Position::Existing(id) = position {
            ensure!(self.arena.is_directory(id), AlreadyExistsSnafu { path });
        }
        Ok(())
    }

    pub(crate) fn base(&self, segments: &PathSegments<'_>) -> NodeId {
        if segments.is_absolute() {
            self.root
        } else {
            self.cwd
        }
    }

    fn walk(&self, start: NodeId, segments: &[&str], path: &str) -> Result<NodeId, FsError> {
        segments.iter().try_fold(start, |current, segment| {
            let directory = self.arena.directory(current).context(NotADirectorySnafu { path })?;
            match *segment {
                CURRENT_DIR => Ok(current),
                PARENT_DIR => Ok(directory.parent().unwrap_or(current)),
                name => directory.child(name).context(NotFoundSnafu { path }),
            }
        })
    }
}
