use std::collections::VecDeque;
use std::io::Cursor;

use snafu::{OptionExt, ensure};
use tracing::debug;

use super::{
    AlreadyExistsSnafu, DirectoryNotEmptySnafu, EntryDetails, FsError, InvalidPathSnafu,
    IsADirectorySnafu, NotFoundSnafu,
};
use crate::entry::{NodeArena, NodeId, NodeKind};
use crate::metadata::{Clock, SystemClock};
use crate::path::{CURRENT_DIR, PARENT_DIR, ParentSlot, PathSegments, Resolver, SEPARATOR};

const ROOT_NAME: &str = "/";

/// An in-memory filesystem tree.
///
/// Paths use `/` as separator. Absolute paths start at the root, relative ones
/// at the current directory; `.` and `..` behave as on Unix, with `..` at the
/// root staying at the root. The empty path names the current directory.
///
/// Every operation either succeeds completely or fails without changing the
/// tree. The type does no internal locking: share it between threads only
/// behind a lock held for the whole call.
#[derive(Debug)]
pub struct FileSystem<C: Clock = SystemClock> {
    arena: NodeArena,
    root: NodeId,
    cwd: NodeId,
    clock: C,
}

impl FileSystem<SystemClock> {
    /// An empty filesystem stamped with wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for FileSystem<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FileSystem<C> {
    /// An empty filesystem whose timestamps come from `clock`.
    pub fn with_clock(clock: C) -> Self {
        let (arena, root) = NodeArena::with_root(clock.now());
        Self {
            arena,
            root,
            cwd: root,
            clock,
        }
    }

    /// Absolute path of the current directory.
    pub fn cwd(&self) -> String {
        self.arena.path_of(self.cwd)
    }

    /// Names in the directory at `path`, in insertion order.
    pub fn ls(&self, path: &str) -> Result<Vec<String>, FsError> {
        let (_, directory) = self.resolver().resolve_directory(path)?;
        Ok(directory
            .children()
            .map(|(name, _)| name.to_owned())
            .collect())
    }

    /// Like [`FileSystem::ls`], with each child's metadata. Listing does not
    /// count as reading, so no access time changes.
    pub fn ls_details(&self, path: &str) -> Result<Vec<EntryDetails>, FsError> {
        let (_, directory) = self.resolver().resolve_directory(path)?;
        directory
            .children()
            .map(|(name, id)| {
                self.arena
                    .get(id)
                    .map(|node| EntryDetails::new(name, node))
                    .context(NotFoundSnafu { path })
            })
            .collect()
    }

    /// Metadata of a single entry. Does not update its access time.
    pub fn stat(&self, path: &str) -> Result<EntryDetails, FsError> {
        let id = self.resolver().resolve(path)?;
        let node = self.arena.get(id).context(NotFoundSnafu { path })?;
        let name = match node.kind {
            NodeKind::Directory(_) if id == self.root => ROOT_NAME,
            NodeKind::Directory(_) => self.arena.name_of(id).unwrap_or_default(),
            // Files can only be reached through a plain final segment.
            NodeKind::File(_) => PathSegments::parse(path)?
                .split_last()
                .map(|(last, _)| last)
                .unwrap_or_default(),
        };
        Ok(EntryDetails::new(name, node))
    }

    pub fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        debug!("mkdir '{}'", path);
        let slot = self.resolver().resolve_parent(path)?;
        ensure!(slot.existing.is_none(), AlreadyExistsSnafu { path });

        let now = self.clock.now();
        self.arena.insert_directory(slot.parent, slot.name, now);
        Ok(())
    }

    /// Creates `path` and any missing directories above it. Succeeds when the
    /// directory already exists.
    pub fn mkdir_all(&mut self, path: &str) -> Result<(), FsError> {
        debug!("mkdir -p '{}'", path);
        let resolver = self.resolver();
        resolver.check_directory_chain(path)?;

        let segments = PathSegments::parse(path)?;
        let mut current = resolver.base(&segments);
        for segment in segments.iter() {
            let directory = self.arena.directory(current).context(NotFoundSnafu { path })?;
            current = match segment {
                CURRENT_DIR => current,
                PARENT_DIR => directory.parent().unwrap_or(current),
                name => match directory.child(name) {
                    Some(child) => child,
                    None => {
                        let now = self.clock.now();
                        self.arena.insert_directory(current, name, now)
                    }
                },
            };
        }
        Ok(())
    }

    /// Writes `content` to the file at `path`, creating it if needed.
    /// Overwriting only moves the modification time.
    pub fn write_file(&mut self, path: &str, content: impl AsRef<[u8]>) -> Result<(), FsError> {
        debug!("write '{}' ({} bytes)", path, content.as_ref().len());
        let slot = self.resolver().resolve_parent(path)?;

        let Some(id) = slot.existing else {
            let now = self.clock.now();
            self.arena
                .insert_file(slot.parent, slot.name, content.as_ref().to_vec(), now);
            return Ok(());
        };

        let node = self.arena.get_mut(id).context(NotFoundSnafu { path })?;
        match &mut node.kind {
            NodeKind::Directory(_) => IsADirectorySnafu { path }.fail(),
            NodeKind::File(file) => {
                file.replace_content(content.as_ref().to_vec());
                node.metadata.mark_modified(self.clock.now());
                Ok(())
            }
        }
    }

    /// Creates an empty file unless something already exists at `path`.
    pub fn touch(&mut self, path: &str) -> Result<(), FsError> {
        debug!("touch '{}'", path);
        match self.resolver().resolve(path) {
            Ok(_) => Ok(()),
            Err(FsError::NotFound { .. }) => {
                let slot = self.resolver().resolve_parent(path)?;
                let now = self.clock.now();
                self.arena.insert_file(slot.parent, slot.name, Vec::new(), now);
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Returns the file's content and updates its access time.
    pub fn read_file(&mut self, path: &str) -> Result<Vec<u8>, FsError> {
        debug!("read '{}'", path);
        self.access_content(path).map(<[u8]>::to_vec)
    }

    /// Reader over the file's content without copying it. The access time is
    /// updated once, when the reader is handed out.
    pub fn stream_file(&mut self, path: &str) -> Result<Cursor<&[u8]>, FsError> {
        debug!("stream '{}'", path);
        self.access_content(path).map(Cursor::new)
    }

    fn access_content(&mut self, path: &str) -> Result<&[u8], FsError> {
        let id = self.resolver().resolve(path)?;

        let node = self.arena.get_mut(id).context(NotFoundSnafu { path })?;
        match &node.kind {
            NodeKind::Directory(_) => IsADirectorySnafu { path }.fail(),
            NodeKind::File(file) => {
                node.metadata.mark_accessed(self.clock.now());
                Ok(file.content())
            }
        }
    }

    pub fn cd(&mut self, path: &str) -> Result<(), FsError> {
        debug!("cd '{}'", path);
        let (id, _) = self.resolver().resolve_directory(path)?;
        self.cwd = id;
        Ok(())
    }

    /// Removes the slot at `path`. Non-empty directories need `recursive`.
    ///
    /// The node behind the slot is destroyed only once no other hard link
    /// refers to it. Removing a directory that contains the current directory
    /// moves the current directory to the removed directory's parent.
    pub fn rm(&mut self, path: &str, recursive: bool) -> Result<(), FsError> {
        debug!("rm{} '{}'", if recursive { " -r" } else { "" }, path);
        let slot = self.resolver().resolve_parent(path)?;
        let id = slot.existing.context(NotFoundSnafu { path })?;

        if let Some(directory) = self.arena.directory(id) {
            ensure!(
                recursive || directory.is_empty(),
                DirectoryNotEmptySnafu { path }
            );
        }

        let contains_cwd = self.arena.is_ancestor_or_self(id, self.cwd);
        let now = self.clock.now();
        let destroyed = self.arena.unlink(slot.parent, slot.name, now);
        debug!("rm '{}' destroyed {} node(s)", path, destroyed);

        if contains_cwd {
            self.cwd = slot.parent;
        }
        Ok(())
    }

    /// Moves or renames the slot at `src`.
    ///
    /// When `dst` names an existing directory the entry moves into it under
    /// its current name; otherwise `dst` is the new parent and name. Nothing
    /// is ever overwritten, and the moved node keeps its content, link count
    /// and timestamps.
    pub fn mv(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        debug!("mv '{}' '{}'", src, dst);
        let resolver = self.resolver();
        let source = resolver.resolve_parent(src)?;
        let id = source.existing.context(NotFoundSnafu { path: src })?;

        let target = match resolver.resolve_directory(dst) {
            Ok((parent, directory)) => ParentSlot {
                parent,
                name: source.name,
                existing: directory.child(source.name),
            },
            Err(FsError::NotFound { .. } | FsError::NotADirectory { .. }) => {
                resolver.resolve_parent(dst)?
            }
            Err(error) => return Err(error),
        };

        if target.is_same_slot(&source) {
            return Ok(());
        }
        ensure!(target.existing.is_none(), AlreadyExistsSnafu { path: dst });
        if self.arena.is_directory(id) {
            ensure!(
                !self.arena.is_ancestor_or_self(id, target.parent),
                InvalidPathSnafu {
                    path: dst,
                    reason: format!("cannot move '{src}' inside itself"),
                }
            );
        }

        let now = self.clock.now();
        self.arena
            .relocate(source.parent, source.name, target.parent, target.name, now);
        Ok(())
    }

    /// Adds a hard link at `dst` to the file at `src`. Directories cannot be
    /// linked.
    pub fn ln(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        debug!("ln '{}' '{}'", src, dst);
        let resolver = self.resolver();
        let id = resolver.resolve(src)?;
        ensure!(!self.arena.is_directory(id), IsADirectorySnafu { path: src });

        let target = resolver.resolve_parent(dst)?;
        ensure!(target.existing.is_none(), AlreadyExistsSnafu { path: dst });

        let now = self.clock.now();
        self.arena.link(target.parent, target.name, id, now);
        Ok(())
    }

    /// Paths of every entry named `name` below the directory at `path`,
    /// nearest first, siblings in insertion order.
    ///
    /// Results are relative to the search directory; when `path` is not
    /// empty it is prefixed to each result.
    pub fn find(&self, name: &str, path: &str) -> Result<Vec<String>, FsError> {
        let (_, base) = self.resolver().resolve_directory(path)?;
        let prefix = path.trim_end_matches(SEPARATOR);

        let mut found = Vec::new();
        let mut queue = VecDeque::from([(String::new(), base)]);
        while let Some((relative, directory)) = queue.pop_front() {
            for (child_name, child) in directory.children() {
                let child_path = if relative.is_empty() {
                    child_name.to_owned()
                } else {
                    format!("{relative}{SEPARATOR}{child_name}")
                };
                if child_name == name {
                    found.push(child_path.clone());
                }
                if let Some(subdirectory) = self.arena.directory(child) {
                    queue.push_back((child_path, subdirectory));
                }
            }
        }

        if !path.is_empty() {
            for entry in &mut found {
                *entry = format!("{prefix}{SEPARATOR}{entry}");
            }
        }
        debug!("find '{}' in '{}': {} match(es)", name, path, found.len());
        Ok(found)
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.arena, self.root, self.cwd)
    }
}

#[cfg(test)]
impl<C: Clock> FileSystem<C> {
    pub(crate) fn live_nodes(&self) -> usize {
        self.arena.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{SteppingClock, Timestamp};
    use rstest::*;
    use std::io::Read;

    #[fixture]
    fn fs() -> FileSystem<SteppingClock> {
        FileSystem::with_clock(SteppingClock::default())
    }

    fn assert_unchanged(fs: &FileSystem<SteppingClock>, before: &[EntryDetails], cwd: &str) {
        assert_eq!(fs.ls_details("/").unwrap(), before);
        assert_eq!(fs.cwd(), cwd);
    }

    #[rstest]
    fn starts_empty_at_root(fs: FileSystem<SteppingClock>) {
        assert_eq!(fs.cwd(), "/");
        assert!(fs.ls("").unwrap().is_empty());
        assert_eq!(fs.live_nodes(), 1);
    }

    #[rstest]
    fn stat_of_root_is_named_slash(fs: FileSystem<SteppingClock>) {
        let details = fs.stat("/").unwrap();
        assert_eq!(details.name, "/");
        assert!(details.is_directory());
        assert_eq!(details.links, 1);
    }

    #[rstest]
    fn mkdir_sets_all_timestamps_to_creation(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir("a").unwrap();
        let details = fs.stat("a").unwrap();
        assert_eq!(details.created, details.modified);
        assert_eq!(details.created, details.accessed);
        assert_eq!(details.links, 1);
    }

    #[rstest]
    fn write_updates_only_modification_time(mut fs: FileSystem<SteppingClock>) {
        fs.write_file("f", "one").unwrap();
        let before = fs.stat("f").unwrap();

        fs.write_file("f", "two").unwrap();
        let after = fs.stat("f").unwrap();

        assert_eq!(after.created, before.created);
        assert_eq!(after.accessed, before.accessed);
        assert!(after.modified > before.modified);
    }

    #[rstest]
    fn read_updates_only_access_time(mut fs: FileSystem<SteppingClock>) {
        fs.write_file("f", "one").unwrap();
        let before = fs.stat("f").unwrap();

        assert_eq!(fs.read_file("f").unwrap(), b"one");
        let after = fs.stat("f").unwrap();

        assert_eq!(after.modified, before.modified);
        assert!(after.accessed > before.accessed);
    }

    #[rstest]
    fn stream_updates_access_time_once(mut fs: FileSystem<SteppingClock>) {
        fs.write_file("f", "streamed").unwrap();
        let before = fs.stat("f").unwrap();

        let mut content = String::new();
        fs.stream_file("f").unwrap().read_to_string(&mut content).unwrap();
        let after = fs.stat("f").unwrap();

        assert_eq!(content, "streamed");
        assert_eq!(after.modified, before.modified);
        assert_eq!(
            after.accessed,
            Timestamp::from_unix_seconds(2).unwrap(),
            "one clock reading for the whole stream"
        );
    }

    #[rstest]
    fn stream_rejects_directories(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir("dir").unwrap();
        let before = fs.ls_details("/").unwrap();

        assert!(matches!(
            fs.stream_file("dir"),
            Err(FsError::IsADirectory { .. })
        ));
        assert_unchanged(&fs, &before, "/");
    }

    #[rstest]
    fn listing_never_updates_access_time(mut fs: FileSystem<SteppingClock>) {
        fs.write_file("f", "one").unwrap();
        let before = fs.stat("f").unwrap();
        fs.ls("").unwrap();
        fs.ls_details("").unwrap();
        fs.find("f", "").unwrap();
        assert_eq!(fs.stat("f").unwrap(), before);
    }

    #[rstest]
    fn directory_access_time_only_records_creation(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir("d").unwrap();
        fs.write_file("d/f", "x").unwrap();
        let before = fs.stat("d").unwrap().accessed;

        fs.ls("d").unwrap();
        fs.ls_details("d").unwrap();
        fs.cd("d").unwrap();
        fs.read_file("f").unwrap();

        assert_eq!(fs.stat("/d").unwrap().accessed, before);
        assert_eq!(before, fs.stat("/d").unwrap().created);
    }

    #[rstest]
    fn membership_changes_touch_parent_modification_time(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir("dir").unwrap();
        let created = fs.stat("dir").unwrap().modified;

        fs.write_file("dir/f", "x").unwrap();
        let after_create = fs.stat("dir").unwrap().modified;
        assert!(after_create > created);

        fs.write_file("dir/f", "y").unwrap();
        assert_eq!(fs.stat("dir").unwrap().modified, after_create);

        fs.rm("dir/f", false).unwrap();
        assert!(fs.stat("dir").unwrap().modified > after_create);
    }

    #[rstest]
    fn mv_keeps_node_timestamps(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir("dest").unwrap();
        fs.write_file("f", "x").unwrap();
        let before = fs.stat("f").unwrap();

        fs.mv("f", "dest/g").unwrap();
        let after = fs.stat("dest/g").unwrap();

        assert_eq!(after.created, before.created);
        assert_eq!(after.modified, before.modified);
        assert_eq!(after.accessed, before.accessed);
        assert_eq!(after.links, before.links);
    }

    #[rstest]
    fn ln_changes_only_link_count(mut fs: FileSystem<SteppingClock>) {
        fs.write_file("f", "x").unwrap();
        let before = fs.stat("f").unwrap();

        fs.ln("f", "g").unwrap();
        let after = fs.stat("f").unwrap();

        assert_eq!(after.links, 2);
        assert_eq!(after.modified, before.modified);
        assert_eq!(after.accessed, before.accessed);
        assert_eq!(fs.stat("g").unwrap().links, 2);
    }

    #[rstest]
    fn mkdir_all_creates_intermediates(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir_all("one/two/three").unwrap();
        assert_eq!(fs.ls("").unwrap(), vec!["one"]);
        assert_eq!(fs.ls("one").unwrap(), vec!["two"]);
        assert_eq!(fs.ls("one/two").unwrap(), vec!["three"]);

        fs.mkdir_all("one/two").unwrap();
        assert_eq!(fs.live_nodes(), 4);
    }

    #[rstest]
    fn mkdir_all_follows_parent_segments(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir_all("a/b/../c").unwrap();
        assert_eq!(fs.ls("a").unwrap(), vec!["b", "c"]);
    }

    #[rstest]
    fn mkdir_all_is_atomic(mut fs: FileSystem<SteppingClock>) {
        fs.write_file("f", "x").unwrap();
        let before = fs.ls_details("/").unwrap();

        let error = fs.mkdir_all("new/../f/deeper").unwrap_err();

        assert!(matches!(error, FsError::NotADirectory { .. }));
        assert_unchanged(&fs, &before, "/");
        assert_eq!(fs.live_nodes(), 2);
    }

    #[rstest]
    fn touch_creates_or_leaves_alone(mut fs: FileSystem<SteppingClock>) {
        fs.touch("f").unwrap();
        assert_eq!(fs.read_file("f").unwrap(), b"");
        fs.write_file("f", "keep").unwrap();
        let before = fs.stat("f").unwrap();

        fs.touch("f").unwrap();

        assert_eq!(fs.stat("f").unwrap(), before);
        assert_eq!(fs.read_file("f").unwrap(), b"keep");
        assert!(matches!(
            fs.touch("missing/f"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[rstest]
    fn rm_of_cwd_moves_cwd_to_parent(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir_all("a/b/c").unwrap();
        fs.cd("a/b/c").unwrap();

        fs.rm("/a/b", true).unwrap();

        assert_eq!(fs.cwd(), "/a");
        assert_eq!(fs.live_nodes(), 2);
    }

    #[rstest]
    #[case("/")]
    #[case(".")]
    #[case("..")]
    #[case("a/..")]
    fn rm_rejects_paths_without_a_slot(mut fs: FileSystem<SteppingClock>, #[case] path: &str) {
        fs.mkdir("a").unwrap();
        let before = fs.ls_details("/").unwrap();

        let error = fs.rm(path, true).unwrap_err();

        assert!(matches!(error, FsError::InvalidPath { .. }));
        assert_unchanged(&fs, &before, "/");
    }

    #[rstest]
    fn mv_into_descendant_is_rejected(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir_all("a/b").unwrap();
        let before = fs.ls_details("/").unwrap();

        assert!(matches!(fs.mv("a", "a/b"), Err(FsError::InvalidPath { .. })));
        assert!(matches!(fs.mv("a", "a"), Err(FsError::InvalidPath { .. })));
        assert!(matches!(
            fs.mv("a", "a/b/renamed"),
            Err(FsError::InvalidPath { .. })
        ));
        assert_unchanged(&fs, &before, "/");
    }

    #[rstest]
    fn mv_onto_same_slot_is_noop(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir("dir").unwrap();
        fs.write_file("dir/f", "x").unwrap();
        let before = fs.ls_details("dir").unwrap();

        fs.mv("dir/f", "dir/f").unwrap();
        fs.mv("dir/f", "dir").unwrap();
        fs.cd("dir").unwrap();
        fs.mv("f", ".").unwrap();

        assert_eq!(fs.ls_details("").unwrap(), before);
    }

    #[rstest]
    fn mv_renames_cwd_ancestor(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir_all("a/b").unwrap();
        fs.cd("a/b").unwrap();
        fs.mv("/a", "/z").unwrap();
        assert_eq!(fs.cwd(), "/z/b");
    }

    #[rstest]
    fn mv_onto_existing_file_fails(mut fs: FileSystem<SteppingClock>) {
        fs.write_file("f", "1").unwrap();
        fs.write_file("g", "2").unwrap();
        fs.ln("f", "h").unwrap();
        let before = fs.ls_details("/").unwrap();

        assert!(matches!(fs.mv("f", "g"), Err(FsError::AlreadyExists { .. })));
        assert!(matches!(fs.mv("f", "h"), Err(FsError::AlreadyExists { .. })));
        assert_unchanged(&fs, &before, "/");
    }

    #[rstest]
    fn find_is_breadth_first(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir_all("a/b/c/d").unwrap();
        fs.touch("a/b/c/d/e").unwrap();
        fs.mkdir("a/b/e").unwrap();

        assert_eq!(fs.find("e", "").unwrap(), vec!["a/b/e", "a/b/c/d/e"]);
        assert_eq!(fs.find("e", "/a/").unwrap(), vec!["/a/b/e", "/a/b/c/d/e"]);
        assert_eq!(fs.find("d", "/").unwrap(), vec!["/a/b/c/d"]);
        assert!(fs.find("nothing", "").unwrap().is_empty());
    }

    #[rstest]
    fn find_reports_every_hard_link(mut fs: FileSystem<SteppingClock>) {
        fs.mkdir("x").unwrap();
        fs.write_file("note", "n").unwrap();
        fs.ln("note", "x/note").unwrap();
        assert_eq!(fs.find("note", "").unwrap(), vec!["note", "x/note"]);
    }

    #[rstest]
    fn details_render_with_clock_timestamps() {
        let mut fs = FileSystem::with_clock(SteppingClock::new(0, 60));
        fs.write_file("f", "x").unwrap();
        fs.read_file("f").unwrap();

        let details = fs.ls_details("").unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].created, Timestamp::from_unix_seconds(60).unwrap());
        assert_eq!(
            details[0].to_string(),
            r#"{"name":"f","ctime":"Jan 01 1970 00:01:00","mtime":"Jan 01 1970 00:01:00","atime":"Jan 01 1970 00:02:00","links":1}"#
        );
    }
}
