use std::collections::HashMap;

use tracing::{debug, warn};

use super::{Directory, File, Node, NodeId, NodeKind};
use crate::metadata::{Metadata, Timestamp};

/// Owner of every live node.
///
/// Slots in directories refer to nodes by id; the node's link count doubles as
/// its reference count. Structural mutations go through [`NodeArena::link`],
/// [`NodeArena::unlink`] and [`NodeArena::relocate`] so the counts, the parent
/// pointers and the parents' modification times move together.
#[derive(Debug)]
pub(crate) struct NodeArena {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl NodeArena {
    /// Creates an arena holding only an empty root directory.
    pub(crate) fn with_root(now: Timestamp) -> (Self, NodeId) {
        let mut arena = Self {
            nodes: HashMap::new(),
            next_id: 0,
        };
        let root = arena.allocate(NodeKind::Directory(Directory::root()), now);
        (arena, root)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Number of live nodes, the root included.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn directory(&self, id: NodeId) -> Option<&Directory> {
        self.get(id).and_then(|node| node.kind.as_directory())
    }

    pub(crate) fn is_directory(&self, id: NodeId) -> bool {
        self.directory(id).is_some()
    }

    pub(crate) fn insert_directory(&mut self, parent: NodeId, name: &str, now: Timestamp) -> NodeId {
        let id = self.allocate(NodeKind::Directory(Directory::new(parent, name)), now);
        self.attach(parent, name, id, now);
        debug!("Created directory {} '{}' under {}", id, name, parent);
        id
    }

    pub(crate) fn insert_file(
        &mut self,
        parent: NodeId,
        name: &str,
        content: Vec<u8>,
        now: Timestamp,
    ) -> NodeId {
        let id = self.allocate(NodeKind::File(File::new(content)), now);
        self.attach(parent, name, id, now);
        debug!("Created file {} '{}' under {}", id, name, parent);
        id
    }

    /// Adds another slot for an existing node.
    pub(crate) fn link(&mut self, parent: NodeId, name: &str, target: NodeId, now: Timestamp) {
        match self.nodes.get_mut(&target) {
            Some(node) => node.metadata.increment_links(),
            None => {
                warn!("Refusing to link dangling node {}", target);
                return;
            }
        }
        self.attach(parent, name, target, now);
    }

    /// Removes a slot and frees whatever is no longer referenced.
    /// Returns the number of nodes destroyed.
    pub(crate) fn unlink(&mut self, parent: NodeId, name: &str, now: Timestamp) -> usize {
        match self.detach(parent, name, now) {
            Some(id) => self.release(id),
            None => 0,
        }
    }

    /// Moves a slot without touching the node it refers to.
    pub(crate) fn relocate(
        &mut self,
        from_parent: NodeId,
        from_name: &str,
        to_parent: NodeId,
        to_name: &str,
        now: Timestamp,
    ) {
        let Some(id) = self.detach(from_parent, from_name, now) else {
            warn!("No slot '{}' under {} to relocate", from_name, from_parent);
            return;
        };
        self.attach(to_parent, to_name, id, now);
        if let Some(directory) = self.get_mut(id).and_then(|node| node.kind.as_directory_mut()) {
            directory.set_parent(to_parent, to_name);
        }
    }

    /// True when `node` is `ancestor` or lies somewhere below it.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.directory(id).and_then(Directory::parent);
        }
        false
    }

    /// Name of the slot holding a directory; `None` for the root and for files,
    /// which may sit in any number of slots.
    pub(crate) fn name_of(&self, id: NodeId) -> Option<&str> {
        self.directory(id)?.name()
    }

    /// Absolute path of a directory, built by following parent pointers.
    pub(crate) fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = self.directory(id);
        while let Some(directory) = current {
            let (Some(parent), Some(name)) = (directory.parent(), directory.name()) else {
                break;
            };
            names.push(name);
            current = self.directory(parent);
            if current.is_none() {
                warn!("Parent {} of '{}' is not a live directory", parent, name);
            }
        }

        names.reverse();
        format!("/{}", names.join("/"))
    }

    fn allocate(&mut self, kind: NodeKind, now: Timestamp) -> NodeId {
        let id = NodeId::from(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                metadata: Metadata::new(now),
                kind,
            },
        );
        id
    }

    fn attach(&mut self, parent: NodeId, name: &str, child: NodeId, now: Timestamp) {
        match self.nodes.get_mut(&parent) {
            Some(Node {
                metadata,
                kind: NodeKind::Directory(directory),
            }) => {
                directory.insert_child(name, child);
                metadata.mark_modified(now);
            }
            _ => warn!("Cannot attach {} under {}: not a live directory", child, parent),
        }
    }

    fn detach(&mut self, parent: NodeId, name: &str, now: Timestamp) -> Option<NodeId> {
        match self.nodes.get_mut(&parent) {
            Some(Node {
                metadata,
                kind: NodeKind::Directory(directory),
            }) => {
                let removed = directory.remove_child(name);
                if removed.is_some() {
                    metadata.mark_modified(now);
                }
                removed
            }
            _ => None,
        }
    }

    /// Drops one link from `id` and, transitively, from every child of each
    /// directory that gets destroyed on the way.
    fn release(&mut self, id: NodeId) -> usize {
        let mut pending = vec![id];
        let mut destroyed = 0;

        while let Some(id) = pending.pop() {
            let Some(node) = self.nodes.get_mut(&id) else {
                warn!("Released node {} is not in the arena", id);
                continue;
            };
            if node.metadata.decrement_links() > 0 {
                debug!("Node {} still has {} link(s)", id, node.metadata.links());
                continue;
            }
            if let Some(node) = self.nodes.remove(&id) {
                destroyed += 1;
                if let NodeKind::Directory(directory) = node.kind {
                    pending.extend(directory.children().map(|(_, child)| child));
                }
            }
        }

        debug!("Destroyed {} node(s)", destroyed);
        destroyed
    }
}
