use derive_more::{Display, From};
use hashlink::LinkedHashMap;

use crate::metadata::Metadata;

/// Index of a node inside the arena. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("#{_0}")]
pub(crate) struct NodeId(u64);

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) metadata: Metadata,
    pub(crate) kind: NodeKind,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Directory(Directory),
    File(File),
}

impl NodeKind {
    pub(crate) fn as_directory(&self) -> Option<&Directory> {
        match self {
            NodeKind::Directory(directory) => Some(directory),
            NodeKind::File(_) => None,
        }
    }

    pub(crate) fn as_directory_mut(&mut self) -> Option<&mut Directory> {
        match self {
            NodeKind::Directory(directory) => Some(directory),
            NodeKind::File(_) => None,
        }
    }
}

/// Children are kept in insertion order, which is also listing order.
#[derive(Debug, Default)]
pub(crate) struct Directory {
    /// Parent directory and the name of the slot holding this one there.
    parent: Option<(NodeId, String)>,
    children: LinkedHashMap<String, NodeId>,
}

impl Directory {
    pub(crate) fn root() -> Self {
        Self::default()
    }

    pub(crate) fn new(parent: NodeId, name: impl Into<String>) -> Self {
        Self {
            parent: Some((parent, name.into())),
            children: LinkedHashMap::new(),
        }
    }

    /// `None` only for the root.
    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent.as_ref().map(|(parent, _)| *parent)
    }

    /// Name of this directory's slot in its parent; `None` only for the root.
    pub(crate) fn name(&self) -> Option<&str> {
        self.parent.as_ref().map(|(_, name)| name.as_str())
    }

    pub(crate) fn set_parent(&mut self, parent: NodeId, name: impl Into<String>) {
        self.parent = Some((parent, name.into()));
    }

    pub(crate) fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Appends a slot. Callers check for collisions first; an existing slot
    /// with the same name would be overwritten in place.
    pub(crate) fn insert_child(&mut self, name: impl Into<String>, child: NodeId) {
        self.children.insert(name.into(), child);
    }

    pub(crate) fn remove_child(&mut self, name: &str) -> Option<NodeId> {
        self.children.remove(name)
    }
}

#[derive(Debug, Default)]
pub(crate) struct File {
    content: Vec<u8>,
}

impl File {
    pub(crate) fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    pub(crate) fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn replace_content(&mut self, content: Vec<u8>) {
        self.content = content;
    }
}
