//! Directory and file nodes, and the arena that owns them.
//!
//! A directory slot never owns its child: it stores a [`NodeId`] into the
//! [`NodeArena`]. Hard links are simply several slots holding the same id, and
//! the node's link count tells the arena when the last slot is gone.

mod arena;
mod node;

pub(crate) use arena::NodeArena;
pub(crate) use node::{Directory, File, Node, NodeId, NodeKind};
