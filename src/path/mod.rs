//! Path parsing and resolution against the node arena.

mod resolver;
mod segments;

pub(crate) use resolver::{ParentSlot, Resolver};
pub(crate) use segments::{CURRENT_DIR, PARENT_DIR, PathSegments, SEPARATOR};
