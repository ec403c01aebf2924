use snafu::ensure;

use crate::filesystem::{FsError, InvalidPathSnafu};

pub(crate) const SEPARATOR: char = '/';
pub(crate) const CURRENT_DIR: &str = ".";
pub(crate) const PARENT_DIR: &str = "..";

/// A path split on the separator, with empty segments dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathSegments<'a> {
    absolute: bool,
    segments: Vec<&'a str>,
}

impl<'a> PathSegments<'a> {
    pub(crate) fn parse(path: &'a str) -> Result<Self, FsError> {
        ensure!(
            !path.contains('\0'),
            InvalidPathSnafu {
                path,
                reason: "contains a NUL character",
            }
        );

        Ok(Self {
            absolute: path.starts_with(SEPARATOR),
            segments: path
                .split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .collect(),
        })
    }

    /// Absolute paths start at the root, everything else at cwd.
    pub(crate) fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().copied()
    }

    /// Splits into the leading segments and the final one.
    pub(crate) fn split_last(&self) -> Option<(&'a str, &[&'a str])> {
        self.segments
            .split_last()
            .map(|(last, leading)| (*last, leading))
    }

    pub(crate) fn as_slice(&self) -> &[&'a str] {
        &self.segments
    }
}
