use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::direction::Heading;
use crate::location::Point;

/// The identity of a vine, unique within a level.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VineId(pub String);

impl From<&str> for VineId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for VineId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for VineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for VineId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rigid chain of cells that slides head-first in a fixed direction.
///
/// `ordered_path` runs from head to tail. Its length never changes.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Vine {
    /// Identity, unique within the level.
    pub id: VineId,
    /// The direction the head moves in.
    pub head_direction: Heading,
    /// Occupied cells, head first.
    pub ordered_path: Vec<Point>,
    /// Palette slot used by renderers. Not interpreted by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_index: Option<u32>,
}

impl Vine {
    /// Construct a vine from its parts.
    pub fn new(id: impl Into<VineId>, head_direction: impl Into<Heading>, ordered_path: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            head_direction: head_direction.into(),
            ordered_path,
            color_index: None,
        }
    }

    /// The leading cell, if the path is non-empty.
    pub fn head(&self) -> Option<Point> {
        self.ordered_path.first().copied()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.ordered_path.len()
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.ordered_path.is_empty()
    }

    /// A vine which can never move: its path is empty or its heading is not a known direction.
    pub fn is_degenerate(&self) -> bool {
        self.is_empty() || self.head_direction.direction().is_none()
    }
}
