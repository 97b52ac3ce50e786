use std::fmt::{Display, Formatter};
use std::num::NonZero;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) type Coord = i32;
/// A nonzero grid extent.
pub type Dimension = NonZero<usize>;

/// A cell `(x, y)` on a grid. The bottom left corner is `Point { x: 0, y: 0 }` and `y` grows upwards.
///
/// Coordinates are signed so a head which has just left the grid can still be represented.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Point {
    /// Column, growing to the right.
    pub x: Coord,
    /// Row, growing upwards.
    pub y: Coord,
}

impl Point {
    /// Construct a point from its coordinates.
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Translate this point by `rhs`, given as `(dx, dy)`.
    pub const fn offset_by(self, rhs: (Coord, Coord)) -> Self {
        Self::new(self.x + rhs.0, self.y + rhs.1)
    }

    /// Whether `self` and `other` share an edge, i.e. `|dx| + |dy| == 1`.
    pub fn is_adjacent_to(&self, other: Point) -> bool {
        u64::from(self.x.abs_diff(other.x)) + u64::from(self.y.abs_diff(other.y)) == 1
    }
}

impl From<(Coord, Coord)> for Point {
    fn from(value: (Coord, Coord)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Raised when a `grid_size` pair cannot describe a board.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum InvalidExtent {
    /// One side is zero.
    #[error("grid size {0}x{1} has a zero extent")]
    Zero(usize, usize),
    /// One side exceeds [`GridSize::MAX_EXTENT`].
    #[error("grid size {0}x{1} exceeds the maximum extent of {max}", max = GridSize::MAX_EXTENT)]
    TooLarge(usize, usize),
}

/// Width and height of a board, encoded in level files as `[width, height]`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[usize; 2]", into = "[usize; 2]")]
pub struct GridSize {
    /// Number of columns.
    pub width: Dimension,
    /// Number of rows.
    pub height: Dimension,
}

impl GridSize {
    /// Largest width or height a board may have.
    pub const MAX_EXTENT: usize = 1024;

    /// Construct a grid size, failing if either extent is zero or above [`Self::MAX_EXTENT`].
    pub fn new(width: usize, height: usize) -> Result<Self, InvalidExtent> {
        Self::try_from([width, height])
    }

    /// Whether `point` lies in `[0, width) x [0, height)`.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && (point.x as usize) < self.width.get() && (point.y as usize) < self.height.get()
    }

    /// The `(row, column)` index of `point` into a row-major array of this size, if `point` is on the grid.
    pub(crate) fn index_of(&self, point: Point) -> Option<(usize, usize)> {
        self.contains(point).then(|| (point.y as usize, point.x as usize))
    }

    /// Array shape `(rows, columns)` for dense per-cell storage.
    pub(crate) fn shape(&self) -> (usize, usize) {
        (self.height.get(), self.width.get())
    }

    /// Number of cells on the grid.
    pub fn area(&self) -> usize {
        self.width.get().saturating_mul(self.height.get())
    }

    /// Whether both sides are within [`Self::MAX_EXTENT`].
    pub fn is_addressable(&self) -> bool {
        self.width.get() <= Self::MAX_EXTENT && self.height.get() <= Self::MAX_EXTENT
    }
}

impl TryFrom<[usize; 2]> for GridSize {
    type Error = InvalidExtent;

    fn try_from(value: [usize; 2]) -> Result<Self, Self::Error> {
        let [width, height] = value;
        if width > Self::MAX_EXTENT || height > Self::MAX_EXTENT {
            return Err(InvalidExtent::TooLarge(width, height));
        }

        match (Dimension::new(width), Dimension::new(height)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(InvalidExtent::Zero(width, height)),
        }
    }
}

impl From<GridSize> for [usize; 2] {
    fn from(value: GridSize) -> Self {
        [value.width.get(), value.height.get()]
    }
}
