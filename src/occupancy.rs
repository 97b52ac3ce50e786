use ndarray::Array2;

use crate::level::Level;
use crate::location::{GridSize, Point};
use crate::state::PuzzleState;
use crate::vine::Vine;

/// Which active vine, if any, holds each cell of the grid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Occupancy {
    grid: GridSize,
    cells: Array2<Option<usize>>,
}

impl Occupancy {
    /// An occupancy grid with nothing on it.
    pub fn empty(grid: GridSize) -> Self {
        Self {
            grid,
            cells: Array2::from_elem(grid.shape(), None),
        }
    }

    /// The footprint of every vine present in `state`.
    pub fn of<S: PuzzleState>(level: &Level, state: &S) -> Self {
        Self::from_indices(level, state.indices())
    }

    /// The footprint of the vines at `indices`.
    pub fn from_indices(level: &Level, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut occupancy = Self::empty(level.grid());
        for index in indices {
            if let Some(vine) = level.vine(index) {
                occupancy.insert(index, vine);
            }
        }
        occupancy
    }

    /// Mark the cells of `vine` as held by `index`. Off-grid cells are ignored.
    pub fn insert(&mut self, index: usize, vine: &Vine) {
        for point in &vine.ordered_path {
            if let Some(cell) = self.grid.index_of(*point).and_then(|ind| self.cells.get_mut(ind)) {
                *cell = Some(index);
            }
        }
    }

    /// Release the cells held by `index`.
    pub fn remove(&mut self, index: usize, vine: &Vine) {
        for point in &vine.ordered_path {
            if let Some(cell) = self.grid.index_of(*point).and_then(|ind| self.cells.get_mut(ind)) {
                if *cell == Some(index) {
                    *cell = None;
                }
            }
        }
    }

    /// The vine holding `point`. Always [`None`] off the grid.
    #[inline]
    pub fn occupant(&self, point: Point) -> Option<usize> {
        self.grid.index_of(point).and_then(|ind| self.cells.get(ind).copied().flatten())
    }

    /// The grid this occupancy covers.
    pub fn grid(&self) -> GridSize {
        self.grid
    }
}
