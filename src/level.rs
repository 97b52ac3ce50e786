use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::direction::{Direction, Heading};
use crate::location::{GridSize, Point};
use crate::vine::{Vine, VineId};

/// How the points of a [`Mask`] are interpreted.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskMode {
    /// The listed points are hidden; everything else is visible.
    Hide,
    /// Only the listed points are visible.
    Show,
    /// Every cell is visible and the points are ignored.
    #[default]
    ShowAll,
}

/// Cell visibility for non-rectangular boards.
///
/// Hidden cells cannot hold vines at load time but are passable while sliding.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    /// Interpretation of `points`.
    #[serde(default)]
    pub mode: MaskMode,
    /// Cells affected by the mask.
    #[serde(default)]
    pub points: Vec<Point>,
}

impl Mask {
    /// Whether `point` is hidden by this mask.
    pub fn hides(&self, point: Point) -> bool {
        match self.mode {
            MaskMode::Hide => self.points.contains(&point),
            MaskMode::Show => !self.points.contains(&point),
            MaskMode::ShowAll => false,
        }
    }
}

fn default_grace() -> u32 {
    3
}

/// A level exactly as it appears in level JSON, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Numeric level id.
    #[serde(default)]
    pub id: u32,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Board extent, `[width, height]`.
    pub grid_size: GridSize,
    /// Optional visibility mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
    /// The vines in their starting positions.
    pub vines: Vec<Vine>,
    /// Move allowance shown to the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_moves: Option<u32>,
    /// Length of the best known clearing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_moves: Option<u32>,
    /// Number of blocked taps forgiven before the level is lost.
    #[serde(default = "default_grace")]
    pub grace: u32,
}

/// Load-time defects which make a level unusable.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StructuralError {
    /// Segment `index` is not orthogonally adjacent to segment `index - 1`.
    #[error("vine {vine}: segment {index} is not adjacent to the segment before it")]
    NonContiguous {
        /// Offending vine.
        vine: VineId,
        /// Index of the later segment of the pair.
        index: usize,
    },
    /// The same cell appears twice in one path.
    #[error("vine {vine}: visits {at} more than once")]
    SelfIntersecting {
        /// Offending vine.
        vine: VineId,
        /// The repeated cell.
        at: Point,
    },
    /// Two distinct vines start on the same cell.
    #[error("vine {vine}: cell {at} overlaps with vine {other}")]
    Overlap {
        /// The vine listed later.
        vine: VineId,
        /// The vine which already claimed the cell.
        other: VineId,
        /// The shared cell.
        at: Point,
    },
    /// A path cell lies off the grid.
    #[error("vine {vine}: cell {at} lies outside the grid")]
    OutOfBounds {
        /// Offending vine.
        vine: VineId,
        /// The stray cell.
        at: Point,
    },
    /// A path cell is hidden by the mask.
    #[error("vine {vine}: cell {at} is masked out but occupied")]
    MaskedCell {
        /// Offending vine.
        vine: VineId,
        /// The hidden cell.
        at: Point,
    },
    /// Two vines share an id.
    #[error("vine id {vine} is used more than once")]
    DuplicateId {
        /// The repeated id.
        vine: VineId,
    },
    /// The board is wider or taller than [`GridSize::MAX_EXTENT`].
    #[error("grid size {width}x{height} exceeds the maximum extent")]
    OversizedGrid {
        /// Number of columns.
        width: usize,
        /// Number of rows.
        height: usize,
    },
}

/// Reasons a level could not be loaded.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The input is not level JSON.
    #[error("malformed level JSON")]
    Parse(#[from] serde_json::Error),
    /// The level parsed but breaks a structural rule.
    #[error("level failed structural validation ({} errors)", .0.len())]
    Structural(Vec<StructuralError>),
}

impl From<Vec<StructuralError>> for LevelError {
    fn from(value: Vec<StructuralError>) -> Self {
        Self::Structural(value)
    }
}

/// Check every structural rule on `definition`, returning all violations found.
pub fn validate(definition: &LevelDefinition) -> Vec<StructuralError> {
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::with_capacity(definition.vines.len());
    let mut claimed: HashMap<Point, &VineId> = HashMap::new();

    let grid = definition.grid_size;
    if !grid.is_addressable() {
        errors.push(StructuralError::OversizedGrid { width: grid.width.get(), height: grid.height.get() });
        return errors;
    }

    for vine in &definition.vines {
        if !seen_ids.insert(&vine.id) {
            errors.push(StructuralError::DuplicateId { vine: vine.id.clone() });
        }

        let mut own = HashSet::with_capacity(vine.len());
        for (index, &at) in vine.ordered_path.iter().enumerate() {
            if index > 0 && !vine.ordered_path[index - 1].is_adjacent_to(at) {
                errors.push(StructuralError::NonContiguous { vine: vine.id.clone(), index });
            }

            if !definition.grid_size.contains(at) {
                errors.push(StructuralError::OutOfBounds { vine: vine.id.clone(), at });
                continue;
            }

            if definition.mask.as_ref().is_some_and(|mask| mask.hides(at)) {
                errors.push(StructuralError::MaskedCell { vine: vine.id.clone(), at });
            }

            if !own.insert(at) {
                errors.push(StructuralError::SelfIntersecting { vine: vine.id.clone(), at });
                continue;
            }

            match claimed.entry(at) {
                Entry::Occupied(existing) => errors.push(StructuralError::Overlap {
                    vine: vine.id.clone(),
                    other: (*existing.get()).clone(),
                    at,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(&vine.id);
                }
            }
        }
    }

    errors
}

/// A structurally valid level. Vines are addressed by their stable index in [`Level::vines`].
///
/// Obtain one through [`Level::from_json`], [`TryFrom<LevelDefinition>`] or a [`LevelBuilder`](crate::LevelBuilder).
#[derive(Clone, Debug)]
pub struct Level {
    definition: LevelDefinition,
    indices: HashMap<VineId, usize>,
}

impl TryFrom<LevelDefinition> for Level {
    type Error = Vec<StructuralError>;

    fn try_from(definition: LevelDefinition) -> Result<Self, Self::Error> {
        let errors = validate(&definition);
        if !errors.is_empty() {
            return Err(errors);
        }

        let indices = definition.vines.iter()
            .enumerate()
            .map(|(index, vine)| (vine.id.clone(), index))
            .collect();

        Ok(Self { definition, indices })
    }
}

impl Level {
    /// Parse and validate a level from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let definition: LevelDefinition = serde_json::from_str(json)?;
        let level = Self::try_from(definition)?;
        tracing::debug!(
            level = level.definition.id,
            vines = level.vine_count(),
            width = level.grid().width.get(),
            height = level.grid().height.get(),
            "level loaded"
        );
        Ok(level)
    }

    /// Serialize back to level JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.definition)
    }

    /// The definition this level was validated from.
    pub fn definition(&self) -> &LevelDefinition {
        &self.definition
    }

    /// Board extent.
    pub fn grid(&self) -> GridSize {
        self.definition.grid_size
    }

    /// All vines, in index order.
    pub fn vines(&self) -> &[Vine] {
        &self.definition.vines
    }

    /// The vine at `index`.
    pub fn vine(&self, index: usize) -> Option<&Vine> {
        self.definition.vines.get(index)
    }

    /// Number of vines.
    pub fn vine_count(&self) -> usize {
        self.definition.vines.len()
    }

    /// Stable index of the vine called `id`.
    pub fn index_of(&self, id: &VineId) -> Option<usize> {
        self.indices.get(id).copied()
    }

    /// Map indices back to ids, in order.
    pub fn ids_of(&self, indices: impl IntoIterator<Item = usize>) -> Vec<VineId> {
        indices.into_iter()
            .filter_map(|index| self.vine(index).map(|vine| vine.id.clone()))
            .collect()
    }

    /// Blocked-tap allowance.
    pub fn grace(&self) -> u32 {
        self.definition.grace
    }

    /// Visibility mask, if any.
    pub fn mask(&self) -> Option<&Mask> {
        self.definition.mask.as_ref()
    }

    /// Fraction of visible cells covered by vines at the start.
    pub fn coverage(&self) -> f64 {
        let grid = self.grid();
        let visible = (0..grid.height.get() as i32)
            .flat_map(|y| (0..grid.width.get() as i32).map(move |x| Point::new(x, y)))
            .filter(|point| !self.mask().is_some_and(|mask| mask.hides(*point)))
            .count();
        if visible == 0 {
            return 0.0;
        }

        let covered: usize = self.vines().iter().map(Vine::len).sum();
        covered as f64 / visible as f64
    }
}

fn head_glyph(heading: &Heading) -> char {
    match heading.direction() {
        Some(Direction::Up) => '^',
        Some(Direction::Down) => 'v',
        Some(Direction::Left) => '<',
        Some(Direction::Right) => '>',
        None => '?',
    }
}

fn print(board: Array2<char>) -> String {
    let mut out = String::with_capacity(board.nrows() * (board.ncols() + 1));

    // row 0 is the bottom of the board
    for y in (0..board.nrows()).rev() {
        for cell in board.row(y) {
            out.push(*cell);
        }
        out.push('\n');
    }

    out
}

impl Display for Level {
    /// Draws the board top row first. Heads are arrows, bodies are `a`..`z` by vine index and hidden cells are `#`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let grid = self.grid();
        let mut board = Array2::from_elem(grid.shape(), '.');

        if let Some(mask) = self.mask() {
            for ((y, x), cell) in board.indexed_iter_mut() {
                if mask.hides(Point::new(x as i32, y as i32)) {
                    *cell = '#';
                }
            }
        }

        for (index, vine) in self.vines().iter().enumerate() {
            let body = char::from(b'a' + (index % 26) as u8);
            for (segment, point) in vine.ordered_path.iter().enumerate() {
                if let Some(cell) = grid.index_of(*point).and_then(|ind| board.get_mut(ind)) {
                    *cell = if segment == 0 { head_glyph(&vine.head_direction) } else { body };
                }
            }
        }

        write!(f, "{}", print(board))
    }
}
