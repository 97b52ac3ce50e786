use itertools::Itertools;
use serde::Serialize;

use crate::location::{Coord, Point};
use crate::occupancy::Occupancy;
use crate::vine::Vine;

/// Advance a vine one cell: the head moves by `delta` and every other segment takes the place its predecessor held.
///
/// This is a shift of `positions` in place, not a recomputation of the path.
pub fn step(positions: &mut [Point], delta: (Coord, Coord)) {
    let Some(&head) = positions.first() else {
        return;
    };

    positions.rotate_right(1);
    positions[0] = head.offset_by(delta);
}

/// What happens when a vine keeps sliding in its heading direction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The head leaves the grid on step `steps`.
    Clears {
        /// Moves taken, counting the one which exits.
        steps: usize,
    },
    /// Step `steps` would put a segment onto a cell held by vine `blocker`.
    Blocked {
        /// Moves until the collision, counting the colliding one.
        steps: usize,
        /// Index of the vine in the way.
        blocker: usize,
    },
    /// Step `steps` would fold the vine onto itself.
    SelfOverlap {
        /// Moves until the fold, counting the folding one.
        steps: usize,
    },
    /// The step budget ran out without clearing or colliding. Treated as blocked.
    Stalled {
        /// The exhausted budget.
        steps: usize,
    },
    /// The vine has no path or no known heading and can never move.
    Immovable,
}

impl ProbeOutcome {
    /// Whether the vine leaves the board.
    pub fn clears(&self) -> bool {
        matches!(self, Self::Clears { .. })
    }

    /// Signed slide distance: positive is the number of moves until the vine clears,
    /// negative is the number of moves until it reaches whatever stops it, and zero means it cannot move at all.
    pub fn signed_distance(&self) -> i32 {
        let magnitude = |steps: usize| i32::try_from(steps).unwrap_or(i32::MAX);
        match *self {
            Self::Clears { steps } => magnitude(steps),
            Self::Blocked { steps, .. } | Self::SelfOverlap { steps } | Self::Stalled { steps } => -magnitude(steps),
            Self::Immovable => 0,
        }
    }
}

/// Slide `vine` (sitting at index `index` in its level) repeatedly along its heading against the cells in `occupancy`.
///
/// After each step the new positions are checked in order for: self overlap, collision with a cell held by any other
/// vine in `occupancy`, and the head having left the grid. Cells held by `index` itself are never obstacles.
/// If none of these happen within `max_steps` moves the result is [`ProbeOutcome::Stalled`].
pub fn probe(vine: &Vine, index: usize, occupancy: &Occupancy, max_steps: usize) -> ProbeOutcome {
    if vine.is_degenerate() {
        return ProbeOutcome::Immovable;
    }

    let delta = vine.head_direction.delta();
    let grid = occupancy.grid();
    let mut positions = vine.ordered_path.clone();

    for steps in 1..=max_steps {
        step(&mut positions, delta);

        if !positions.iter().all_unique() {
            return ProbeOutcome::SelfOverlap { steps };
        }

        if let Some(blocker) = positions.iter()
            .filter_map(|point| occupancy.occupant(*point))
            .find(|occupant| *occupant != index) {
            return ProbeOutcome::Blocked { steps, blocker };
        }

        if !grid.contains(positions[0]) {
            return ProbeOutcome::Clears { steps };
        }
    }

    tracing::trace!(vine = %vine.id, max_steps, "probe budget exhausted");
    ProbeOutcome::Stalled { steps: max_steps }
}
