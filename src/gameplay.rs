use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ProbeLimits, SolverConfig};
use crate::level::Level;
use crate::movement::{probe, ProbeOutcome};
use crate::occupancy::Occupancy;
use crate::solver::Solver;
use crate::state::{PuzzleState, VineSet};
use crate::vine::{Vine, VineId};

/// Whether the very first move of vine `index` collides with a vine in `active`, or the vine cannot move at all.
pub fn is_blocked<S: PuzzleState>(level: &Level, index: usize, active: &S) -> bool {
    let Some(vine) = level.vine(index) else {
        return true;
    };

    first_step_blocked(vine, index, &Occupancy::of(level, active))
}

fn first_step_blocked(vine: &Vine, index: usize, occupancy: &Occupancy) -> bool {
    matches!(
        probe(vine, index, occupancy, 1),
        ProbeOutcome::Blocked { .. } | ProbeOutcome::SelfOverlap { .. } | ProbeOutcome::Immovable
    )
}

/// Signed slide length for vine `index` against `active`, see [`ProbeOutcome::signed_distance`].
pub fn distance_to_blocker<S: PuzzleState>(level: &Level, index: usize, active: &S) -> i32 {
    let Some(vine) = level.vine(index) else {
        return 0;
    };

    let occupancy = Occupancy::of(level, active);
    let max_steps = ProbeLimits::default().budget(level.grid(), vine.len());
    probe(vine, index, &occupancy, max_steps).signed_distance()
}

/// Animation phase of a vine as seen by the gameplay layer.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    /// At rest.
    #[default]
    Normal,
    /// Sliding toward a blocker, to bounce back.
    AnimatingBlocked,
    /// Sliding off the board.
    AnimatingClear,
    /// Gone for good.
    Cleared,
}

/// Per-vine state owned by the gameplay layer.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct VineRuntimeStatus {
    /// The first move would collide right now.
    pub blocked: bool,
    /// The vine has left the board.
    pub cleared: bool,
    /// The player has bumped this vine at least once.
    pub attempted: bool,
    /// Current animation phase.
    pub animation: AnimationState,
}

impl VineRuntimeStatus {
    fn is_active(&self) -> bool {
        !self.cleared && self.animation != AnimationState::AnimatingClear
    }
}

/// Result of tapping a vine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TapOutcome {
    /// The vine slides `distance` cells and leaves the board.
    Slide {
        /// Cells travelled, positive.
        distance: i32,
    },
    /// The vine slides up to its blocker and back. `distance` is zero or negative.
    Bump {
        /// Signed distance to whatever stopped it.
        distance: i32,
        /// Whether this tap cost a unit of grace.
        grace_spent: bool,
    },
    /// The vine is cleared or still animating.
    Ignored,
}

/// Failures of the [`Playfield`] API.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GameplayError {
    /// No vine by this id on the board.
    #[error("no vine with id {0}")]
    UnknownVine(VineId),
}

/// The controller-side view of a level in play: per-vine status and the remaining grace.
///
/// Each transition recomputes `blocked` for every vine still active, so [`Self::statuses`] is always current.
#[derive(Clone, Debug)]
pub struct Playfield {
    level: Level,
    statuses: Vec<VineRuntimeStatus>,
    grace: u32,
    config: SolverConfig,
}

impl From<Level> for Playfield {
    fn from(level: Level) -> Self {
        let mut playfield = Self {
            statuses: vec![VineRuntimeStatus::default(); level.vine_count()],
            grace: level.grace(),
            config: SolverConfig::default(),
            level,
        };
        playfield.recompute();
        playfield
    }
}

impl Playfield {
    /// Replace the probe and search configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self.recompute();
        self
    }

    /// The level being played.
    pub fn level(&self) -> &Level {
        &self.level
    }

    fn index_of(&self, id: &VineId) -> Result<usize, GameplayError> {
        self.level.index_of(id).ok_or_else(|| GameplayError::UnknownVine(id.clone()))
    }

    /// Vines which still hold cells: not cleared and not on their way out.
    pub fn active(&self) -> VineSet {
        VineSet::from_indices(self.statuses.iter()
            .positions(VineRuntimeStatus::is_active))
    }

    fn recompute(&mut self) {
        let active = self.active();
        let occupancy = Occupancy::of(&self.level, &active);

        for (index, status) in self.statuses.iter_mut().enumerate() {
            status.blocked = status.is_active()
                && self.level.vine(index).map_or(true, |vine| first_step_blocked(vine, index, &occupancy));
        }
    }

    /// The player tapped vine `id`.
    ///
    /// A vine which can leave starts sliding out and stops counting as an obstacle at once.
    /// Any other vine bumps; grace is spent only the first time a given vine bumps.
    pub fn tap(&mut self, id: &VineId) -> Result<TapOutcome, GameplayError> {
        let index = self.index_of(id)?;
        let status = self.statuses[index];
        if status.cleared || status.animation != AnimationState::Normal {
            tracing::trace!(vine = %id, animation = ?status.animation, "tap ignored");
            return Ok(TapOutcome::Ignored);
        }

        let Some(vine) = self.level.vine(index) else {
            return Err(GameplayError::UnknownVine(id.clone()));
        };
        let occupancy = Occupancy::of(&self.level, &self.active());
        let max_steps = self.config.probe.budget(self.level.grid(), vine.len());
        let outcome = probe(vine, index, &occupancy, max_steps);
        let distance = outcome.signed_distance();

        let status = &mut self.statuses[index];
        let tapped = if outcome.clears() {
            status.animation = AnimationState::AnimatingClear;
            TapOutcome::Slide { distance }
        } else {
            let grace_spent = !status.attempted;
            status.attempted = true;
            status.animation = AnimationState::AnimatingBlocked;
            if grace_spent {
                self.grace = self.grace.saturating_sub(1);
            }
            TapOutcome::Bump { distance, grace_spent }
        };

        tracing::trace!(vine = %id, ?tapped, grace = self.grace, "tap");
        self.recompute();
        Ok(tapped)
    }

    /// The animation started by the last tap on `id` has finished playing.
    pub fn finish_animation(&mut self, id: &VineId) -> Result<(), GameplayError> {
        let index = self.index_of(id)?;
        let status = &mut self.statuses[index];

        match status.animation {
            AnimationState::AnimatingClear => {
                status.animation = AnimationState::Cleared;
                status.cleared = true;
            }
            AnimationState::AnimatingBlocked => status.animation = AnimationState::Normal,
            AnimationState::Normal | AnimationState::Cleared => return Ok(()),
        }

        self.recompute();
        Ok(())
    }

    /// Current status of vine `id`.
    pub fn status(&self, id: &VineId) -> Result<VineRuntimeStatus, GameplayError> {
        Ok(self.statuses[self.index_of(id)?])
    }

    /// A fresh snapshot of every vine's status.
    pub fn statuses(&self) -> BTreeMap<VineId, VineRuntimeStatus> {
        self.level.vines().iter()
            .zip(&self.statuses)
            .map(|(vine, status)| (vine.id.clone(), *status))
            .collect()
    }

    /// Every vine has been cleared.
    pub fn is_complete(&self) -> bool {
        self.statuses.iter().all(|status| status.cleared)
    }

    /// Grace left to spend.
    pub fn grace_remaining(&self) -> u32 {
        self.grace
    }

    /// No grace left to spend.
    pub fn is_out_of_grace(&self) -> bool {
        self.grace == 0
    }

    /// A vine worth tapping next: the first move of a clearing order for the vines still on the board.
    ///
    /// [`None`] when the board is clear, when no order exists, or when the search gives up.
    pub fn hint(&self) -> Option<VineId> {
        let solver = Solver::from(&self.level)
            .with_config(self.config)
            .starting_from(self.active().indices());

        match solver.solve_sequence() {
            Ok(order) => order.into_iter().next(),
            Err(failure) => {
                tracing::debug!(%failure, "no hint available");
                None
            }
        }
    }
}
