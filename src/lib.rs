#![warn(missing_docs)]

//! # `bloomvine`
//!
//! An engine for sliding-vine puzzles. Each piece is a rigid, snake-shaped vine on a grid with a fixed head direction;
//! tapping a vine slides it head first until it leaves the board or runs into another vine.
//!
//! Load a [`Level`] from JSON with [`Level::from_json`], or assemble one with a [`LevelBuilder`].
//! Gameplay layers drive a [`Playfield`], which tracks per-vine status and grace.
//! Authoring tools hand a level to a [`Solver`] to learn whether some order of removals clears the board,
//! and to [`analysis::audit`] to find content that loads but should not ship.
//!
//! # Internals
//! Everything rests on one primitive, [`probe`]: shift the vine one cell at a time, each segment taking the cell its
//! predecessor held, and check after every step whether the vine folded onto itself, ran into another vine or left the
//! grid. Gameplay only asks whether the first step is free ([`is_blocked`]) or how far the whole slide goes
//! ([`distance_to_blocker`]).
//!
//! Solvability leans on monotonic unblocking: a vine's slide only depends on the cells held by *other* present vines,
//! so removing a vine never stops another from clearing. Consequently:
//! 1. Greedily removing any vine which can clear never closes off a solution, so [`is_solvable_greedy`] is exact.
//! 2. A breadth-first search over sets of remaining vines ([`is_solvable_bfs`]) serves as its cross-check.
//! Sets are stored as a [`Bitmask`](state::Bitmask) up to 64 vines and a sorted [`VineSet`](state::VineSet) beyond.
//! 3. When an actual order is wanted, [`solve_sequence`] runs a best-first search which prefers removals freeing the
//! most vines waiting directly behind them, and walks parent pointers back from the empty board.
//!
//! Searches are capped by [`SolverConfig::max_states`]. Running out is reported as
//! [`BudgetExceeded`](solver::BudgetExceeded), which is distinct from a proof of unsolvability.

pub use builder::LevelBuilder;
pub use config::{ProbeLimits, SolverConfig};
pub use direction::{Direction, Heading};
pub use gameplay::{distance_to_blocker, is_blocked, Playfield, VineRuntimeStatus};
pub use level::{Level, LevelDefinition, LevelError, StructuralError};
pub use location::{GridSize, Point};
pub use movement::{probe, ProbeOutcome};
pub use occupancy::Occupancy;
pub use solver::{SearchReport, Solver, SolverFailure, Strategy};
pub use vine::{Vine, VineId};

pub mod analysis;
pub mod builder;
pub mod config;
pub mod direction;
pub mod gameplay;
pub mod level;
pub mod location;
pub mod movement;
pub mod occupancy;
pub mod solver;
pub mod state;
pub mod vine;
#[cfg(feature = "wasm")]
pub mod wasm;

/// Whether repeatedly removing any clearable vine empties the board. Exact, thanks to monotonic unblocking.
pub fn is_solvable_greedy(level: &Level) -> bool {
    Solver::from(level).is_solvable_greedy()
}

/// Whether some removal order empties the board, by exhaustive search with the default budget.
pub fn is_solvable_bfs(level: &Level) -> Result<bool, solver::BudgetExceeded> {
    Solver::from(level).is_solvable_bfs()
}

/// A removal order which empties the board, preferring vines that free the most others.
pub fn solve_sequence(level: &Level) -> Result<Vec<VineId>, SolverFailure> {
    Solver::from(level).solve_sequence()
}
