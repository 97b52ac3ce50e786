use serde::{Deserialize, Serialize};

use crate::location::GridSize;

/// Bounds on how far [`probe`](crate::movement::probe) simulates a slide.
///
/// The budget for a vine is `width + height + length + margin`, raised to `floor` and capped at `ceiling`.
/// The cap never drops below `width + height + length`, so a vine which can clear is always seen to clear.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeLimits {
    /// Extra steps on top of `width + height + length`.
    pub margin: usize,
    /// Smallest budget handed out.
    pub floor: usize,
    /// Largest budget handed out, unless the board itself needs more.
    pub ceiling: usize,
}

impl Default for ProbeLimits {
    fn default() -> Self {
        Self {
            margin: 10,
            floor: 10,
            ceiling: 300,
        }
    }
}

impl ProbeLimits {
    /// Step budget for a vine of `length` segments on `grid`.
    pub fn budget(&self, grid: GridSize, length: usize) -> usize {
        let needed = grid.width.get() + grid.height.get() + length;
        (needed + self.margin).max(self.floor).min(self.ceiling.max(needed))
    }
}

/// Tuning for the solvability searches.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Most states a BFS or best-first search may expand before giving up.
    pub max_states: usize,
    /// Largest vine count [`Strategy::Auto`](crate::solver::Strategy::Auto) hands to the exact search.
    pub exact_vine_limit: usize,
    /// Slide simulation bounds.
    pub probe: ProbeLimits,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_states: 100_000,
            exact_vine_limit: 24,
            probe: ProbeLimits::default(),
        }
    }
}

impl SolverConfig {
    /// Read a config from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
