use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet, VecDeque};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::BlockingGraph;
use crate::config::SolverConfig;
use crate::level::Level;
use crate::movement::probe;
use crate::occupancy::Occupancy;
use crate::state::{Bitmask, PuzzleState, VineSet};
use crate::vine::VineId;

/// Raised when a search expands its whole state budget without reaching a verdict.
///
/// This is not evidence of unsolvability: the level may still be solvable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("search gave up after exploring {explored} states (budget {budget})")]
pub struct BudgetExceeded {
    /// States expanded before giving up.
    pub explored: usize,
    /// The configured ceiling.
    pub budget: usize,
}

/// Reasons [`Solver::solve_sequence`] may fail to produce an order.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SolverFailure {
    /// No order of removals clears the board.
    #[error("no order of removals clears the board")]
    Unsolvable,
    /// The search ran out of budget first.
    #[error(transparent)]
    BudgetExceeded(#[from] BudgetExceeded),
}

/// Which search [`Solver::check`] runs.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Exact search for small levels, greedy peel above [`SolverConfig::exact_vine_limit`].
    #[default]
    Auto,
    /// Remove any clearable vine until none is left or none can move.
    Greedy,
    /// Breadth-first search over every reachable set of remaining vines.
    Exact,
    /// Best-first search preferring removals which free the most other vines.
    BestFirst,
}

/// Outcome of a search.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// A clearing order exists.
    Solvable,
    /// No clearing order exists.
    Unsolvable,
    /// The budget ran out first; nothing is known.
    GaveUp,
}

/// Instrumentation from [`Solver::check`], suitable for stats export.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SearchReport {
    /// The search that actually ran. Never [`Strategy::Auto`].
    pub strategy: Strategy,
    /// What it found.
    pub verdict: Verdict,
    /// States expanded, or vines probed for the greedy peel.
    pub states_explored: usize,
    /// A clearing order, when the search produces one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<VineId>>,
}

/// Result of the greedy peel.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GreedyPeel {
    /// Vine indices in the order they were removed. Always a valid partial clearing order.
    pub order: Vec<usize>,
    /// Vines left when nothing else could move. Empty iff the board was cleared.
    pub stuck: Vec<usize>,
    /// Number of slide simulations run.
    pub probes: usize,
}

impl GreedyPeel {
    /// Whether every vine was removed.
    pub fn is_complete(&self) -> bool {
        self.stuck.is_empty()
    }
}

/// Solvability searches over one level, starting from all of its vines or from a chosen subset.
///
/// Every search relies on monotonic unblocking: removing a vine never stops another from clearing.
/// That is what makes [`Self::greedy_peel`] exact rather than a heuristic, and what lets
/// [`Self::is_solvable_bfs`] serve as its cross-check.
pub struct Solver<'a> {
    level: &'a Level,
    config: SolverConfig,
    start: Vec<usize>,
}

impl<'a> From<&'a Level> for Solver<'a> {
    fn from(level: &'a Level) -> Self {
        Self {
            level,
            config: SolverConfig::default(),
            start: (0..level.vine_count()).collect_vec(),
        }
    }
}

impl<'a> Solver<'a> {
    /// Replace the search configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Search from the vines at `active` only, e.g. the vines still on the board mid-game. Unknown indices are dropped.
    pub fn starting_from(mut self, active: impl IntoIterator<Item = usize>) -> Self {
        let count = self.level.vine_count();
        self.start = active.into_iter()
            .filter(|index| *index < count)
            .sorted_unstable()
            .dedup()
            .collect_vec();
        self
    }

    #[inline]
    fn clears(&self, index: usize, occupancy: &Occupancy) -> bool {
        let Some(vine) = self.level.vine(index) else {
            return false;
        };
        let max_steps = self.config.probe.budget(self.level.grid(), vine.len());
        probe(vine, index, occupancy, max_steps).clears()
    }

    /// Vines in `state` which can slide off the board right now.
    fn clearable_in<S: PuzzleState>(&self, state: &S) -> Vec<usize> {
        let occupancy = Occupancy::of(self.level, state);
        state.indices().into_iter()
            .filter(|index| self.clears(*index, &occupancy))
            .collect_vec()
    }

    /// Repeatedly remove every vine that can clear, until the board is empty or a full pass removes nothing.
    pub fn greedy_peel(&self) -> GreedyPeel {
        let mut occupancy = Occupancy::from_indices(self.level, self.start.iter().copied());
        let mut remaining = self.start.clone();
        let mut order = Vec::with_capacity(remaining.len());
        let mut probes = 0;

        loop {
            let before = remaining.len();
            remaining.retain(|&index| {
                let Some(vine) = self.level.vine(index) else {
                    return false;
                };
                probes += 1;
                if !self.clears(index, &occupancy) {
                    return true;
                }

                occupancy.remove(index, vine);
                order.push(index);
                false
            });

            if remaining.is_empty() || remaining.len() == before {
                break;
            }
        }

        if !remaining.is_empty() {
            tracing::debug!(stuck = remaining.len(), removed = order.len(), "greedy peel deadlocked");
        }

        GreedyPeel { order, stuck: remaining, probes }
    }

    /// Fast exact check: whether the greedy peel clears the board.
    pub fn is_solvable_greedy(&self) -> bool {
        self.greedy_peel().is_complete()
    }

    /// Authoritative check by breadth-first search over sets of remaining vines.
    ///
    /// `Ok(false)` is a proof of unsolvability; [`Err`] means the state budget ran out first.
    pub fn is_solvable_bfs(&self) -> Result<bool, BudgetExceeded> {
        self.exact().map(|(solvable, _)| solvable)
    }

    /// Find a clearing order, trying first the removals which free the most other vines.
    pub fn solve_sequence(&self) -> Result<Vec<VineId>, SolverFailure> {
        match self.best_first()?.0 {
            Some(order) => Ok(self.level.ids_of(order)),
            None => Err(SolverFailure::Unsolvable),
        }
    }

    /// Run `strategy` and report what it found and how much work it took.
    pub fn check(&self, strategy: Strategy) -> SearchReport {
        let strategy = match strategy {
            Strategy::Auto if self.start.len() <= self.config.exact_vine_limit => Strategy::Exact,
            Strategy::Auto => Strategy::Greedy,
            other => other,
        };

        let _span = tracing::debug_span!("check", ?strategy, vines = self.start.len()).entered();
        let report = match strategy {
            Strategy::Greedy => {
                let peel = self.greedy_peel();
                let complete = peel.is_complete();
                SearchReport {
                    strategy,
                    verdict: if complete { Verdict::Solvable } else { Verdict::Unsolvable },
                    states_explored: peel.probes,
                    sequence: complete.then(|| self.level.ids_of(peel.order)),
                }
            }
            Strategy::Auto | Strategy::Exact => match self.exact() {
                Ok((solvable, explored)) => SearchReport {
                    strategy,
                    verdict: if solvable { Verdict::Solvable } else { Verdict::Unsolvable },
                    states_explored: explored,
                    sequence: None,
                },
                Err(exceeded) => gave_up(strategy, exceeded),
            },
            Strategy::BestFirst => match self.best_first() {
                Ok((order, explored)) => SearchReport {
                    strategy,
                    verdict: if order.is_some() { Verdict::Solvable } else { Verdict::Unsolvable },
                    states_explored: explored,
                    sequence: order.map(|order| self.level.ids_of(order)),
                },
                Err(exceeded) => gave_up(strategy, exceeded),
            },
        };

        tracing::debug!(verdict = ?report.verdict, explored = report.states_explored, "search finished");
        report
    }

    fn exact(&self) -> Result<(bool, usize), BudgetExceeded> {
        if Bitmask::fits(self.level.vine_count()) {
            self.bfs::<Bitmask>()
        } else {
            self.bfs::<VineSet>()
        }
    }

    fn best_first(&self) -> Result<(Option<Vec<usize>>, usize), BudgetExceeded> {
        if Bitmask::fits(self.level.vine_count()) {
            self.best_first_in::<Bitmask>()
        } else {
            self.best_first_in::<VineSet>()
        }
    }

    fn over_budget(&self, explored: usize) -> Option<BudgetExceeded> {
        (explored >= self.config.max_states).then(|| {
            tracing::warn!(explored, budget = self.config.max_states, "search budget exhausted");
            BudgetExceeded { explored, budget: self.config.max_states }
        })
    }

    fn bfs<S: PuzzleState>(&self) -> Result<(bool, usize), BudgetExceeded> {
        let start = S::from_indices(self.start.iter().copied());
        let mut visited = HashSet::from([start.clone()]);
        let mut queue = VecDeque::from([start]);
        let mut explored = 0;

        while let Some(state) = queue.pop_front() {
            if let Some(exceeded) = self.over_budget(explored) {
                return Err(exceeded);
            }
            explored += 1;

            if state.is_empty() {
                return Ok((true, explored));
            }

            for index in self.clearable_in(&state) {
                let next = state.without(index);
                if visited.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }

        Ok((false, explored))
    }

    fn best_first_in<S: PuzzleState>(&self) -> Result<(Option<Vec<usize>>, usize), BudgetExceeded> {
        let start = S::from_indices(self.start.iter().copied());
        let blocking = BlockingGraph::of(self.level, &start);

        // slot -> (state, (parent slot, vine removed to get here))
        let mut arena: Vec<(S, Option<(usize, usize)>)> = vec![(start.clone(), None)];
        let mut visited = HashSet::from([start.clone()]);
        // fewest vines left first, then most vines freed, then oldest
        let mut frontier = BinaryHeap::from([(Reverse(start.len()), 0usize, Reverse(0usize))]);
        let mut explored = 0;

        while let Some((_, _, Reverse(slot))) = frontier.pop() {
            if let Some(exceeded) = self.over_budget(explored) {
                return Err(exceeded);
            }
            explored += 1;

            let state = arena[slot].0.clone();
            if state.is_empty() {
                return Ok((Some(unwind(&arena, slot)), explored));
            }

            for index in self.clearable_in(&state) {
                let next = state.without(index);
                if !visited.insert(next.clone()) {
                    continue;
                }

                let freed = blocking.unblock_count(index, &state);
                let remaining = next.len();
                arena.push((next, Some((slot, index))));
                frontier.push((Reverse(remaining), freed, Reverse(arena.len() - 1)));
            }
        }

        Ok((None, explored))
    }
}

fn gave_up(strategy: Strategy, exceeded: BudgetExceeded) -> SearchReport {
    SearchReport {
        strategy,
        verdict: Verdict::GaveUp,
        states_explored: exceeded.explored,
        sequence: None,
    }
}

fn unwind<S>(arena: &[(S, Option<(usize, usize)>)], mut slot: usize) -> Vec<usize> {
    let mut order = Vec::new();
    while let Some((parent, index)) = arena[slot].1 {
        order.push(index);
        slot = parent;
    }
    order.reverse();
    order
}

/// The first way a proposed clearing order goes wrong.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ReplayError {
    /// The order names a vine the level does not have.
    #[error("vine {0} does not exist")]
    UnknownVine(VineId),
    /// The vine exists but was not on the board when the replay started.
    #[error("vine {0} is not in play")]
    NotInPlay(VineId),
    /// The order removes a vine twice.
    #[error("vine {0} was already removed")]
    Repeated(VineId),
    /// The vine is still obstructed at its turn.
    #[error("vine {vine} cannot clear at move {position}")]
    NotClearable {
        /// The obstructed vine.
        vine: VineId,
        /// Zero-based position in the order.
        position: usize,
    },
    /// Vines remain once the order is exhausted.
    #[error("{} vines remain after the last move", .remaining.len())]
    Incomplete {
        /// Vines never removed.
        remaining: Vec<VineId>,
    },
}

/// Re-simulate `order` from the start of `level`, checking each vine clears at its turn and the board ends empty.
pub fn replay(level: &Level, order: &[VineId]) -> Result<(), ReplayError> {
    Solver::from(level).replay(order)
}

impl Solver<'_> {
    /// Re-simulate `order` from this solver's starting vines, checking each vine clears at its turn and none remain.
    pub fn replay(&self, order: &[VineId]) -> Result<(), ReplayError> {
        let mut present = VineSet::from_indices(self.start.iter().copied());
        let mut occupancy = Occupancy::of(self.level, &present);

        for (position, id) in order.iter().enumerate() {
            let index = self.level.index_of(id).ok_or_else(|| ReplayError::UnknownVine(id.clone()))?;
            if self.start.binary_search(&index).is_err() {
                return Err(ReplayError::NotInPlay(id.clone()));
            }
            if !present.contains(index) {
                return Err(ReplayError::Repeated(id.clone()));
            }

            let Some(vine) = self.level.vine(index) else {
                return Err(ReplayError::UnknownVine(id.clone()));
            };
            if !self.clears(index, &occupancy) {
                return Err(ReplayError::NotClearable { vine: id.clone(), position });
            }

            occupancy.remove(index, vine);
            present = present.without(index);
        }

        if !present.is_empty() {
            return Err(ReplayError::Incomplete { remaining: self.level.ids_of(present.indices()) });
        }

        Ok(())
    }
}
