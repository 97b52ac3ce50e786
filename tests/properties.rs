//! Property-based tests for the movement simulator and the solvability searches.
//!
//! 1. Removing vines never stops a clearable vine from clearing.
//! 2. The greedy peel and the exact search agree on every small level.
//! 3. Probing is a pure function of its inputs.
//! 4. Any sequence the best-first search produces replays cleanly.
//! 5. The greedy peel order is always a valid prefix.

use std::collections::HashSet;
use std::num::NonZero;

use bloomvine::builder::LevelBuilder;
use bloomvine::solver::{replay, ReplayError};
use bloomvine::state::{Bitmask, PuzzleState};
use bloomvine::{probe, Direction, Level, Occupancy, ProbeLimits, Solver, SolverFailure};
use proptest::prelude::*;
use strum::VariantArray;

const SIDE: i32 = 5;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Head cell, heading and the turns taken by the body behind the neck.
type VineSeed = (i32, i32, usize, Vec<usize>);

fn vine_seeds() -> impl Strategy<Value = Vec<VineSeed>> {
    prop::collection::vec(
        (0..SIDE, 0..SIDE, 0..4usize, prop::collection::vec(0..4usize, 0..4)),
        0..8,
    )
}

/// Lay vines down one at a time, truncating each body where it would leave the grid or hit something.
fn assemble(seeds: &[VineSeed]) -> Level {
    let side = NonZero::new(SIDE as usize).unwrap();
    let mut builder = LevelBuilder::with_dims((side, side));
    let mut taken = HashSet::new();
    let free = |taken: &HashSet<(i32, i32)>, (x, y): (i32, i32)| {
        (0..SIDE).contains(&x) && (0..SIDE).contains(&y) && !taken.contains(&(x, y))
    };

    for (n, (x, y, heading, turns)) in seeds.iter().enumerate() {
        if !free(&taken, (*x, *y)) {
            continue;
        }

        let direction = Direction::VARIANTS[*heading];
        let mut path = vec![(*x, *y)];
        let (dx, dy) = direction.invert().delta();
        let mut next = (x + dx, y + dy);
        let mut turns = turns.iter();

        loop {
            if !free(&taken, next) || path.contains(&next) {
                break;
            }
            path.push(next);

            let Some(turn) = turns.next() else {
                break;
            };
            let (dx, dy) = Direction::VARIANTS[*turn].delta();
            next = (next.0 + dx, next.1 + dy);
        }

        taken.extend(path.iter().copied());
        builder.add_vine(&format!("v{n}"), direction, &path);
    }

    builder.build().unwrap()
}

fn clears_among(level: &Level, index: usize, present: &Bitmask) -> bool {
    let occupancy = Occupancy::from_indices(level, present.indices());
    let vine = level.vine(index).unwrap();
    probe(vine, index, &occupancy, ProbeLimits::default().budget(level.grid(), vine.len())).clears()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Monotonic unblocking
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn removal_never_blocks(seeds in vine_seeds(), keep in any::<u64>()) {
        let level = assemble(&seeds);
        let everyone = Bitmask::full(level.vine_count());

        for index in everyone.indices() {
            if !clears_among(&level, index, &everyone) {
                continue;
            }

            let subset = Bitmask((keep & everyone.0) | (1 << index));
            prop_assert!(
                clears_among(&level, index, &subset),
                "vine {} stopped clearing after removals:\n{}",
                index, level
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Greedy and exact search agree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn greedy_matches_bfs(seeds in vine_seeds()) {
        let level = assemble(&seeds);
        let solver = Solver::from(&level);

        prop_assert_eq!(
            Ok(solver.is_solvable_greedy()),
            solver.is_solvable_bfs(),
            "greedy and bfs disagree on\n{}",
            level
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Probe is pure
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn probe_is_idempotent(seeds in vine_seeds(), steps in 0..40usize) {
        let level = assemble(&seeds);
        let occupancy = Occupancy::from_indices(&level, 0..level.vine_count());

        for (index, vine) in level.vines().iter().enumerate() {
            let first = probe(vine, index, &occupancy, steps);
            prop_assert_eq!(first, probe(vine, index, &occupancy, steps));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Sequences replay
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sequences_replay(seeds in vine_seeds()) {
        let level = assemble(&seeds);

        match Solver::from(&level).solve_sequence() {
            Ok(order) => {
                prop_assert_eq!(order.len(), level.vine_count());
                prop_assert_eq!(replay(&level, &order), Ok(()));
            }
            Err(SolverFailure::Unsolvable) => prop_assert!(!Solver::from(&level).is_solvable_greedy()),
            Err(failure) => prop_assert!(false, "unexpected failure {}", failure),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Greedy peel is a valid prefix
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn greedy_order_is_valid_prefix(seeds in vine_seeds()) {
        let level = assemble(&seeds);
        let peel = Solver::from(&level).greedy_peel();
        let order = level.ids_of(peel.order.iter().copied());

        match replay(&level, &order) {
            Ok(()) => prop_assert!(peel.is_complete()),
            Err(ReplayError::Incomplete { remaining }) => {
                prop_assert_eq!(remaining, level.ids_of(peel.stuck.iter().copied()));
            }
            Err(error) => prop_assert!(false, "greedy order invalid: {}", error),
        }
    }
}
