use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction::{Incoming, Outgoing};
use serde::Serialize;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::direction::{Direction, Heading};
use crate::level::Level;
use crate::location::Point;
use crate::occupancy::Occupancy;
use crate::state::{PuzzleState, VineSet};
use crate::vine::VineId;

/// Who is in whose way, one step ahead.
///
/// An edge `a -> b` means the cell directly in front of `b`'s head is held by `a`, so `b` cannot take even one step
/// while `a` is present. Nodes are vine indices.
#[derive(Clone, Debug)]
pub struct BlockingGraph {
    graph: DiGraphMap<usize, ()>,
}

impl BlockingGraph {
    /// The blocking relation among the vines present in `state`.
    pub fn of<S: PuzzleState>(level: &Level, state: &S) -> Self {
        let present = state.indices();
        let occupancy = Occupancy::from_indices(level, present.iter().copied());
        let mut graph = DiGraphMap::with_capacity(present.len(), present.len());

        for &blocked in &present {
            graph.add_node(blocked);

            let Some(vine) = level.vine(blocked).filter(|vine| !vine.is_degenerate()) else {
                continue;
            };
            let Some(head) = vine.head() else {
                continue;
            };

            let target = head.offset_by(vine.head_direction.delta());
            if let Some(blocker) = occupancy.occupant(target).filter(|blocker| *blocker != blocked) {
                graph.add_edge(blocker, blocked, ());
            }
        }

        Self { graph }
    }

    /// The blocking relation of a level's starting position.
    pub fn full(level: &Level) -> Self {
        Self::of(level, &VineSet::full(level.vine_count()))
    }

    /// Whether `blocker` sits directly in front of `blocked`.
    pub fn blocks(&self, blocker: usize, blocked: usize) -> bool {
        self.graph.contains_edge(blocker, blocked)
    }

    /// Vines in front of `index`. At most one, since a head has a single target cell.
    pub fn blockers_of(&self, index: usize) -> Vec<usize> {
        self.graph.neighbors_directed(index, Incoming).sorted().collect_vec()
    }

    /// Vines that `index` stands in front of.
    pub fn blocked_by(&self, index: usize) -> Vec<usize> {
        self.graph.neighbors_directed(index, Outgoing).sorted().collect_vec()
    }

    /// How many vines still present in `state` are waiting directly on `index`.
    pub fn unblock_count<S: PuzzleState>(&self, index: usize, state: &S) -> usize {
        self.graph.neighbors_directed(index, Outgoing)
            .filter(|blocked| state.contains(*blocked))
            .count()
    }

    /// Groups of vines which block each other in a ring. None of them can ever take a first step.
    pub fn circular_chains(&self) -> Vec<Vec<usize>> {
        tarjan_scc(&self.graph).into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| component.into_iter().sorted().collect_vec())
            .sorted()
            .collect_vec()
    }

    /// Pairs of vines facing into each other.
    pub fn mutual_pairs(&self) -> Vec<UnorderedPair<usize>> {
        self.graph.all_edges()
            .map(|(a, b, _)| (a, b))
            .filter(|(a, b)| a < b && self.graph.contains_edge(*b, *a))
            .sorted()
            .map(UnorderedPair::from)
            .collect_vec()
    }

    /// Length of the longest chain `v0 -> v1 -> ... -> vn` of blockers. Rings are cut where they close.
    pub fn max_depth(&self) -> usize {
        let mut cache = HashMap::with_capacity(self.graph.node_count());
        self.graph.nodes()
            .map(|node| self.depth_from(node, &mut HashSet::new(), &mut cache))
            .max()
            .unwrap_or(0)
    }

    fn depth_from(&self, node: usize, on_path: &mut HashSet<usize>, cache: &mut HashMap<usize, usize>) -> usize {
        if let Some(depth) = cache.get(&node) {
            return *depth;
        }
        if !on_path.insert(node) {
            return 0;
        }

        let depth = self.graph.neighbors_directed(node, Outgoing)
            .collect_vec()
            .into_iter()
            .map(|blocked| 1 + self.depth_from(blocked, on_path, cache))
            .max()
            .unwrap_or(0);

        on_path.remove(&node);
        cache.insert(node, depth);
        depth
    }
}

/// Blocking structure of a level, by vine id.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BlockingAnalysis {
    /// Longest blocker chain.
    pub max_depth: usize,
    /// Rings of vines blocking each other.
    pub circular_chains: Vec<Vec<VineId>>,
    /// Vines facing into each other.
    pub mutual_pairs: Vec<(VineId, VineId)>,
}

impl BlockingAnalysis {
    /// Whether any ring exists. Such a level is unsolvable.
    pub fn has_circular(&self) -> bool {
        !self.circular_chains.is_empty()
    }
}

/// Summarize the blocking structure of a level's starting position.
pub fn analyze(level: &Level) -> BlockingAnalysis {
    let graph = BlockingGraph::full(level);

    BlockingAnalysis {
        max_depth: graph.max_depth(),
        circular_chains: graph.circular_chains().into_iter()
            .map(|chain| level.ids_of(chain))
            .collect_vec(),
        mutual_pairs: graph.mutual_pairs().into_iter()
            .filter_map(|UnorderedPair(a, b)| Some((level.vine(a)?.id.clone(), level.vine(b)?.id.clone())))
            .collect_vec(),
    }
}

/// Content which loads but which an authoring tool should refuse to ship.
#[derive(Clone, Debug, Eq, PartialEq, Error, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ContentIssue {
    /// The vine has no segments.
    #[error("vine {vine}: path is empty")]
    EmptyPath {
        /// Offending vine.
        vine: VineId,
    },
    /// The heading is not one of the four directions.
    #[error("vine {vine}: unknown head_direction {heading:?}")]
    UnknownHeading {
        /// Offending vine.
        vine: VineId,
        /// The heading as written.
        heading: String,
    },
    /// Fewer than two segments.
    #[error("vine {vine}: has only {length} segments (minimum 2)")]
    TooShort {
        /// Offending vine.
        vine: VineId,
        /// Actual segment count.
        length: usize,
    },
    /// The head does not point away from the second segment.
    #[error("vine {vine}: head at {head} does not face away from neck at {neck}")]
    HeadNeckMismatch {
        /// Offending vine.
        vine: VineId,
        /// First segment.
        head: Point,
        /// Second segment.
        neck: Point,
    },
    /// A later segment lies on the straight line from the head to the edge.
    #[error("vine {vine}: segment at {at} lies on its own exit path")]
    SelfBlocking {
        /// Offending vine.
        vine: VineId,
        /// First segment found on the exit path.
        at: Point,
    },
    /// Vines that block each other in a ring.
    #[error("circular blocking between {}", .chain.iter().join(", "))]
    CircularBlocking {
        /// Members of the ring.
        chain: Vec<VineId>,
    },
}

/// Lint a level for content problems. Unlike structural validation this never fails and reports everything it finds.
pub fn audit(level: &Level) -> Vec<ContentIssue> {
    let grid = level.grid();
    let mut issues = Vec::new();

    for vine in level.vines() {
        if let Heading::Unrecognized(raw) = &vine.head_direction {
            issues.push(ContentIssue::UnknownHeading { vine: vine.id.clone(), heading: raw.clone() });
        }

        let (head, neck) = match vine.ordered_path.as_slice() {
            [] => {
                issues.push(ContentIssue::EmptyPath { vine: vine.id.clone() });
                continue;
            }
            [_] => {
                issues.push(ContentIssue::TooShort { vine: vine.id.clone(), length: 1 });
                continue;
            }
            [head, neck, ..] => (*head, *neck),
        };

        let Some(direction) = vine.head_direction.direction() else {
            continue;
        };

        if Direction::between(neck, head) != Some(direction) {
            issues.push(ContentIssue::HeadNeckMismatch { vine: vine.id.clone(), head, neck });
        }

        let exit_path = itertools::iterate(head.offset_by(direction.delta()), |point| point.offset_by(direction.delta()))
            .take_while(|point| grid.contains(*point))
            .collect::<HashSet<_>>();
        if let Some(at) = vine.ordered_path.iter().skip(1).find(|point| exit_path.contains(point)) {
            issues.push(ContentIssue::SelfBlocking { vine: vine.id.clone(), at: *at });
        }
    }

    issues.extend(BlockingGraph::full(level).circular_chains().into_iter()
        .map(|chain| ContentIssue::CircularBlocking { chain: level.ids_of(chain) }));

    issues
}
