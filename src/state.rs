use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;

/// A set of still-present vines, keyed by stable vine index.
///
/// Equality is structural so states can be used directly as visited keys during search.
pub trait PuzzleState: Clone + Debug + Eq + Hash {
    /// Whether this representation can hold `count` vines.
    fn fits(count: usize) -> bool;
    /// The state in which vines `0..count` are all present.
    fn full(count: usize) -> Self;
    /// The state holding exactly `indices`.
    fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self;
    /// Whether vine `index` is present.
    fn contains(&self, index: usize) -> bool;
    /// A copy of this state with vine `index` removed.
    fn without(&self, index: usize) -> Self;
    /// Number of vines present.
    fn len(&self) -> usize;
    /// Present vine indices in ascending order.
    fn indices(&self) -> Vec<usize>;

    /// Whether every vine has been removed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One bit per vine in a machine word.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bitmask(pub u64);

impl Bitmask {
    /// Largest vine count a bitmask can represent.
    pub const CAPACITY: usize = u64::BITS as usize;
}

impl PuzzleState for Bitmask {
    fn fits(count: usize) -> bool {
        count <= Self::CAPACITY
    }

    fn full(count: usize) -> Self {
        match count {
            0 => Self(0),
            c if c >= Self::CAPACITY => Self(u64::MAX),
            c => Self((1u64 << c) - 1),
        }
    }

    fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter()
            .filter(|index| *index < Self::CAPACITY)
            .fold(0, |mask, index| mask | (1 << index)))
    }

    #[inline]
    fn contains(&self, index: usize) -> bool {
        index < Self::CAPACITY && self.0 & (1 << index) != 0
    }

    #[inline]
    fn without(&self, index: usize) -> Self {
        if index < Self::CAPACITY { Self(self.0 & !(1 << index)) } else { *self }
    }

    #[inline]
    fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    fn indices(&self) -> Vec<usize> {
        (0..Self::CAPACITY).filter(|index| self.contains(*index)).collect_vec()
    }
}

/// An explicit sorted list of vine indices, for levels too large for a [`Bitmask`].
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VineSet(Vec<usize>);

impl PuzzleState for VineSet {
    fn fits(_count: usize) -> bool {
        true
    }

    fn full(count: usize) -> Self {
        Self((0..count).collect_vec())
    }

    fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().sorted_unstable().dedup().collect_vec())
    }

    #[inline]
    fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    fn without(&self, index: usize) -> Self {
        let mut next = self.0.clone();
        if let Ok(position) = next.binary_search(&index) {
            next.remove(position);
        }
        Self(next)
    }

    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }

    fn indices(&self) -> Vec<usize> {
        self.0.clone()
    }
}
