/*!
Rank support over the packed bit-vectors that encode a `K2Tree`.

`RankIndex` is the static structure built once per tree: a table of
cumulative population counts, one entry per 64-bit block, so that
`rank1(i)` costs one table lookup plus a popcount over at most 63 bits.
`DynamicRank` is the naive growable companion used only while the
dynamic-bitmap builder is running; its updates are linear, which is
acceptable because it never survives construction.
*/

use bitvec::slice::BitSlice;

const BLOCK: usize = 64;

/// A static rank-1 index over a bit-vector.
///
/// The index does not hold the bits themselves; callers pass the same
/// bit-slice the index was built over to every query.
/// ```
/// use bitvec::prelude::{bitvec, Lsb0};
/// use k2_relation::bits::RankIndex;
/// let bits = bitvec![0,1,1,0, 1,0,0,1];
/// let rank = RankIndex::new(&bits);
/// assert_eq!(0, rank.rank1(&bits, 0));
/// assert_eq!(2, rank.rank1(&bits, 3));
/// assert_eq!(4, rank.rank1(&bits, 8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankIndex {
  /// Ones strictly before each 64-bit block, plus a final total.
  blocks: Vec<usize>,
  /// Length of the indexed bit-vector.
  len: usize,
}

impl RankIndex {
  /// Builds the index over `bits` in one pass.
  pub fn new(bits: &BitSlice) -> Self {
    let mut blocks = Vec::with_capacity(bits.len() / BLOCK + 2);
    let mut total = 0;
    blocks.push(0);
    for chunk in bits.chunks(BLOCK) {
      total += chunk.count_ones();
      blocks.push(total);
    }
    RankIndex {
      blocks,
      len: bits.len(),
    }
  }
  /// Number of 1-bits among positions `[0, i)`; `i` may equal the length.
  pub fn rank1(&self, bits: &BitSlice, i: usize) -> usize {
    debug_assert!(i <= self.len);
    debug_assert_eq!(bits.len(), self.len);
    let block = i / BLOCK;
    self.blocks[block] + bits[block * BLOCK..i].count_ones()
  }
  /// Total number of 1-bits in the indexed vector.
  pub fn num_ones(&self) -> usize {
    *self.blocks.last().unwrap_or(&0)
  }
}

/// A growable rank-1 structure: an explicit vector of running counts,
/// recomputed on mutation.
///
/// `ranks[i]` always equals the number of 1-bits among positions `[0, i)`
/// of the tracked bit-vector, so the vector has one more entry than the
/// bits. Only the dynamic-bitmap construction path uses this type.
#[derive(Debug, Clone, Default)]
pub struct DynamicRank {
  ranks: Vec<usize>,
}

impl DynamicRank {
  /// Builds the running counts for `bits`.
  pub fn new(bits: &BitSlice) -> Self {
    let mut ranks = Vec::with_capacity(bits.len() + 1);
    let mut total = 0;
    ranks.push(0);
    for bit in bits {
      total += *bit as usize;
      ranks.push(total);
    }
    DynamicRank { ranks }
  }
  /// Number of 1-bits among positions `[0, i)`.
  pub fn rank1(&self, i: usize) -> usize {
    self.ranks[i]
  }
  /// Records that the tracked bit at `pos - 1` flipped from 0 to 1:
  /// every count from `pos` onwards grows by one.
  pub fn increase_from(&mut self, pos: usize) {
    for rank in &mut self.ranks[pos..] {
      *rank += 1;
    }
  }
  /// Records that `count` 0-bits were inserted into the tracked vector
  /// at bit-position `pos`.
  pub fn insert_zeros(&mut self, pos: usize, count: usize) {
    let at = self.ranks[pos];
    self
      .ranks
      .splice(pos + 1..pos + 1, std::iter::repeat(at).take(count));
  }
}

#[cfg(test)]
mod util {
  use super::*;
  use bitvec::prelude::{bitvec, BitVec, Lsb0};

  fn naive_rank(bits: &BitVec, i: usize) -> usize {
    bits[..i].iter().filter(|b| **b).count()
  }

  #[test]
  fn rank_index_small() {
    let bits = bitvec![0,1,1,1, 1,1,0,1, 1,0,0,0, 1,0,0,0];
    let rank = RankIndex::new(&bits);
    for i in 0..=bits.len() {
      assert_eq!(naive_rank(&bits, i), rank.rank1(&bits, i));
    }
    assert_eq!(8, rank.num_ones());
  }
  #[test]
  fn rank_index_empty() {
    let bits = BitVec::new();
    let rank = RankIndex::new(&bits);
    assert_eq!(0, rank.rank1(&bits, 0));
    assert_eq!(0, rank.num_ones());
  }
  #[test]
  fn rank_index_multiblock() {
    let mut bits = BitVec::new();
    for i in 0..300 {
      bits.push(i % 3 == 0);
    }
    let rank = RankIndex::new(&bits);
    for i in (0..=300).step_by(7) {
      assert_eq!(naive_rank(&bits, i), rank.rank1(&bits, i));
    }
    assert_eq!(naive_rank(&bits, 300), rank.rank1(&bits, 300));
  }
  #[test]
  fn dynamic_rank_tracks_set() {
    let mut bits = bitvec![0; 8];
    let mut rank = DynamicRank::new(&bits);
    bits.set(2, true);
    rank.increase_from(3);
    bits.set(5, true);
    rank.increase_from(6);
    for i in 0..=8 {
      assert_eq!(naive_rank(&bits, i), rank.rank1(i));
    }
  }
  #[test]
  fn dynamic_rank_tracks_insert() {
    let mut bits = bitvec![1, 0, 1, 1];
    let mut rank = DynamicRank::new(&bits);
    for _ in 0..4 {
      bits.insert(2, false);
    }
    rank.insert_zeros(2, 4);
    for i in 0..=bits.len() {
      assert_eq!(naive_rank(&bits, i), rank.rank1(i));
    }
  }
}
