use std::collections::VecDeque;

use bitvec::vec::BitVec;

use crate::bits::{DynamicRank, RankIndex};
use crate::error::K2TreeError as Error;
use crate::matrix::DenseMatrix;
use crate::tree::datastore::K2Tree;
use crate::tree::leaves::{BitLeaves, LeafStore};
use crate::tree::{log_k, ValuedPosition};

type Result<T> = std::result::Result<T, Error>;

/// Selects the algorithm `from_adjacency_lists` compiles the input with.
///
/// Every mode produces the same encoding; they differ in the transient
/// memory they use while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListsMode {
  /// One advancing cursor per row feeding the same recursion as
  /// `from_matrix`; per-level bit buffers.
  Cursors,
  /// A transient pointered quadtree, flattened breadth-first and dropped.
  ViaTree,
  /// Direct insertion into growable bitmaps backed by a naive dynamic
  /// rank.
  DynamicBitmaps,
}

/* Constructors */
impl<S: LeafStore> K2Tree<S> {
  /// The empty relation: height 1, matrix width k, no stems and no leaves.
  pub fn empty(k: usize, null: S::Elem) -> Result<Self> {
    check_k(k)?;
    let stems = BitVec::new();
    let rank = RankIndex::new(&stems);
    Ok(K2Tree {
      matrix_width: k,
      k,
      height: 1,
      stems,
      leaves: S::with_null(null),
      rank,
    })
  }
  /// Compiles a dense matrix into a tree.
  ///
  /// The matrix need not be square nor a power of k on either side; the
  /// missing cells are treated as null padding.
  /// ```
  /// fn main() -> Result<(), k2_relation::error::K2TreeError> {
  ///   use k2_relation::{matrix::DenseMatrix, ValuedK2Tree};
  ///   let m = DenseMatrix::from_rows(vec![
  ///     vec![0u8, 4, 0],
  ///     vec![0, 0, 0],
  ///     vec![1, 0, 0],
  ///   ])?;
  ///   let tree: ValuedK2Tree<u8> = ValuedK2Tree::from_matrix(&m, 2, 0)?;
  ///   assert_eq!(4, tree.matrix_width);
  ///   assert_eq!(2, tree.count_elements());
  ///   assert_eq!(4, tree.get_element(0, 1)?);
  ///   Ok(())
  /// }
  /// ```
  pub fn from_matrix(mat: &DenseMatrix<S::Elem>, k: usize, null: S::Elem) -> Result<Self> {
    check_k(k)?;
    let extent = mat.height.max(mat.width);
    let height = log_k(extent, k).max(1);
    let matrix_width = k.pow(height as u32);
    let mut cell = |p: usize, q: usize| {
      if p < mat.height && q < mat.width {
        mat.cell(p, q).clone()
      } else {
        null.clone()
      }
    };
    build_with_levels(k, height, matrix_width, null.clone(), &mut cell)
  }
  /// Compiles per-row adjacency lists into a tree.
  ///
  /// Each inner list holds the (column, value) entries of one row and
  /// must be sorted by column with no duplicate columns; the cursor mode
  /// reads it strictly left to right.
  pub fn from_adjacency_lists(
    lists: &[Vec<(usize, S::Elem)>],
    k: usize,
    mode: ListsMode,
    null: S::Elem,
  ) -> Result<Self> {
    check_k(k)?;
    let mut max_col = 0;
    for row in lists {
      for entry in row {
        max_col = max_col.max(entry.0);
      }
    }
    let extent = lists.len().max(max_col + 1);
    let height = log_k(extent, k).max(1);
    let matrix_width = k.pow(height as u32);
    match mode {
      ListsMode::Cursors => {
        let mut cursors = vec![0usize; lists.len()];
        let mut cell = |p: usize, q: usize| {
          if p < lists.len() {
            let row = &lists[p];
            let c = cursors[p];
            if c < row.len() && row[c].0 == q {
              cursors[p] += 1;
              row[c].1.clone()
            } else {
              null.clone()
            }
          } else {
            null.clone()
          }
        };
        build_with_levels(k, height, matrix_width, null.clone(), &mut cell)
      }
      ListsMode::ViaTree => build_via_tree(lists, k, height, matrix_width, null),
      ListsMode::DynamicBitmaps => build_dynamic(lists, k, height, matrix_width, null),
    }
  }
  /// Compiles an unordered list of (row, column, value) triples into a
  /// tree by breadth-first in-place partitioning.
  ///
  /// Duplicate positions are not rejected: within a leaf block the last
  /// triple written wins. Callers needing a particular survivor must
  /// deduplicate first.
  /// ```
  /// fn main() -> Result<(), k2_relation::error::K2TreeError> {
  ///   use k2_relation::{tree::ValuedPosition, ValuedK2Tree};
  ///   let triples = vec![
  ///     ValuedPosition::new(0, 3, 7u8),
  ///     ValuedPosition::new(3, 0, 9),
  ///   ];
  ///   let tree: ValuedK2Tree<u8> = ValuedK2Tree::from_triples(triples, 2, 0)?;
  ///   assert_eq!(4, tree.matrix_width);
  ///   assert_eq!(7, tree.get_element(0, 3)?);
  ///   assert_eq!(9, tree.get_element(3, 0)?);
  ///   Ok(())
  /// }
  /// ```
  pub fn from_triples(
    mut triples: Vec<ValuedPosition<S::Elem>>,
    k: usize,
    null: S::Elem,
  ) -> Result<Self> {
    check_k(k)?;
    let mut max_index = 0;
    for t in &triples {
      max_index = max_index.max(t.row).max(t.col);
    }
    let height = log_k(max_index + 1, k).max(1);
    let matrix_width = k.pow(height as u32);
    let block = k * k;
    let mut stems = BitVec::new();
    let mut leaves = S::with_null(null.clone());
    if !triples.is_empty() {
      let mut intervals = vec![(0usize, 0usize); block];
      let mut queue = VecDeque::new();
      queue.push_back(Subproblem {
        first_row: 0,
        last_row: matrix_width - 1,
        first_col: 0,
        last_col: matrix_width - 1,
        left: 0,
        right: triples.len(),
      });
      while let Some(sp) = queue.pop_front() {
        debug_assert_eq!(sp.last_row - sp.first_row, sp.last_col - sp.first_col);
        let side = sp.last_row - sp.first_row + 1;
        if side > k {
          let width = side / k;
          counting_sort(&mut triples, &mut intervals, &sp, width, k);
          for key in 0..block {
            if intervals[key].0 < intervals[key].1 {
              stems.push(true);
              queue.push_back(Subproblem {
                first_row: sp.first_row + (key / k) * width,
                last_row: sp.first_row + (key / k + 1) * width - 1,
                first_col: sp.first_col + (key % k) * width,
                last_col: sp.first_col + (key % k + 1) * width - 1,
                left: sp.left + intervals[key].0,
                right: sp.left + intervals[key].1,
              });
            } else {
              stems.push(false);
            }
          }
        } else {
          let mut cells = vec![null.clone(); block];
          for i in sp.left..sp.right {
            let t = &triples[i];
            cells[(t.row - sp.first_row) * k + (t.col - sp.first_col)] = t.val.clone();
          }
          for v in cells {
            leaves.push(v);
          }
        }
      }
    }
    let rank = RankIndex::new(&stems);
    Ok(K2Tree {
      matrix_width,
      k,
      height,
      stems,
      leaves,
      rank,
    })
  }
}

impl K2Tree<BitLeaves> {
  /// Builds the boolean tree from a list of (row, column) pairs.
  pub fn from_positions(pairs: Vec<(usize, usize)>, k: usize) -> Result<Self> {
    Self::from_triples(
      pairs
        .into_iter()
        .map(|(i, j)| ValuedPosition::new(i, j, true))
        .collect(),
      k,
      false,
    )
  }
  /// Builds the boolean tree from per-row lists of linked columns, sorted
  /// ascending within each row.
  pub fn from_adjacency(lists: &[Vec<usize>], k: usize, mode: ListsMode) -> Result<Self> {
    let valued: Vec<Vec<(usize, bool)>> = lists
      .iter()
      .map(|row| row.iter().map(|&j| (j, true)).collect())
      .collect();
    Self::from_adjacency_lists(&valued, k, mode, false)
  }
}

fn check_k(k: usize) -> Result<()> {
  if k < 2 {
    return Err(Error::SmallKValue { k });
  }
  Ok(())
}

/* Level-buffer construction (dense matrix and cursor modes) */

/// Runs the post-order recursion over a cell source and assembles the
/// tree from the per-level bit buffers.
///
/// There is one buffer per stem level, `height - 1` in total; the bottom
/// level writes into the leaf store directly.
fn build_with_levels<S: LeafStore>(
  k: usize,
  height: usize,
  matrix_width: usize,
  null: S::Elem,
  cell: &mut dyn FnMut(usize, usize) -> S::Elem,
) -> Result<K2Tree<S>> {
  let mut levels: Vec<BitVec> = vec![BitVec::new(); height - 1];
  let mut leaves = S::with_null(null.clone());
  descend(
    k,
    height,
    &null,
    cell,
    &mut levels,
    &mut leaves,
    matrix_width,
    1,
    0,
    0,
  );
  let mut stems = BitVec::new();
  for level in &levels {
    stems.extend_from_bitslice(level);
  }
  let rank = RankIndex::new(&stems);
  Ok(K2Tree {
    matrix_width,
    k,
    height,
    stems,
    leaves,
    rank,
  })
}

/// Evaluates the k*k subdivision rooted at `(p, q)` with side `n` at level
/// `l`, appending to the level buffers and leaf store. Returns true iff
/// the subdivision holds at least one non-null cell.
#[allow(clippy::too_many_arguments)]
fn descend<S: LeafStore>(
  k: usize,
  height: usize,
  null: &S::Elem,
  cell: &mut dyn FnMut(usize, usize) -> S::Elem,
  levels: &mut [BitVec],
  leaves: &mut S,
  n: usize,
  l: usize,
  p: usize,
  q: usize,
) -> bool {
  if l == height {
    let mut block = Vec::with_capacity(k * k);
    for i in 0..k {
      for j in 0..k {
        block.push(cell(p + i, q + j));
      }
    }
    if block.iter().all(|v| v == null) {
      return false;
    }
    for v in block {
      leaves.push(v);
    }
    true
  } else {
    let child = n / k;
    let mut bits = Vec::with_capacity(k * k);
    for i in 0..k {
      for j in 0..k {
        bits.push(descend(
          k,
          height,
          null,
          cell,
          levels,
          leaves,
          child,
          l + 1,
          p + i * child,
          q + j * child,
        ));
      }
    }
    if bits.iter().all(|&b| !b) {
      return false;
    }
    for b in bits {
      levels[l - 1].push(b);
    }
    true
  }
}

/* Construction via a transient pointered quadtree */

/// A quadtree node held in the arena: either a single cell value or k*k
/// child slots.
enum Node<E> {
  Leaf(E),
  Internal(Vec<Option<usize>>),
}

/// The transient quadtree, index-addressed so nodes can change shape
/// without pointer juggling; the whole arena is dropped after flattening.
struct Arena<E> {
  k: usize,
  null: E,
  nodes: Vec<Node<E>>,
}

impl<E: Clone> Arena<E> {
  fn new(k: usize, null: E) -> Self {
    Arena {
      k,
      null: null.clone(),
      nodes: vec![Node::Leaf(null)],
    }
  }
  fn alloc_leaf(&mut self, value: E) -> usize {
    self.nodes.push(Node::Leaf(value));
    self.nodes.len() - 1
  }
  /// Converts a leaf into an internal node. At the bottom level the k*k
  /// slots are seeded with null leaves, because a present block stores a
  /// value for every one of its cells.
  fn turn_internal(&mut self, idx: usize, seed_leaves: bool) {
    if let Node::Internal(_) = self.nodes[idx] {
      return;
    }
    let block = self.k * self.k;
    let slots = if seed_leaves {
      let mut slots = Vec::with_capacity(block);
      for _ in 0..block {
        let child = self.alloc_leaf(self.null.clone());
        slots.push(Some(child));
      }
      slots
    } else {
      vec![None; block]
    };
    self.nodes[idx] = Node::Internal(slots);
  }
  fn slot(&self, idx: usize, slot: usize) -> Option<usize> {
    match &self.nodes[idx] {
      Node::Internal(slots) => slots[slot],
      Node::Leaf(_) => None,
    }
  }
  fn insert(&mut self, idx: usize, n: usize, p: usize, q: usize, val: E) {
    if n == self.k {
      self.turn_internal(idx, true);
      if let Some(child) = self.slot(idx, p * self.k + q) {
        self.nodes[child] = Node::Leaf(val);
      }
    } else {
      self.turn_internal(idx, false);
      let width = n / self.k;
      let slot = (p / width) * self.k + q / width;
      let child = match self.slot(idx, slot) {
        Some(child) => child,
        None => {
          let child = self.alloc_leaf(self.null.clone());
          if let Node::Internal(slots) = &mut self.nodes[idx] {
            slots[slot] = Some(child);
          }
          child
        }
      };
      self.insert(child, width, p % width, q % width, val);
    }
  }
}

fn build_via_tree<S: LeafStore>(
  lists: &[Vec<(usize, S::Elem)>],
  k: usize,
  height: usize,
  matrix_width: usize,
  null: S::Elem,
) -> Result<K2Tree<S>> {
  let mut arena = Arena::new(k, null.clone());
  for (i, row) in lists.iter().enumerate() {
    for entry in row {
      arena.insert(0, matrix_width, i, entry.0, entry.1.clone());
    }
  }
  let mut stems = BitVec::new();
  let mut leaves = S::with_null(null);
  if let Node::Internal(_) = arena.nodes[0] {
    /* Breadth-first flattening: leaf slots emit values, the rest emit
    presence bits; present internal children queue up behind. */
    let mut queue = VecDeque::new();
    queue.push_back(0usize);
    while let Some(node) = queue.pop_front() {
      let slots = match &arena.nodes[node] {
        Node::Internal(slots) => slots.clone(),
        Node::Leaf(_) => continue,
      };
      for slot in slots {
        match slot {
          Some(child) => match &arena.nodes[child] {
            Node::Leaf(value) => leaves.push(value.clone()),
            Node::Internal(_) => {
              stems.push(true);
              queue.push_back(child);
            }
          },
          None => stems.push(false),
        }
      }
    }
  }
  let rank = RankIndex::new(&stems);
  Ok(K2Tree {
    matrix_width,
    k,
    height,
    stems,
    leaves,
    rank,
  })
}

/* Construction via dynamic bitmaps */

fn build_dynamic<S: LeafStore>(
  lists: &[Vec<(usize, S::Elem)>],
  k: usize,
  height: usize,
  matrix_width: usize,
  null: S::Elem,
) -> Result<K2Tree<S>> {
  let mut stems = BitVec::new();
  let mut leaves = S::with_null(null.clone());
  if height == 1 {
    for _ in 0..k * k {
      leaves.push(null.clone());
    }
    for (i, row) in lists.iter().enumerate() {
      for entry in row {
        leaves.set(i * k + entry.0, entry.1.clone());
      }
    }
    if leaves.count_present() == 0 {
      leaves.clear();
    }
  } else {
    let mut rank = DynamicRank::new(&stems);
    for (i, row) in lists.iter().enumerate() {
      for entry in row {
        if stems.is_empty() {
          for _ in 0..k * k {
            stems.push(false);
          }
          rank = DynamicRank::new(&stems);
        }
        let n = matrix_width / k;
        dynamic_insert(
          &mut stems,
          &mut rank,
          &mut leaves,
          k,
          height,
          n,
          i % n,
          entry.0 % n,
          entry.1.clone(),
          (i / n) * k + entry.0 / n,
          1,
        );
      }
    }
  }
  let rank = RankIndex::new(&stems);
  Ok(K2Tree {
    matrix_width,
    k,
    height,
    stems,
    leaves,
    rank,
  })
}

/// One insertion step of the dynamic-bitmap builder: descend from the bit
/// at `z`, splicing a fresh all-zero child block (or all-null leaf block)
/// in at `rank1(z + 1) * k * k` whenever the path crosses a bit that was
/// still 0.
#[allow(clippy::too_many_arguments)]
fn dynamic_insert<S: LeafStore>(
  stems: &mut BitVec,
  rank: &mut DynamicRank,
  leaves: &mut S,
  k: usize,
  height: usize,
  n: usize,
  p: usize,
  q: usize,
  val: S::Elem,
  z: usize,
  l: usize,
) {
  let block = k * k;
  let width = n / k;
  if !stems[z] {
    stems.set(z, true);
    rank.increase_from(z + 1);
    let y = rank.rank1(z + 1) * block + (p / width) * k + q / width;
    if l + 1 == height {
      leaves.insert_null_block(rank.rank1(z + 1) * block - stems.len(), block);
      leaves.set(y - stems.len(), val);
    } else {
      let at = rank.rank1(z + 1) * block;
      for _ in 0..block {
        stems.insert(at, false);
      }
      rank.insert_zeros(at, block);
      dynamic_insert(
        stems,
        rank,
        leaves,
        k,
        height,
        width,
        p % width,
        q % width,
        val,
        y,
        l + 1,
      );
    }
  } else {
    let y = rank.rank1(z + 1) * block + (p / width) * k + q / width;
    if l + 1 == height {
      leaves.set(y - stems.len(), val);
    } else {
      dynamic_insert(
        stems,
        rank,
        leaves,
        k,
        height,
        width,
        p % width,
        q % width,
        val,
        y,
        l + 1,
      );
    }
  }
}

/* In-place construction from triples */

/// One pending quadrant of the breadth-first triple partitioning: its
/// coordinate window and the slice of the triple vector it owns.
struct Subproblem {
  first_row: usize,
  last_row: usize,
  first_col: usize,
  last_col: usize,
  left: usize,
  right: usize,
}

fn child_key<E>(t: &ValuedPosition<E>, sp: &Subproblem, width: usize, k: usize) -> usize {
  ((t.row - sp.first_row) / width) * k + (t.col - sp.first_col) / width
}

/// Stable counting sort of the subproblem's triple slice by child key,
/// filling `intervals` with the start/end offsets of each of the k*k
/// buckets relative to `sp.left`.
fn counting_sort<E: Clone>(
  triples: &mut [ValuedPosition<E>],
  intervals: &mut [(usize, usize)],
  sp: &Subproblem,
  width: usize,
  k: usize,
) {
  let sup = k * k;
  let mut counts = vec![0usize; sup];
  for i in sp.left..sp.right {
    counts[child_key(&triples[i], sp, width, k)] += 1;
  }
  let mut total = 0;
  for key in 0..sup {
    let count = counts[key];
    counts[key] = total;
    total += count;
    intervals[key] = (counts[key], total);
  }
  let mut scratch = triples[sp.left..sp.right].to_vec();
  for i in sp.left..sp.right {
    let key = child_key(&triples[i], sp, width, k);
    scratch[counts[key]] = triples[i].clone();
    counts[key] += 1;
  }
  triples[sp.left..sp.right].clone_from_slice(&scratch);
}

/* Builder Tests */
#[cfg(test)]
mod api {
  use super::*;
  use crate::tree::datastore::ValuedK2Tree;
  use bitvec::prelude::{bitvec, Lsb0};

  type TestResult = Result<()>;

  fn diag_matrix() -> DenseMatrix<u32> {
    DenseMatrix::from_rows(vec![
      vec![1, 0, 0, 0],
      vec![0, 2, 0, 0],
      vec![0, 0, 3, 0],
      vec![0, 0, 0, 4],
    ])
    .unwrap()
  }
  fn diag_lists() -> Vec<Vec<(usize, u32)>> {
    vec![vec![(0, 1)], vec![(1, 2)], vec![(2, 3)], vec![(3, 4)]]
  }
  fn diag_triples() -> Vec<ValuedPosition<u32>> {
    vec![
      ValuedPosition::new(3, 3, 4),
      ValuedPosition::new(0, 0, 1),
      ValuedPosition::new(2, 2, 3),
      ValuedPosition::new(1, 1, 2),
    ]
  }

  #[test]
  fn matrix_builder_encoding() -> TestResult {
    let tree: ValuedK2Tree<u32> = ValuedK2Tree::from_matrix(&diag_matrix(), 2, 0)?;
    assert_eq!(4, tree.matrix_width);
    assert_eq!(2, tree.height);
    assert_eq!(bitvec![1, 0, 0, 1], tree.stems);
    assert_eq!(vec![1, 0, 0, 2, 3, 0, 0, 4], tree.leaves.values);
    Ok(())
  }
  #[test]
  fn all_builders_agree_on_diagonal() -> TestResult {
    let from_mat: ValuedK2Tree<u32> = ValuedK2Tree::from_matrix(&diag_matrix(), 2, 0)?;
    let lists = diag_lists();
    for mode in [
      ListsMode::Cursors,
      ListsMode::ViaTree,
      ListsMode::DynamicBitmaps,
    ] {
      let tree = ValuedK2Tree::from_adjacency_lists(&lists, 2, mode, 0)?;
      assert_eq!(from_mat, tree, "mode {:?} diverged", mode);
    }
    let from_triples = ValuedK2Tree::from_triples(diag_triples(), 2, 0)?;
    assert_eq!(from_mat, from_triples);
    Ok(())
  }
  #[test]
  fn triples_builder_scenario() -> TestResult {
    let triples = vec![
      ValuedPosition::new(0, 3, 11u32),
      ValuedPosition::new(3, 0, 22),
    ];
    let tree: ValuedK2Tree<u32> = ValuedK2Tree::from_triples(triples, 2, 0)?;
    assert_eq!(4, tree.matrix_width);
    assert_eq!(2, tree.count_elements());
    assert_eq!(
      vec![
        ValuedPosition::new(0, 3, 11u32),
        ValuedPosition::new(3, 0, 22),
      ],
      tree.all_valued_positions()
    );
    Ok(())
  }
  #[test]
  fn triples_builder_duplicates_last_wins() -> TestResult {
    let triples = vec![
      ValuedPosition::new(1, 1, 5u8),
      ValuedPosition::new(1, 1, 9),
    ];
    let tree: ValuedK2Tree<u8> = ValuedK2Tree::from_triples(triples, 2, 0)?;
    assert_eq!(9, tree.get_element(1, 1)?);
    assert_eq!(1, tree.count_elements());
    Ok(())
  }
  #[test]
  fn empty_inputs() -> TestResult {
    let empty: ValuedK2Tree<u8> = ValuedK2Tree::empty(2, 0)?;
    let from_mat: ValuedK2Tree<u8> =
      ValuedK2Tree::from_matrix(&DenseMatrix::from_rows(vec![])?, 2, 0)?;
    assert_eq!(empty, from_mat);
    for mode in [
      ListsMode::Cursors,
      ListsMode::ViaTree,
      ListsMode::DynamicBitmaps,
    ] {
      let tree = ValuedK2Tree::from_adjacency_lists(&[], 2, mode, 0u8)?;
      assert_eq!(empty, tree, "mode {:?} diverged", mode);
    }
    let from_triples: ValuedK2Tree<u8> = ValuedK2Tree::from_triples(Vec::new(), 2, 0)?;
    assert_eq!(empty, from_triples);
    assert!(empty.stems.is_empty());
    assert_eq!(1, empty.height);
    assert_eq!(2, empty.matrix_width);
    Ok(())
  }
  #[test]
  fn all_null_rows_shrink_to_empty() -> TestResult {
    /* One row with no entries keeps height at 1; the dynamic builder
    must drop its provisional all-null leaf block again. */
    let lists: Vec<Vec<(usize, u8)>> = vec![Vec::new()];
    for mode in [
      ListsMode::Cursors,
      ListsMode::ViaTree,
      ListsMode::DynamicBitmaps,
    ] {
      let tree = ValuedK2Tree::from_adjacency_lists(&lists, 2, mode, 0u8)?;
      assert!(tree.leaves.values.is_empty(), "mode {:?} kept leaves", mode);
      assert!(tree.stems.is_empty());
      assert!(tree.is_empty());
    }
    Ok(())
  }
  #[test]
  fn single_block_lists() -> TestResult {
    let lists: Vec<Vec<(usize, u8)>> = vec![vec![(1, 7)]];
    for mode in [
      ListsMode::Cursors,
      ListsMode::ViaTree,
      ListsMode::DynamicBitmaps,
    ] {
      let tree = ValuedK2Tree::from_adjacency_lists(&lists, 2, mode, 0u8)?;
      assert_eq!(2, tree.matrix_width);
      assert_eq!(1, tree.height);
      assert!(tree.stems.is_empty());
      assert_eq!(vec![0, 7, 0, 0], tree.leaves.values);
    }
    Ok(())
  }
  #[test]
  fn small_k_rejected() {
    assert!(matches!(
      ValuedK2Tree::<u8>::empty(1, 0),
      Err(Error::SmallKValue { k: 1 })
    ));
    assert!(matches!(
      ValuedK2Tree::<u8>::from_matrix(&DenseMatrix::with_dimensions(2, 2, 0), 0, 0),
      Err(Error::SmallKValue { k: 0 })
    ));
    assert!(matches!(
      ValuedK2Tree::<u8>::from_triples(Vec::new(), 1, 0),
      Err(Error::SmallKValue { k: 1 })
    ));
  }
  #[test]
  fn k4_builders_agree() -> TestResult {
    let mut m = DenseMatrix::with_dimensions(16, 16, 0u16);
    m.set(0, 0, 1)?;
    m.set(10, 5, 2)?;
    m.set(15, 15, 3)?;
    let mut lists: Vec<Vec<(usize, u16)>> = vec![Vec::new(); 16];
    lists[0].push((0, 1));
    lists[10].push((5, 2));
    lists[15].push((15, 3));
    let triples = vec![
      ValuedPosition::new(15, 15, 3u16),
      ValuedPosition::new(0, 0, 1),
      ValuedPosition::new(10, 5, 2),
    ];
    let from_mat: ValuedK2Tree<u16> = ValuedK2Tree::from_matrix(&m, 4, 0)?;
    assert_eq!(16, from_mat.matrix_width);
    for mode in [
      ListsMode::Cursors,
      ListsMode::ViaTree,
      ListsMode::DynamicBitmaps,
    ] {
      assert_eq!(
        from_mat,
        ValuedK2Tree::from_adjacency_lists(&lists, 4, mode, 0)?,
        "mode {:?} diverged",
        mode
      );
    }
    assert_eq!(from_mat, ValuedK2Tree::from_triples(triples, 4, 0)?);
    Ok(())
  }
  #[test]
  fn boolean_conveniences() -> TestResult {
    let pairs = vec![(0usize, 3usize), (1, 2), (2, 1), (3, 0)];
    let from_pairs = K2Tree::from_positions(pairs, 2)?;
    let lists = vec![vec![3], vec![2], vec![1], vec![0]];
    for mode in [
      ListsMode::Cursors,
      ListsMode::ViaTree,
      ListsMode::DynamicBitmaps,
    ] {
      assert_eq!(from_pairs, K2Tree::from_adjacency(&lists, 2, mode)?);
    }
    assert_eq!(4, from_pairs.count_links());
    assert_eq!(vec![3], from_pairs.successors(0)?);
    Ok(())
  }
  #[test]
  fn non_square_matrix_pads() -> TestResult {
    let m = DenseMatrix::from_rows(vec![vec![0u8, 0, 0, 0, 5]])?;
    let tree: ValuedK2Tree<u8> = ValuedK2Tree::from_matrix(&m, 2, 0)?;
    assert_eq!(8, tree.matrix_width);
    assert_eq!(3, tree.height);
    assert_eq!(1, tree.count_elements());
    assert_eq!(5, tree.get_element(0, 4)?);
    assert_eq!(vec![4], tree.successor_positions(0)?);
    Ok(())
  }
}
