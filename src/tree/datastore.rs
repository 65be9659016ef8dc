use std::collections::VecDeque;

use bitvec::vec::BitVec;

use crate::bits::RankIndex;
use crate::error::K2TreeError as Error;
use crate::matrix::DenseMatrix;
use crate::tree::leaves::{BitLeaves, LeafStore};
use crate::tree::ValuedPosition;

type Result<T> = std::result::Result<T, Error>;

/// A compressed representation of a sparse, valued two-dimensional relation.
///
/// The tree stores an n'-by-n' matrix whose cells carry values from an
/// element domain with a distinguished null marking absence, where
/// n' = k^h is the smallest power of the arity k covering the input. Every
/// level splits the current submatrix into k-by-k quadrants; a quadrant
/// containing no non-null cell collapses into a single 0 bit, so sparse
/// relations compress very well. The internal quadrant bits live in
/// `stems` in level order, the bottom-level cell values in `leaves`, and a
/// rank-1 index over the stems links each set bit to the block holding its
/// k*k children.
///
/// The bare type is the boolean specialization, a plain bit-matrix; use
/// [`ValuedK2Tree`] for an arbitrary element domain.
///
/// ```
/// fn main() -> Result<(), k2_relation::error::K2TreeError> {
///   use k2_relation::{K2Tree, matrix::BitMatrix};
///   let mut m = BitMatrix::with_dimensions(8, 8, false);
///   m.set(0, 4, true)?;
///   m.set(6, 5, true)?;
///   let tree: K2Tree = K2Tree::from_matrix(&m, 2, false)?;
///   assert_eq!(true, tree.is_not_null(0, 4)?);
///   assert_eq!(false, tree.is_not_null(4, 0)?);
///   assert_eq!(vec![4], tree.successor_positions(0)?);
///   Ok(())
/// }
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(
  bound(
    serialize = "S: LeafStore + serde::Serialize + Clone",
    deserialize = "S: LeafStore + serde::de::DeserializeOwned"
  ),
  from = "TreeBody<S>",
  into = "TreeBody<S>"
)]
pub struct K2Tree<S: LeafStore = BitLeaves> {
  /// The width of the matrix this tree represents; always k to the power
  /// of `height`, so the logical extents of the input are padded with
  /// nulls up to the next power of k.
  pub matrix_width: usize,
  /// The arity: the number of splits per dimension at every level.
  pub k: usize,
  /// The number of recursive subdivisions from the whole matrix down to
  /// single cells.
  pub height: usize,
  /// The internal quadrant bits, one per node of levels 1..height-1,
  /// concatenated level by level in breadth-first order.
  pub stems: BitVec,
  /// The bottom-level cell values, k*k per set bit of the last stem level.
  pub leaves: S,
  /// Rank-1 index over `stems`; `rank1(z + 1) * k * k` is the position of
  /// the first child of the node whose bit sits at `z`.
  pub rank: RankIndex,
}

/// A k2-tree over an arbitrary element domain with a caller-chosen null.
pub type ValuedK2Tree<E> = K2Tree<crate::tree::leaves::ValueLeaves<E>>;

/// The persisted shape of a tree: everything except the rank index, which
/// is rebuilt against the stems on deserialization.
#[derive(serde::Serialize, serde::Deserialize)]
struct TreeBody<S> {
  k: usize,
  height: usize,
  stems: BitVec,
  leaves: S,
}

impl<S: LeafStore> From<TreeBody<S>> for K2Tree<S> {
  fn from(body: TreeBody<S>) -> Self {
    let rank = RankIndex::new(&body.stems);
    K2Tree {
      matrix_width: body.k.pow(body.height as u32),
      k: body.k,
      height: body.height,
      stems: body.stems,
      leaves: body.leaves,
      rank,
    }
  }
}
impl<S: LeafStore> From<K2Tree<S>> for TreeBody<S> {
  fn from(tree: K2Tree<S>) -> Self {
    TreeBody {
      k: tree.k,
      height: tree.height,
      stems: tree.stems,
      leaves: tree.leaves,
    }
  }
}

/* Public */
impl<S: LeafStore> K2Tree<S> {
  /// Number of rows of the represented matrix, padding included.
  pub fn num_rows(&self) -> usize {
    self.matrix_width
  }
  /// Number of columns of the represented matrix, padding included.
  pub fn num_cols(&self) -> usize {
    self.matrix_width
  }
  /// The value that marks an absent cell.
  pub fn null_element(&self) -> S::Elem {
    self.leaves.null()
  }
  /// Returns true if the tree contains no non-null cell.
  pub fn is_empty(&self) -> bool {
    self.leaves.count_present() == 0
  }
  /// Returns true iff the cell at row `i`, column `j` carries a non-null
  /// value.
  /// ```
  /// fn main() -> Result<(), k2_relation::error::K2TreeError> {
  ///   use k2_relation::{matrix::DenseMatrix, ValuedK2Tree};
  ///   let m = DenseMatrix::from_rows(vec![
  ///     vec![0, 9],
  ///     vec![0, 0],
  ///   ])?;
  ///   let tree: ValuedK2Tree<i32> = ValuedK2Tree::from_matrix(&m, 2, 0)?;
  ///   assert_eq!(true, tree.is_not_null(0, 1)?);
  ///   assert_eq!(false, tree.is_not_null(1, 1)?);
  ///   Ok(())
  /// }
  /// ```
  pub fn is_not_null(&self, i: usize, j: usize) -> Result<bool> {
    self.check_bounds(i, j)?;
    if self.leaves.is_empty() {
      return Ok(false);
    }
    let n = self.matrix_width / self.k;
    Ok(self.check(n, i % n, j % n, (i / n) * self.k + j / n))
  }
  /// Returns the value of the cell at row `i`, column `j`, which is the
  /// null element for absent cells and padding alike.
  /// ```
  /// fn main() -> Result<(), k2_relation::error::K2TreeError> {
  ///   use k2_relation::{matrix::DenseMatrix, ValuedK2Tree};
  ///   let m = DenseMatrix::from_rows(vec![
  ///     vec![0, 9],
  ///     vec![3, 0],
  ///   ])?;
  ///   let tree: ValuedK2Tree<i32> = ValuedK2Tree::from_matrix(&m, 2, 0)?;
  ///   assert_eq!(9, tree.get_element(0, 1)?);
  ///   assert_eq!(3, tree.get_element(1, 0)?);
  ///   assert_eq!(0, tree.get_element(1, 1)?);
  ///   Ok(())
  /// }
  /// ```
  pub fn get_element(&self, i: usize, j: usize) -> Result<S::Elem> {
    self.check_bounds(i, j)?;
    if self.leaves.is_empty() {
      return Ok(self.leaves.null());
    }
    let n = self.matrix_width / self.k;
    Ok(self.get(n, i % n, j % n, (i / n) * self.k + j / n))
  }
  /// Columns of the non-null cells in row `i`, in increasing order.
  pub fn successor_positions(&self, i: usize) -> Result<Vec<usize>> {
    self.check_row(i)?;
    let mut succs = Vec::new();
    self.for_each_successor(i, |col, _| succs.push(col));
    Ok(succs)
  }
  /// Values of the non-null cells in row `i`, in increasing column order.
  pub fn successor_elements(&self, i: usize) -> Result<Vec<S::Elem>> {
    self.check_row(i)?;
    let mut succs = Vec::new();
    self.for_each_successor(i, |_, y| succs.push(self.leaves.get(y)));
    Ok(succs)
  }
  /// The non-null cells of row `i` as (row, column, value) triples, in
  /// increasing column order.
  pub fn successor_valued_positions(&self, i: usize) -> Result<Vec<ValuedPosition<S::Elem>>> {
    self.check_row(i)?;
    let mut succs = Vec::new();
    self.for_each_successor(i, |col, y| {
      succs.push(ValuedPosition::new(i, col, self.leaves.get(y)))
    });
    Ok(succs)
  }
  /// Rows of the non-null cells in column `j`, in increasing order.
  pub fn predecessor_positions(&self, j: usize) -> Result<Vec<usize>> {
    self.check_col(j)?;
    let mut preds = Vec::new();
    self.for_each_predecessor(j, &mut |row, _| preds.push(row));
    Ok(preds)
  }
  /// Values of the non-null cells in column `j`, in increasing row order.
  pub fn predecessor_elements(&self, j: usize) -> Result<Vec<S::Elem>> {
    self.check_col(j)?;
    let mut preds = Vec::new();
    self.for_each_predecessor(j, &mut |_, y| preds.push(self.leaves.get(y)));
    Ok(preds)
  }
  /// The non-null cells of column `j` as (row, column, value) triples, in
  /// increasing row order.
  pub fn predecessor_valued_positions(&self, j: usize) -> Result<Vec<ValuedPosition<S::Elem>>> {
    self.check_col(j)?;
    let mut preds = Vec::new();
    self.for_each_predecessor(j, &mut |row, y| {
      preds.push(ValuedPosition::new(row, j, self.leaves.get(y)))
    });
    Ok(preds)
  }
  /// Positions of the non-null cells inside the rectangle
  /// `[i1, i2] x [j1, j2]`, visiting only quadrants that overlap it.
  ///
  /// Results follow the tree's quadrant order, which groups cells by the
  /// k-by-k block they share at every level.
  pub fn positions_in_range(
    &self,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
  ) -> Result<Vec<(usize, usize)>> {
    self.check_query_range(i1, i2, j1, j2)?;
    let mut pairs = Vec::new();
    self.for_each_in_range(i1, i2, j1, j2, &mut |dp, dq, _| pairs.push((dp, dq)));
    Ok(pairs)
  }
  /// Values of the non-null cells inside the rectangle `[i1, i2] x [j1, j2]`.
  pub fn elements_in_range(
    &self,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
  ) -> Result<Vec<S::Elem>> {
    self.check_query_range(i1, i2, j1, j2)?;
    let mut elems = Vec::new();
    self.for_each_in_range(i1, i2, j1, j2, &mut |_, _, y| elems.push(self.leaves.get(y)));
    Ok(elems)
  }
  /// The non-null cells inside the rectangle `[i1, i2] x [j1, j2]` as
  /// (row, column, value) triples.
  pub fn valued_positions_in_range(
    &self,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
  ) -> Result<Vec<ValuedPosition<S::Elem>>> {
    self.check_query_range(i1, i2, j1, j2)?;
    let mut pairs = Vec::new();
    self.for_each_in_range(i1, i2, j1, j2, &mut |dp, dq, y| {
      pairs.push(ValuedPosition::new(dp, dq, self.leaves.get(y)))
    });
    Ok(pairs)
  }
  /// Returns true if the rectangle `[i1, i2] x [j1, j2]` contains at least
  /// one non-null cell, short-circuiting on the first hit.
  ///
  /// A rectangle covering an entire submatrix whose quadrant bit is set is
  /// answered true without descending further. Because
  /// [`set_null`](K2Tree::set_null) never prunes the stems, this fast path
  /// can report true for a rectangle whose only remaining leaves have been
  /// nulled out.
  pub fn contains_element(&self, i1: usize, i2: usize, j1: usize, j2: usize) -> Result<bool> {
    self.check_query_range(i1, i2, j1, j2)?;
    if self.leaves.is_empty() {
      return Ok(false);
    }
    if i1 == 0 && j1 == 0 && i2 == self.matrix_width - 1 && j2 == self.matrix_width - 1 {
      return Ok(true);
    }
    let n = self.matrix_width / self.k;
    for i in i1 / n..=i2 / n {
      let p1 = if i == i1 / n { i1 % n } else { 0 };
      let p2 = if i == i2 / n { i2 % n } else { n - 1 };
      for j in j1 / n..=j2 / n {
        let q1 = if j == j1 / n { j1 % n } else { 0 };
        let q2 = if j == j2 / n { j2 % n } else { n - 1 };
        if self.elem_in_range(n, p1, p2, q1, q2, self.k * i + j) {
          return Ok(true);
        }
      }
    }
    Ok(false)
  }
  /// Number of non-null cells in the relation: a pure scan of the leaves.
  pub fn count_elements(&self) -> usize {
    self.leaves.count_present()
  }
  /// The smallest column holding a non-null cell in row `i`, or the matrix
  /// width when the row is empty.
  ///
  /// The descent is depth-first and left-to-right over an explicit stack,
  /// so it stops at the first leaf it reaches.
  pub fn first_successor(&self, i: usize) -> Result<usize> {
    self.check_row(i)?;
    if self.leaves.is_empty() {
      return Ok(self.matrix_width);
    }
    let k = self.k;
    if self.stems.is_empty() {
      let offset = i * self.matrix_width;
      for j in 0..self.matrix_width {
        if self.leaves.is_present(offset + j) {
          return Ok(j);
        }
      }
      return Ok(self.matrix_width);
    }
    let len_t = self.stems.len();
    let n = self.matrix_width / k;
    let mut stack = vec![Frame {
      n_row: n,
      n_col: n,
      p: i % n,
      dq: 0,
      z: k * (i / n),
      j: 0,
    }];
    while let Some(cur) = stack.last_mut() {
      if cur.j == k {
        stack.pop();
        continue;
      }
      if cur.z >= len_t {
        if self.leaves.is_present(cur.z - len_t) {
          return Ok(cur.dq);
        }
      } else if self.stems[cur.z] {
        let n_row = cur.n_row / k;
        let n_col = cur.n_col / k;
        let child = Frame {
          n_row,
          n_col,
          p: cur.p % n_row,
          dq: cur.dq,
          z: self.rank(cur.z + 1) * self.block_len() + k * (cur.p / n_row),
          j: 0,
        };
        cur.dq += cur.n_col;
        cur.z += 1;
        cur.j += 1;
        stack.push(child);
        continue;
      }
      cur.dq += cur.n_col;
      cur.z += 1;
      cur.j += 1;
    }
    Ok(self.matrix_width)
  }
  /// Overwrites the cell at row `i`, column `j` with the null element; a
  /// no-op when the cell is already absent.
  ///
  /// Only the leaf entry changes: the stem bits above it are left alone
  /// even when the whole leaf block becomes null, so
  /// [`contains_element`](K2Tree::contains_element) may keep answering
  /// true for rectangles covering the stale block.
  pub fn set_null(&mut self, i: usize, j: usize) -> Result<()> {
    self.check_bounds(i, j)?;
    if self.leaves.is_empty() {
      return Ok(());
    }
    let n = self.matrix_width / self.k;
    self.clear_cell(n, i % n, j % n, (i / n) * self.k + j / n);
    Ok(())
  }
  /// Positions of every non-null cell, in quadrant order.
  pub fn all_positions(&self) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let max = self.matrix_width - 1;
    self.for_each_in_range(0, max, 0, max, &mut |dp, dq, _| pairs.push((dp, dq)));
    pairs
  }
  /// Values of every non-null cell, in quadrant order.
  pub fn all_elements(&self) -> Vec<S::Elem> {
    let mut elems = Vec::new();
    let max = self.matrix_width - 1;
    self.for_each_in_range(0, max, 0, max, &mut |_, _, y| elems.push(self.leaves.get(y)));
    elems
  }
  /// Every non-null cell as a (row, column, value) triple, in quadrant
  /// order.
  pub fn all_valued_positions(&self) -> Vec<ValuedPosition<S::Elem>> {
    let mut pairs = Vec::new();
    let max = self.matrix_width - 1;
    self.for_each_in_range(0, max, 0, max, &mut |dp, dq, y| {
      pairs.push(ValuedPosition::new(dp, dq, self.leaves.get(y)))
    });
    pairs
  }
  /// Reconstructs the dense matrix the tree represents, padding included.
  pub fn to_matrix(&self) -> Result<DenseMatrix<S::Elem>> {
    let mut m =
      DenseMatrix::with_dimensions(self.matrix_width, self.matrix_width, self.leaves.null());
    for cell in self.all_valued_positions() {
      m.set(cell.row, cell.col, cell.val)?;
    }
    Ok(m)
  }
}

/* Relation nomenclature */
impl<S: LeafStore> K2Tree<S> {
  /// Alias of [`is_not_null`](K2Tree::is_not_null).
  pub fn are_related(&self, i: usize, j: usize) -> Result<bool> {
    self.is_not_null(i, j)
  }
  /// Alias of [`successor_positions`](K2Tree::successor_positions).
  pub fn successors(&self, i: usize) -> Result<Vec<usize>> {
    self.successor_positions(i)
  }
  /// Alias of [`predecessor_positions`](K2Tree::predecessor_positions).
  pub fn predecessors(&self, j: usize) -> Result<Vec<usize>> {
    self.predecessor_positions(j)
  }
  /// Alias of [`positions_in_range`](K2Tree::positions_in_range).
  pub fn range(&self, i1: usize, i2: usize, j1: usize, j2: usize) -> Result<Vec<(usize, usize)>> {
    self.positions_in_range(i1, i2, j1, j2)
  }
  /// Alias of [`contains_element`](K2Tree::contains_element).
  pub fn contains_link(&self, i1: usize, i2: usize, j1: usize, j2: usize) -> Result<bool> {
    self.contains_element(i1, i2, j1, j2)
  }
  /// Alias of [`count_elements`](K2Tree::count_elements).
  pub fn count_links(&self) -> usize {
    self.count_elements()
  }
}

/* Traits */
impl<S: LeafStore> std::fmt::Display for K2Tree<S>
where
  S::Elem: std::fmt::Display,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.leaves.is_empty() {
      return write!(f, "[]");
    }
    let block = self.block_len();
    let mut out = String::new();
    for (pos, bit) in self.stems.iter().enumerate() {
      if pos > 0 && pos % block == 0 {
        out.push(',');
      }
      out.push(if *bit { '1' } else { '0' });
    }
    if !self.stems.is_empty() {
      out.push_str("::");
    }
    for i in 0..self.leaves.len() {
      if i > 0 {
        out.push(if i % block == 0 { ';' } else { ',' });
      }
      out.push_str(&self.leaves.get(i).to_string());
    }
    write!(f, "[{}]", out)
  }
}
impl<S: LeafStore + PartialEq> PartialEq for K2Tree<S> {
  fn eq(&self, other: &Self) -> bool {
    self.k == other.k
      && self.matrix_width == other.matrix_width
      && self.stems == other.stems
      && self.leaves == other.leaves
  }
}
impl<S: LeafStore + Eq> Eq for K2Tree<S> {}
impl<S: LeafStore + std::hash::Hash> std::hash::Hash for K2Tree<S> {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.k.hash(state);
    self.matrix_width.hash(state);
    self.stems.hash(state);
    self.leaves.hash(state);
  }
}
impl<S: LeafStore> Default for K2Tree<S>
where
  S::Elem: Default,
{
  fn default() -> Self {
    K2Tree {
      matrix_width: 2,
      k: 2,
      height: 1,
      stems: BitVec::new(),
      rank: RankIndex::new(&BitVec::new()),
      leaves: S::with_null(S::Elem::default()),
    }
  }
}

/* Private */
/// One pending entry of the level-by-level row traversal: the column base
/// accumulated so far and the child bit to inspect.
struct SubrowInfo {
  dq: usize,
  z: usize,
}

/// One frame of the depth-first first-successor descent. `j` is the next
/// sibling of the frame to explore; a frame is popped once `j` reaches k.
struct Frame {
  n_row: usize,
  n_col: usize,
  p: usize,
  dq: usize,
  z: usize,
  j: usize,
}

impl<S: LeafStore> K2Tree<S> {
  pub(crate) fn block_len(&self) -> usize {
    self.k * self.k
  }
  fn rank(&self, i: usize) -> usize {
    self.rank.rank1(&self.stems, i)
  }
  fn check_bounds(&self, i: usize, j: usize) -> Result<()> {
    if i >= self.matrix_width || j >= self.matrix_width {
      return Err(Error::OutOfBounds {
        pos: [i, j],
        max: [self.matrix_width - 1; 2],
      });
    }
    Ok(())
  }
  fn check_row(&self, i: usize) -> Result<()> {
    self.check_bounds(i, 0)
  }
  fn check_col(&self, j: usize) -> Result<()> {
    self.check_bounds(0, j)
  }
  fn check_query_range(&self, i1: usize, i2: usize, j1: usize, j2: usize) -> Result<()> {
    if i1 > i2 {
      return Err(Error::DescendingRange { low: i1, high: i2 });
    }
    if j1 > j2 {
      return Err(Error::DescendingRange { low: j1, high: j2 });
    }
    self.check_bounds(i2, j2)
  }
  fn check(&self, n: usize, p: usize, q: usize, z: usize) -> bool {
    if z >= self.stems.len() {
      self.leaves.is_present(z - self.stems.len())
    } else if self.stems[z] {
      let child = n / self.k;
      self.check(
        child,
        p % child,
        q % child,
        self.rank(z + 1) * self.block_len() + (p / child) * self.k + q / child,
      )
    } else {
      false
    }
  }
  fn get(&self, n: usize, p: usize, q: usize, z: usize) -> S::Elem {
    if z >= self.stems.len() {
      self.leaves.get(z - self.stems.len())
    } else if self.stems[z] {
      let child = n / self.k;
      self.get(
        child,
        p % child,
        q % child,
        self.rank(z + 1) * self.block_len() + (p / child) * self.k + q / child,
      )
    } else {
      self.leaves.null()
    }
  }
  /// Level-by-level traversal of row `i` over two FIFO queues, calling
  /// `visit(column, leaf-index)` for every non-null cell in increasing
  /// column order.
  fn for_each_successor(&self, i: usize, mut visit: impl FnMut(usize, usize)) {
    if self.leaves.is_empty() {
      return;
    }
    let k = self.k;
    if self.stems.is_empty() {
      let offset = i * self.matrix_width;
      for j in 0..self.matrix_width {
        if self.leaves.is_present(offset + j) {
          visit(j, offset + j);
        }
      }
      return;
    }
    let len_t = self.stems.len();
    let mut queue: VecDeque<SubrowInfo> = VecDeque::new();
    let mut next_level: VecDeque<SubrowInfo> = VecDeque::new();
    let mut n = self.matrix_width / k;
    let mut rel_p = i;
    {
      let mut dq = 0;
      let mut z = k * (rel_p / n);
      for _ in 0..k {
        queue.push_back(SubrowInfo { dq, z });
        dq += n;
        z += 1;
      }
    }
    rel_p %= n;
    n /= k;
    while n > 1 {
      while let Some(cur) = queue.pop_front() {
        if self.stems[cur.z] {
          let mut y = self.rank(cur.z + 1) * self.block_len() + k * (rel_p / n);
          let mut dq = cur.dq;
          for _ in 0..k {
            next_level.push_back(SubrowInfo { dq, z: y });
            dq += n;
            y += 1;
          }
        }
      }
      std::mem::swap(&mut queue, &mut next_level);
      rel_p %= n;
      n /= k;
    }
    while let Some(cur) = queue.pop_front() {
      if self.stems[cur.z] {
        let mut y = self.rank(cur.z + 1) * self.block_len() + k * rel_p - len_t;
        let mut dq = cur.dq;
        for _ in 0..k {
          if self.leaves.is_present(y) {
            visit(dq, y);
          }
          dq += 1;
          y += 1;
        }
      }
    }
  }
  /// Recursive traversal of column `j`, calling `visit(row, leaf-index)`
  /// for every non-null cell in increasing row order.
  fn for_each_predecessor(&self, j: usize, visit: &mut impl FnMut(usize, usize)) {
    if self.leaves.is_empty() {
      return;
    }
    let n = self.matrix_width / self.k;
    let y = j / n;
    for i in 0..self.k {
      self.predecessors_rec(n, j % n, n * i, y + i * self.k, visit);
    }
  }
  fn predecessors_rec(
    &self,
    n: usize,
    q: usize,
    p: usize,
    z: usize,
    visit: &mut impl FnMut(usize, usize),
  ) {
    if z >= self.stems.len() {
      let y = z - self.stems.len();
      if self.leaves.is_present(y) {
        visit(p, y);
      }
    } else if self.stems[z] {
      let child = n / self.k;
      let y = self.rank(z + 1) * self.block_len() + q / child;
      for i in 0..self.k {
        self.predecessors_rec(child, q % child, p + child * i, y + i * self.k, visit);
      }
    }
  }
  /// Recursive rectangle traversal, calling `visit(row, column, leaf-index)`
  /// for every non-null cell of `[p1, p2] x [q1, q2]`; only quadrants
  /// overlapping the rectangle are entered.
  fn for_each_in_range(
    &self,
    p1: usize,
    p2: usize,
    q1: usize,
    q2: usize,
    visit: &mut impl FnMut(usize, usize, usize),
  ) {
    if self.leaves.is_empty() {
      return;
    }
    let n = self.matrix_width / self.k;
    for i in p1 / n..=p2 / n {
      let p1_sub = if i == p1 / n { p1 % n } else { 0 };
      let p2_sub = if i == p2 / n { p2 % n } else { n - 1 };
      for j in q1 / n..=q2 / n {
        let q1_sub = if j == q1 / n { q1 % n } else { 0 };
        let q2_sub = if j == q2 / n { q2 % n } else { n - 1 };
        self.range_rec(
          n,
          p1_sub,
          p2_sub,
          q1_sub,
          q2_sub,
          n * i,
          n * j,
          self.k * i + j,
          visit,
        );
      }
    }
  }
  #[allow(clippy::too_many_arguments)]
  fn range_rec(
    &self,
    n: usize,
    p1: usize,
    p2: usize,
    q1: usize,
    q2: usize,
    dp: usize,
    dq: usize,
    z: usize,
    visit: &mut impl FnMut(usize, usize, usize),
  ) {
    if z >= self.stems.len() {
      let y = z - self.stems.len();
      if self.leaves.is_present(y) {
        visit(dp, dq, y);
      }
    } else if self.stems[z] {
      let child = n / self.k;
      let y = self.rank(z + 1) * self.block_len();
      for i in p1 / child..=p2 / child {
        let p1_sub = if i == p1 / child { p1 % child } else { 0 };
        let p2_sub = if i == p2 / child { p2 % child } else { child - 1 };
        for j in q1 / child..=q2 / child {
          let q1_sub = if j == q1 / child { q1 % child } else { 0 };
          let q2_sub = if j == q2 / child { q2 % child } else { child - 1 };
          self.range_rec(
            child,
            p1_sub,
            p2_sub,
            q1_sub,
            q2_sub,
            dp + child * i,
            dq + child * j,
            y + self.k * i + j,
            visit,
          );
        }
      }
    }
  }
  fn elem_in_range(&self, n: usize, p1: usize, p2: usize, q1: usize, q2: usize, z: usize) -> bool {
    if z >= self.stems.len() {
      return self.leaves.is_present(z - self.stems.len());
    }
    if !self.stems[z] {
      return false;
    }
    /* The covering check compares against the side of the submatrix the
    bit at z spans, not the side of its children. */
    if p1 == 0 && q1 == 0 && p2 == n - 1 && q2 == n - 1 {
      return true;
    }
    let child = n / self.k;
    let y = self.rank(z + 1) * self.block_len();
    for i in p1 / child..=p2 / child {
      let p1_sub = if i == p1 / child { p1 % child } else { 0 };
      let p2_sub = if i == p2 / child { p2 % child } else { child - 1 };
      for j in q1 / child..=q2 / child {
        let q1_sub = if j == q1 / child { q1 % child } else { 0 };
        let q2_sub = if j == q2 / child { q2 % child } else { child - 1 };
        if self.elem_in_range(child, p1_sub, p2_sub, q1_sub, q2_sub, y + self.k * i + j) {
          return true;
        }
      }
    }
    false
  }
  fn clear_cell(&mut self, n: usize, p: usize, q: usize, z: usize) {
    if z >= self.stems.len() {
      let y = z - self.stems.len();
      self.leaves.clear_to_null(y);
    } else if self.stems[z] {
      let child = n / self.k;
      let next = self.rank(z + 1) * self.block_len() + (p / child) * self.k + q / child;
      self.clear_cell(child, p % child, q % child, next);
    }
  }
}

/* Public Interface Tests */
