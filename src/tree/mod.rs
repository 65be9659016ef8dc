
mod build;
mod datastore;
mod leaves;

pub use build::ListsMode;
pub use datastore::{K2Tree, ValuedK2Tree};
pub use leaves::{BitLeaves, LeafStore, ValueLeaves};

/// A relation entry: the value stored at a (row, column) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ValuedPosition<E> {
  /// Row coordinate.
  pub row: usize,
  /// Column coordinate.
  pub col: usize,
  /// The cell's value.
  pub val: E,
}

impl<E> ValuedPosition<E> {
  /// Bundles a (row, column, value) triple.
  pub fn new(row: usize, col: usize, val: E) -> Self {
    ValuedPosition { row, col, val }
  }
}

/// Smallest `h` with `k.pow(h) >= n`.
pub(crate) fn log_k(n: usize, k: usize) -> usize {
  let mut h = 0;
  let mut width = 1;
  while width < n {
    width *= k;
    h += 1;
  }
  h
}

#[cfg(test)]
mod util {
  use super::*;

  #[test]
  fn log_k_0() {
    assert_eq!(0, log_k(0, 2));
    assert_eq!(0, log_k(1, 2));
    assert_eq!(1, log_k(2, 2));
    assert_eq!(2, log_k(3, 2));
    assert_eq!(2, log_k(4, 2));
    assert_eq!(3, log_k(5, 2));
    assert_eq!(3, log_k(8, 2));
    assert_eq!(1, log_k(4, 4));
    assert_eq!(2, log_k(5, 4));
    assert_eq!(2, log_k(16, 4));
    assert_eq!(3, log_k(17, 4));
  }
}
