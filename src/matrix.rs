
use crate::error::MatrixError;

type Result<T> = std::result::Result<T, MatrixError>;

/// A dense 2-d matrix of element values, stored row-major.
///
/// This is the uncompressed counterpart of a `K2Tree`: builders read one
/// as input and `K2Tree::to_matrix` reconstructs one. Cells the relation
/// does not populate carry whatever fill value the matrix was created
/// with, typically the same null sentinel the tree uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DenseMatrix<E> {
  /// Number of columns.
  pub width: usize,
  /// Number of rows.
  pub height: usize,
  cells: Vec<E>,
}

/// A dense matrix of presence bits, the input shape of the boolean tree.
pub type BitMatrix = DenseMatrix<bool>;

impl<E: Clone> DenseMatrix<E> {
  /// Creates a matrix of the given dimensions with every cell set to `fill`.
  pub fn with_dimensions(width: usize, height: usize, fill: E) -> Self {
    DenseMatrix {
      width,
      height,
      cells: vec![fill; width * height],
    }
  }
  /// Builds a matrix from a list of equally long rows.
  ///
  /// Returns an error naming the first row whose length differs from the
  /// first row's.
  /// ```
  /// use k2_relation::matrix::DenseMatrix;
  /// let m = DenseMatrix::from_rows(vec![
  ///   vec![0, 7],
  ///   vec![3, 0],
  /// ]).unwrap();
  /// assert_eq!(7, m.get(0, 1).unwrap());
  /// assert!(DenseMatrix::from_rows(vec![vec![1], vec![2, 3]]).is_err());
  /// ```
  pub fn from_rows(rows: Vec<Vec<E>>) -> Result<Self> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let height = rows.len();
    let mut cells = Vec::with_capacity(width * height);
    for (i, row) in rows.into_iter().enumerate() {
      if row.len() != width {
        return Err(MatrixError::RaggedRows {
          row: i,
          len: row.len(),
          expected: width,
        });
      }
      cells.extend(row);
    }
    Ok(DenseMatrix {
      width,
      height,
      cells,
    })
  }
  /// Returns the value of the cell in row `i`, column `j`.
  pub fn get(&self, i: usize, j: usize) -> Result<E> {
    if i >= self.height || j >= self.width {
      return Err(MatrixError::OutOfBounds {
        pos: [i, j],
        max: [self.height, self.width],
      });
    }
    Ok(self.cells[i * self.width + j].clone())
  }
  /// Overwrites the cell in row `i`, column `j`.
  pub fn set(&mut self, i: usize, j: usize, value: E) -> Result<()> {
    if i >= self.height || j >= self.width {
      return Err(MatrixError::OutOfBounds {
        pos: [i, j],
        max: [self.height, self.width],
      });
    }
    self.cells[i * self.width + j] = value;
    Ok(())
  }
  /// Produces the contents of the matrix as a vec of its rows.
  pub fn to_rows(&self) -> Vec<Vec<E>> {
    if self.width == 0 {
      return vec![Vec::new(); self.height];
    }
    self
      .cells
      .chunks(self.width)
      .map(|row| row.to_vec())
      .collect()
  }
}

impl<E> DenseMatrix<E> {
  /// Value of the cell in row `i`, column `j` without cloning.
  ///
  /// Callers inside the crate index with coordinates already proven
  /// in-bounds.
  pub(crate) fn cell(&self, i: usize, j: usize) -> &E {
    &self.cells[i * self.width + j]
  }
}
