/*!
These are all the custom errors that this library could return.

The tree is a pure computational structure and does not fail on
well-formed inputs; every variant here reports a caller error, either a
malformed construction input or a coordinate outside the represented
matrix.
*/

/// Errors produced as a result of interactions with the K2Tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum K2TreeError {
  /// Produced when a user attempts to create a K2Tree with a k value below 2.
  SmallKValue {
    ///
    k: usize,
  },
  /// Produced when a user attempts to access a cell outside the bounds of
  /// the matrix a K2Tree represents.
  OutOfBounds {
    ///
    pos: [usize; 2],
    ///
    max: [usize; 2],
  },
  /// Produced when the low end of a query range exceeds its high end.
  DescendingRange {
    ///
    low: usize,
    ///
    high: usize,
  },
  /// Propagation of a MatrixError.
  Matrix {
    ///
    source: Box<MatrixError>,
  },
}
impl std::error::Error for K2TreeError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      K2TreeError::Matrix { source } => Some(source),
      _ => None,
    }
  }
}
impl std::fmt::Display for K2TreeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use K2TreeError::*;
    match self {
      SmallKValue { k } => write!(f, "Attempt to create a K2Tree with a k value of {}, which is less than the minimum of 2.", k),
      OutOfBounds {
        pos: [i, j],
        max: [max_i, max_j],
      } => write!(f, "Attempt to access a cell at coordinates ({}, {}) which are not in the range of the matrix represented by the K2Tree: (0, 0) -> ({}, {})", i, j, max_i, max_j),
      DescendingRange { low, high } => write!(f, "Attempt to query a range whose low end {} exceeds its high end {}.", low, high),
      Matrix { source } => write!(f, "{}", source),
    }
  }
}
impl From<MatrixError> for K2TreeError {
  fn from(error: MatrixError) -> Self {
    K2TreeError::Matrix {
      source: Box::new(error),
    }
  }
}

/// Errors produced as a result of interactions with the DenseMatrix object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatrixError {
  /// Produced when a user attempts to read or write a cell outside of the
  /// valid range.
  OutOfBounds {
    ///
    pos: [usize; 2],
    ///
    max: [usize; 2],
  },
  /// Produced when the rows handed to a matrix constructor are not all the
  /// same length.
  RaggedRows {
    /// The offending row.
    row: usize,
    /// Its length.
    len: usize,
    /// The length of the first row.
    expected: usize,
  },
}
impl std::error::Error for MatrixError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    None
  }
}
impl std::fmt::Display for MatrixError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use MatrixError::*;
    match self {
      OutOfBounds {
        pos: [i, j],
        max: [rows, cols],
      } => write!(f, "Attempt to access a cell at coordinates ({}, {}) which are not in the range of the matrix: (0, 0) -> ({}, {})", i, j, rows.saturating_sub(1), cols.saturating_sub(1)),
      RaggedRows { row, len, expected } => write!(f, "Row {} has length {} but every row was expected to have length {}.", row, len, expected),
    }
  }
}
