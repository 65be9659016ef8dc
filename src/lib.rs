#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

/*!
A collection designed to efficiently compress sparse, valued two-dimensional
relations.

See the original k2-tree proposal [here](https://users.dcc.uchile.cl/~gnavarro/ps/spire09.1.pdf).

**Note:** This library heavily relies upon [bitvec](https://docs.rs/bitvec)
to store its structural bits. Always try to compile with optimisations;
`bitvec` is very slow without them!
*/

/*!
# When `K2Tree`s are Useful:

A `K2Tree` shines when two-dimensional data is sparse: almost all of the
empty space compresses away, while point lookups, row and column
enumerations, and rectangle scans stay fast.

The classic example is a Web-Graph: every row and column is a webpage and
every non-null cell the hyperlink between two pages. The boolean tree
covers that case. The valued tree generalises it to relations whose cells
carry data, such as a distance matrix in which most pairs are unrelated:
pick a value that means "no entry" (the *null* element) and only the
remaining cells cost space.
*/

/*!
# How it Works:

## Original Matrix (null = 0):

```ignore
0 0|0 0||9 0|1 0
0 0|0 0||0 0|1 7
---------------
0 0|0 0||0 0|0 0
0 0|0 0||0 0|4 0
===============
5 0|2 0||0 0|3 8
5 0|0 0||0 0|0 0
---------------
0 0|0 0||0 0|0 0
0 0|0 0||0 0|0 0
```

The 8x8 matrix is recursively subdivided into k-by-k quadrants (k = 2
here) until single cells remain. Every quadrant holding only nulls is
replaced by a single 0 bit at the level above; only quadrants with at
least one value keep their children.

## `K2Tree` Representation:

```ignore
              0111
       ________|||_________
       |        |         |
       1101     1100      0100
  |--|---|      |---|     |
9000 1017 0040  5050 2000 3800   <- cell values, k*k per block
```

From left to right in the first layer, each bit covers one of the four
largest quadrants: `0111` means the upper-left quadrant is all null and
the other three are not. Each following block of four bits covers the
sub-quadrants of one set bit of the layer above, in the order those set
bits appear. The final layer stores the actual cell values, null holes
included, but only for blocks that exist at all.

## Final `K2Tree`:

```ignore
K2Tree {
  matrix_width: 8,
  k: 2,
  height: 3,
  stems: 0111110111000100,            // BitVec
  leaves: [9,0,0,0, 1,0,1,7, 0,0,4,0, 5,0,5,0, 2,0,0,0, 3,8,0,0],
}
```

Navigation needs no pointers: a rank-1 count over the stems maps the bit
at position z straight to its child block at `rank1(z + 1) * k * k`.
*/

pub use tree::{BitLeaves, K2Tree, LeafStore, ListsMode, ValueLeaves, ValuedK2Tree};

/// Bit-vector rank support used to navigate the stems.
pub mod bits;

/// Library error types.
pub mod error;

/// `DenseMatrix` struct: the uncompressed input/output shape.
pub mod matrix;

/// `K2Tree` structure and associated types.
pub mod tree;
