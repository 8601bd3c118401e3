//! Index arithmetic for sibling lookup and parent advancement.
//!
//! ```text
//!   layer 1:      [ 0 ]       [ 1 ]      [ 2 ]
//!                 /   \       /   \        |
//!   layer 0:   [0]    [1]   [2]  [3]     [4]    <- 4 is lonely
//! ```
//!
//! A node at an odd index is the right child and its sibling sits on its left. A node at an even index
//! pairs with the next one, if any. The lonely last node of an odd-length layer has no sibling in
//! standard mode (it is promoted unchanged) and is its own sibling in bitcoin mode.

use super::Mode;
use super::proof::Position;

/// Locates the sibling of the node at `index` in a layer of `len` nodes.
///
/// Returns the sibling's index and the side it occupies relative to the node, or `None` when the node is
/// promoted without a partner.
///
/// In bitcoin mode every lonely node is paired with itself, at any layer. A leaf whose ancestor is lonely
/// therefore gets a self-pair step for that layer even when the leaf itself is paired, so its proof is not
/// byte-identical to one that only self-pairs the last leaf, but it verifies against the root.
#[inline]
pub fn sibling(index: usize, len: usize, mode: Mode) -> Option<(usize, Position)> {
  debug_assert!(index < len);
  if index % 2 == 1 {
    Some((index - 1, Position::Left))
  } else if index + 1 < len {
    Some((index + 1, Position::Right))
  } else if mode.is_bitcoin() && is_lonely(index, len) {
    Some((index, Position::Right))
  } else {
    None
  }
}

/// Index of the parent node in the next layer up.
#[inline]
pub fn parent(index: usize) -> usize {
  index / 2
}

/// Length of the layer built on top of a layer of `len` nodes.
#[inline]
pub fn parent_len(len: usize) -> usize {
  len.div_ceil(2)
}

/// `true` for the unpaired last node of an odd-length layer.
#[inline]
pub fn is_lonely(index: usize, len: usize) -> bool {
  len % 2 == 1 && index + 1 == len
}
