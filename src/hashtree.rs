use std::fmt::Display;

pub mod builder;
pub mod layered;
pub mod pairing;
pub mod proof;

use proof::Proof;

/// An opaque hash value. Compared byte by byte, never interpreted.
pub type Hash = Vec<u8>;

/// One level of the tree; layer 0 holds the leaves.
pub type Layer = Vec<Hash>;

/// How two nodes are combined into their parent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// `H(left | right)`, with an unpaired last node promoted unchanged.
  #[default]
  Standard,
  /// `rev(H(H(rev(left) | rev(right))))`, with an unpaired last node paired with itself.
  Bitcoin,
}

impl Mode {
  pub fn is_bitcoin(&self) -> bool {
    matches!(self, Mode::Bitcoin)
  }
}

impl Display for Mode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Mode::Standard => "standard",
      Mode::Bitcoin => "bitcoin",
    })
  }
}

/// Core hash tree abstraction
pub trait HashTree {
  /// Get the current size (number of leaf nodes)
  fn size(&self) -> usize;

  /// Retrieve a leaf by index
  fn leaf(&self, index: usize) -> Option<&[u8]>;

  /// Get the root hash, or an empty slice for a tree without leaves
  fn root(&self) -> &[u8];

  /// Generate the inclusion proof of `leaf`. Without `index` the first equal leaf is used. An empty proof
  /// means the leaf could not be resolved.
  fn generate_proof(&self, leaf: &[u8], index: Option<usize>) -> Proof;

  /// Verify a path from `target` to `root`
  fn verify(&self, proof: &Proof, target: &[u8], root: &[u8]) -> bool;
}

#[cfg(test)]
mod test;
