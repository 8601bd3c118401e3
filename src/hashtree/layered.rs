use std::fmt::Display;

use log::debug;

use super::proof::{self, Proof};
use super::{Hash, HashTree, Layer, Mode, builder};
use crate::bytes::to_hex;
use crate::hash::HashFunction;

/// Merkle tree that keeps every layer in memory, from the leaves up to the root.
///
/// The layers are computed once in [`LayeredHashTree::new`] and are only reachable through shared
/// references afterwards, so a built tree can be shared between threads and queried concurrently.
///
/// ```text
///   layer 2:            H(H(a|b)|c)
///   layer 1:       H(a|b)          c
///   layer 0:     a       b         c
/// ```
#[derive(Debug, Clone)]
pub struct LayeredHashTree<H: HashFunction> {
  hasher: H,
  mode: Mode,
  layers: Vec<Layer>,
}

impl<H: HashFunction> LayeredHashTree<H> {
  /// Build a tree over pre-hashed `leaves`.
  pub fn new(leaves: Vec<Hash>, hasher: H, mode: Mode) -> Self {
    let size = leaves.len();
    let layers = builder::build_layers(&hasher, mode, leaves);
    debug!("built {mode} tree: {size} leaves, {} layers", layers.len());
    LayeredHashTree { hasher, mode, layers }
  }

  pub fn leaves(&self) -> &[Hash] {
    &self.layers[0]
  }

  pub fn layers(&self) -> &[Layer] {
    &self.layers
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn hasher(&self) -> &H {
    &self.hasher
  }

  /// Number of layers above the leaves.
  pub fn depth(&self) -> usize {
    self.layers.len() - 1
  }

  pub fn root_hex(&self) -> String {
    to_hex(self.root())
  }

  /// Position of the first leaf equal to `leaf`.
  pub fn leaf_index(&self, leaf: &[u8]) -> Option<usize> {
    self.leaves().iter().position(|l| l.as_slice() == leaf)
  }

  pub fn proof_by_index(&self, index: usize) -> Proof {
    proof::generate(&self.layers, index, self.mode)
  }
}

impl<H: HashFunction> HashTree for LayeredHashTree<H> {
  fn size(&self) -> usize {
    self.leaves().len()
  }

  fn leaf(&self, index: usize) -> Option<&[u8]> {
    self.leaves().get(index).map(|l| l.as_slice())
  }

  fn root(&self) -> &[u8] {
    self.layers.last().and_then(|layer| layer.first()).map(|h| h.as_slice()).unwrap_or(&[])
  }

  fn generate_proof(&self, leaf: &[u8], index: Option<usize>) -> Proof {
    match index.or_else(|| self.leaf_index(leaf)) {
      Some(index) => self.proof_by_index(index),
      None => {
        debug!("no proof: leaf {} is not in the tree", to_hex(leaf));
        Proof::default()
      }
    }
  }

  fn verify(&self, proof: &Proof, target: &[u8], root: &[u8]) -> bool {
    proof::verify(&self.hasher, self.mode, proof, target, root)
  }
}

/// Layers from the root down, one hash per line, indented by depth.
impl<H: HashFunction> Display for LayeredHashTree<H> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (depth, layer) in self.layers.iter().rev().enumerate() {
      for hash in layer {
        writeln!(f, "{:indent$}└─ {}", "", to_hex(hash), indent = depth * 2)?;
      }
    }
    Ok(())
  }
}
