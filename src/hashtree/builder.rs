use log::trace;

use super::{Hash, Layer, Mode, pairing};
use crate::bytes::{concat, reverse};
use crate::hash::HashFunction;

/// Hash two adjacent nodes into their parent.
pub fn combine<H: HashFunction + ?Sized>(hasher: &H, mode: Mode, left: &[u8], right: &[u8]) -> Hash {
  match mode {
    Mode::Standard => hasher.hash(&concat(&[left, right])),
    Mode::Bitcoin => {
      let combined = concat(&[&reverse(left), &reverse(right)]);
      reverse(&hasher.hash(&hasher.hash(&combined)))
    }
  }
}

/// Value carried to the next layer by the unpaired last node of an odd-length layer.
pub fn promote<H: HashFunction + ?Sized>(hasher: &H, mode: Mode, node: &[u8]) -> Hash {
  match mode {
    Mode::Standard => node.to_vec(),
    Mode::Bitcoin => combine(hasher, mode, node, node),
  }
}

/// Builds the layer on top of `layer`.
pub fn next_layer<H: HashFunction + ?Sized>(hasher: &H, mode: Mode, layer: &[Hash]) -> Layer {
  let mut next = Vec::with_capacity(pairing::parent_len(layer.len()));
  for pair in layer.chunks(2) {
    match pair {
      [left, right] => next.push(combine(hasher, mode, left, right)),
      [lonely] => next.push(promote(hasher, mode, lonely)),
      _ => unreachable!(),
    }
  }
  next
}

/// Builds every layer from the leaves up to the root.
///
/// `layers[0]` is `leaves` and the last layer holds a single root, unless there are no leaves at all, in
/// which case the result is `[[]]`. A single leaf is its own root and is never hashed.
pub fn build_layers<H: HashFunction + ?Sized>(hasher: &H, mode: Mode, leaves: Vec<Hash>) -> Vec<Layer> {
  let mut layers = vec![leaves];
  while let Some(current) = layers.last()
    && current.len() > 1
  {
    let next = next_layer(hasher, mode, current);
    trace!("layer {}: {} nodes", layers.len(), next.len());
    layers.push(next);
  }
  layers
}
