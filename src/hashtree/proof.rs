use std::fmt::Display;
use std::str::FromStr;

use log::debug;

use super::builder::combine;
use super::{Hash, Layer, Mode, pairing};
use crate::bytes::{parse_hex, to_hex};
use crate::error::{Error, Result};
use crate::hash::HashFunction;

/// Side on which a sibling sits relative to the node being proved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
  Left,
  Right,
}

impl Display for Position {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Position::Left => "left",
      Position::Right => "right",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
  pub position: Position,
  pub data: Hash,
}

impl ProofStep {
  pub fn new(position: Position, data: Hash) -> Self {
    ProofStep { position, data }
  }
}

impl Display for ProofStep {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.position, to_hex(&self.data))
  }
}

impl FromStr for ProofStep {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    let (position, data) = s.split_once(':').ok_or_else(|| Error::InvalidProofStep(s.to_string()))?;
    let position = match position.trim().to_ascii_lowercase().as_str() {
      "left" | "l" => Position::Left,
      "right" | "r" => Position::Right,
      _ => return Err(Error::InvalidProofStep(s.to_string())),
    };
    let data = parse_hex(data)?;
    Ok(ProofStep { position, data })
  }
}

/// Sibling hashes from the leaf layer up to, but excluding, the root.
///
/// An empty proof means "not provable": it never verifies, even for a single-leaf tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Proof {
  steps: Vec<ProofStep>,
}

impl Proof {
  pub fn new(steps: Vec<ProofStep>) -> Self {
    Proof { steps }
  }

  pub fn steps(&self) -> &[ProofStep] {
    &self.steps
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ProofStep> {
    self.steps.iter()
  }

  /// Total bytes of sibling data carried by the proof.
  pub fn data_size(&self) -> usize {
    self.steps.iter().map(|s| s.data.len()).sum()
  }

  pub fn into_steps(self) -> Vec<ProofStep> {
    self.steps
  }
}

impl From<Vec<ProofStep>> for Proof {
  fn from(steps: Vec<ProofStep>) -> Self {
    Proof { steps }
  }
}

impl<'a> IntoIterator for &'a Proof {
  type Item = &'a ProofStep;
  type IntoIter = std::slice::Iter<'a, ProofStep>;

  fn into_iter(self) -> Self::IntoIter {
    self.steps.iter()
  }
}

/// One step per line.
impl Display for Proof {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for step in &self.steps {
      writeln!(f, "{step}")?;
    }
    Ok(())
  }
}

impl FromStr for Proof {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let steps = s.lines().filter(|l| !l.trim().is_empty()).map(ProofStep::from_str).collect::<Result<Vec<_>>>()?;
    Ok(Proof { steps })
  }
}

/// Collects the sibling of the node at `index` in every layer below the root.
///
/// Returns an empty proof when `index` is not a leaf position.
pub fn generate(layers: &[Layer], index: usize, mode: Mode) -> Proof {
  let Some(leaves) = layers.first() else {
    return Proof::default();
  };
  if index >= leaves.len() {
    debug!("no proof: index {index} is out of range for {} leaves", leaves.len());
    return Proof::default();
  }

  let mut steps = Vec::with_capacity(layers.len().saturating_sub(1));
  let mut index = index;
  for layer in &layers[..layers.len() - 1] {
    if let Some((sibling, position)) = pairing::sibling(index, layer.len(), mode) {
      steps.push(ProofStep::new(position, layer[sibling].clone()));
    }
    index = pairing::parent(index);
  }
  Proof { steps }
}

/// Replays `proof` from `target` and compares the result with `root`.
///
/// Every step is applied before the single final comparison. An empty proof, target or root never
/// verifies.
pub fn verify<H: HashFunction + ?Sized>(hasher: &H, mode: Mode, proof: &Proof, target: &[u8], root: &[u8]) -> bool {
  if proof.is_empty() || target.is_empty() || root.is_empty() {
    return false;
  }
  let mut hash = target.to_vec();
  for step in proof {
    hash = match step.position {
      Position::Left => combine(hasher, mode, &step.data, &hash),
      Position::Right => combine(hasher, mode, &hash, &step.data),
    };
  }
  hash == root
}
