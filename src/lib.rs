use std::fs::read_to_string;
use std::path::Path;

pub mod bytes;
pub mod error;
pub mod hash;
pub mod hashtree;

pub use error::{Error, Result};
pub use hash::{Algorithm, HashFunction};
pub use hashtree::layered::LayeredHashTree;
pub use hashtree::proof::{Position, Proof, ProofStep};
pub use hashtree::{Hash, HashTree, Layer, Mode};

/// Hash raw items into leaves.
pub fn hash_leaves<I, T, H>(items: I, hasher: &H) -> Vec<Hash>
where
  I: IntoIterator<Item = T>,
  T: AsRef<[u8]>,
  H: HashFunction + ?Sized,
{
  items.into_iter().map(|item| hasher.hash(item.as_ref())).collect()
}

/// Parse one leaf per line, skipping blank lines. Leaves are hex and `#` starts a comment line unless `raw` is
/// set, in which case every trimmed line is a leaf read through [`bytes::bufferify`].
pub fn parse_leaves(text: &str, raw: bool) -> Result<Vec<Vec<u8>>> {
  let mut leaves = Vec::new();
  for (i, line) in text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || (!raw && line.starts_with('#')) {
      continue;
    }
    if raw {
      leaves.push(bytes::bufferify(line));
    } else {
      let leaf = bytes::parse_hex(line).map_err(|e| Error::InvalidLeaf { line: i + 1, message: e.to_string() })?;
      if leaf.is_empty() {
        return Err(Error::InvalidLeaf { line: i + 1, message: "empty leaf".to_string() });
      }
      leaves.push(leaf);
    }
  }
  Ok(leaves)
}

pub fn load_leaves<P: AsRef<Path>>(path: P, raw: bool) -> Result<Vec<Vec<u8>>> {
  parse_leaves(&read_to_string(path)?, raw)
}

/// Deterministic pseudo-random leaf data for benchmarks and tests.
pub fn splitmix64(x: u64) -> u64 {
  let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
  z ^ (z >> 31)
}

/// `n` leaves derived from `splitmix64` and hashed with `hasher`.
pub fn sample_leaves<H: HashFunction + ?Sized>(n: usize, hasher: &H) -> Vec<Hash> {
  hash_leaves((0..n as u64).map(|i| splitmix64(i).to_le_bytes()), hasher)
}
