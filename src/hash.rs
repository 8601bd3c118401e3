use std::fmt::Display;
use std::str::FromStr;

use clap::ValueEnum;
use sha2::Digest;

use crate::error::Error;

/// The caller-supplied `bytes → bytes` function used to combine nodes.
///
/// Implementations must be deterministic. Any closure `Fn(&[u8]) -> Vec<u8>` qualifies.
pub trait HashFunction {
  fn hash(&self, data: &[u8]) -> Vec<u8>;
}

impl<F> HashFunction for F
where
  F: Fn(&[u8]) -> Vec<u8>,
{
  fn hash(&self, data: &[u8]) -> Vec<u8> {
    self(data)
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256;

impl HashFunction for Sha256 {
  fn hash(&self, data: &[u8]) -> Vec<u8> {
    sha2::Sha256::digest(data).to_vec()
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha3_256;

impl HashFunction for Sha3_256 {
  fn hash(&self, data: &[u8]) -> Vec<u8> {
    sha3::Sha3_256::digest(data).to_vec()
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3;

impl HashFunction for Blake3 {
  fn hash(&self, data: &[u8]) -> Vec<u8> {
    blake3::hash(data).as_bytes().to_vec()
  }
}

/// Hash functions selectable by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
  #[value(name = "sha256")]
  Sha256,
  #[value(name = "sha3-256")]
  Sha3_256,
  #[value(name = "blake3")]
  Blake3,
}

impl Algorithm {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Sha256 => "sha256",
      Self::Sha3_256 => "sha3-256",
      Self::Blake3 => "blake3",
    }
  }
}

impl HashFunction for Algorithm {
  fn hash(&self, data: &[u8]) -> Vec<u8> {
    match self {
      Self::Sha256 => Sha256.hash(data),
      Self::Sha3_256 => Sha3_256.hash(data),
      Self::Blake3 => Blake3.hash(data),
    }
  }
}

impl Display for Algorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Algorithm {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "sha256" | "sha-256" => Ok(Self::Sha256),
      "sha3-256" | "sha3_256" | "sha3" => Ok(Self::Sha3_256),
      "blake3" => Ok(Self::Blake3),
      _ => Err(Error::UnknownAlgorithm(s.to_string())),
    }
  }
}
