use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("invalid hex string {text:?}: {source}")]
  InvalidHex { text: String, source: hex::FromHexError },

  #[error("invalid leaf at line {line}: {message}")]
  InvalidLeaf { line: usize, message: String },

  #[error("invalid proof step {0:?}: expected left:<hex> or right:<hex>")]
  InvalidProofStep(String),

  #[error("unknown hash algorithm: {0}")]
  UnknownAlgorithm(String),

  #[error("leaf not found: {0}")]
  LeafNotFound(String),

  #[error("index {index} is out of range for {size} leaves")]
  IndexOutOfRange { index: usize, size: usize },
}
