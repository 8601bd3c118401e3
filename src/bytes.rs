//! Byte-level helpers shared by the tree builder and the proof engine.

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// Returns the bytes in reverse order (big-endian ⇄ little-endian).
#[inline]
pub fn reverse(bytes: &[u8]) -> Vec<u8> {
  bytes.iter().rev().copied().collect()
}

/// Concatenates byte sequences in argument order.
pub fn concat<T: AsRef<[u8]>>(parts: &[T]) -> Vec<u8> {
  let mut buffer = Vec::with_capacity(parts.iter().map(|p| p.as_ref().len()).sum());
  for part in parts {
    buffer.extend_from_slice(part.as_ref());
  }
  buffer
}

/// Lexicographic comparison up to the shorter length. Bytes beyond the common prefix are ignored, so
/// `Ordering::Equal` does not imply equal length.
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
  let n = a.len().min(b.len());
  a[..n].cmp(&b[..n])
}

fn strip_hex_prefix(text: &str) -> &str {
  text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text)
}

/// `true` if `text` is an optional `0x` prefix followed only by hex digits.
pub fn is_hex(text: &str) -> bool {
  strip_hex_prefix(text).chars().all(|c| c.is_ascii_hexdigit())
}

pub fn to_hex(bytes: &[u8]) -> String {
  format!("0x{}", hex::encode(bytes))
}

/// Decodes a hex string with or without the `0x` prefix. An odd number of digits is read as if a leading
/// `0` were present.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
  let digits = strip_hex_prefix(text.trim());
  let decoded = if digits.len() % 2 == 1 { hex::decode(format!("0{digits}")) } else { hex::decode(digits) };
  decoded.map_err(|source| Error::InvalidHex { text: text.to_string(), source })
}

/// Interprets `text` as hex when it carries the `0x` prefix and is valid hex, otherwise as its UTF-8 bytes.
pub fn bufferify(text: &str) -> Vec<u8> {
  if text.len() > 2 && text.starts_with("0x") && is_hex(text) && let Ok(bytes) = parse_hex(text) {
    bytes
  } else {
    text.as_bytes().to_vec()
  }
}
