//! 160-bit content hashes.
//!
//! Blocks are deduplicated by comparing these hashes, and data units are
//! identified by the hash of their signature string.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// A SHA-1 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash160([u8; 20]);

impl Hash160 {
    pub const SIZE: usize = 20;

    /// All-zero hash, never produced by [`Hash160::compute`] in practice.
    pub const EMPTY: Self = Self([0; 20]);

    /// Hash a byte slice.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Hasher160::new();
        hasher.update(bytes);
        hasher.finish()
    }

    /// Hash the UTF-8 bytes of a string.
    pub fn compute_str(s: &str) -> Self {
        Self::compute(s.as_bytes())
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl fmt::Display for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash160({self})")
    }
}

/// Incremental hasher producing a [`Hash160`].
#[derive(Clone, Default)]
pub struct Hasher160 {
    inner: Sha1,
}

impl Hasher160 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        self.inner.update(bytes);
        self
    }

    pub fn update_u32(&mut self, value: u32) -> &mut Self {
        self.update(&value.to_le_bytes())
    }

    pub fn update_u64(&mut self, value: u64) -> &mut Self {
        self.update(&value.to_le_bytes())
    }

    pub fn finish(self) -> Hash160 {
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.inner.finalize());
        Hash160(out)
    }
}
