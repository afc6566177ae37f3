//! Signature database: maps data-unit signatures to file ids.
//!
//! The bigfile packer assigns every data unit a `(container, entry)` pair;
//! the compiler looks those up to write cross-unit references.

use std::collections::BTreeMap;
use std::path::Path;

use gamedata_core::Hash160;
use serde::{Deserialize, Serialize};

/// Location of a data unit inside the packed bigfiles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId {
    pub container: u32,
    pub entry: u32,
}

impl FileId {
    /// Written for signatures the database does not know.
    pub const MISSING: Self = Self {
        container: u32::MAX,
        entry: u32::MAX,
    };

    pub fn new(container: u32, entry: u32) -> Self {
        Self { container, entry }
    }

    pub fn is_missing(&self) -> bool {
        *self == Self::MISSING
    }
}

/// Read access to signature entries.
pub trait SignatureLookup {
    /// Entry for `signature`, or [`FileId::MISSING`].
    fn entry(&self, signature: Hash160) -> FileId;
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("failed to encode signature database")]
    Encode(#[source] postcard::Error),

    #[error("failed to decode signature database")]
    Decode(#[source] postcard::Error),

    #[error("signature database i/o failed")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDatabase {
    entries: BTreeMap<Hash160, FileId>,
}

impl SignatureDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signature, returning the entry it replaced.
    pub fn register(&mut self, signature: Hash160, id: FileId) -> Option<FileId> {
        self.entries.insert(signature, id)
    }

    pub fn get(&self, signature: Hash160) -> Option<FileId> {
        self.entries.get(&signature).copied()
    }

    /// Drop every entry stored in `container`. Returns how many were removed.
    pub fn remove_primary(&mut self, container: u32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, id| id.container != container);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SignatureError> {
        postcard::to_allocvec(self).map_err(SignatureError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        postcard::from_bytes(bytes).map_err(SignatureError::Decode)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SignatureError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}

impl SignatureLookup for SignatureDatabase {
    fn entry(&self, signature: Hash160) -> FileId {
        self.get(signature).unwrap_or_else(|| {
            tracing::warn!(%signature, "signature database: no entry for data unit");
            FileId::MISSING
        })
    }
}
