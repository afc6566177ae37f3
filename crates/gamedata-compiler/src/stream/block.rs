use gamedata_core::{Hash160, Hasher160};
use gamedata_format::{Endian, PointerMode};
use indexmap::IndexMap;

use super::StreamReference;

/// Mixed into the content hash of blocks that carry pointer sites or markers.
const SHAPE_MAGIC: u64 = 0xDEAD_BEEF_CAFE_BABE;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum BlockState {
    Unopened,
    Open,
    Closed,
}

/// A reference site inside a block.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct PointerSite {
    /// Offset from the block start.
    pub offset: u32,
    pub mode: PointerMode,
}

#[derive(Debug)]
pub(crate) struct DataBlock {
    pub reference: StreamReference,
    pub alignment: u32,
    /// Upper bound on the content size, when known up front.
    pub declared_size: Option<u32>,
    /// Data unit that was open when the block was opened.
    pub unit: Option<usize>,
    pub state: BlockState,
    /// Start of the content in the scratch buffer.
    pub offset: u32,
    /// Content size, excluding close padding.
    pub size: u32,
    pub pointers: IndexMap<StreamReference, Vec<PointerSite>>,
    pub markers: IndexMap<StreamReference, u32>,
}

impl DataBlock {
    pub fn new(reference: StreamReference, alignment: u32, declared_size: Option<u32>) -> Self {
        Self {
            reference,
            alignment: alignment.max(1),
            declared_size,
            unit: None,
            state: BlockState::Unopened,
            offset: 0,
            size: 0,
            pointers: IndexMap::new(),
            markers: IndexMap::new(),
        }
    }

    pub fn content<'s>(&self, scratch: &'s [u8]) -> &'s [u8] {
        let start = self.offset as usize;
        &scratch[start..start + self.size as usize]
    }

    /// Hash of the content and of the pointer/marker shape.
    ///
    /// Sites and markers are hashed in offset order so that merging pointer
    /// lists does not change the hash of otherwise identical blocks.
    pub fn content_hash(&self, scratch: &[u8]) -> Hash160 {
        let mut hasher = Hasher160::new();
        hasher.update(self.content(scratch));
        hasher.update_u32(self.alignment);

        if !self.pointers.is_empty() || !self.markers.is_empty() {
            hasher.update_u64(SHAPE_MAGIC);

            let mut sites: Vec<(u32, u32, u8)> = self
                .pointers
                .iter()
                .flat_map(|(r, sites)| sites.iter().map(|s| (s.offset, r.id(), s.mode as u8)))
                .collect();
            sites.sort_unstable();
            for (offset, id, mode) in sites {
                hasher.update_u32(id).update_u32(offset).update(&[mode]);
            }

            let mut markers: Vec<(u32, u32)> =
                self.markers.iter().map(|(r, &o)| (o, r.id())).collect();
            markers.sort_unstable();
            for (offset, id) in markers {
                hasher.update_u32(id).update_u32(offset);
            }
        }
        hasher.finish()
    }

    /// Point every site that targets `old` at `new`, rewriting the
    /// placeholder bytes in the scratch buffer.
    pub fn replace_reference(
        &mut self,
        scratch: &mut [u8],
        old: StreamReference,
        new: StreamReference,
        endian: Endian,
    ) {
        let Some(sites) = self.pointers.shift_remove(&old) else {
            return;
        };
        let placeholder = endian.i64_bytes(new.id() as i64);
        for site in &sites {
            let at = (self.offset + site.offset) as usize;
            scratch[at..at + 8].copy_from_slice(&placeholder);
        }
        let merged = self.pointers.entry(new).or_default();
        merged.extend(sites);
        merged.sort_by_key(|s| s.offset);
    }
}
