//! Finalize: dedup, offset assignment, patching and emission.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use gamedata_core::Hash160;
use gamedata_format::{
    Endian, HEADER_SIZE, Header, NO_POINTERS, NO_ROOT, PointerMode, StreamPointer, UNIT_ALIGN,
    UNIT_HEADER_SIZE, UNIT_RECORD_SIZE, UnitHeader, UnitRecord, align_up,
};
use tracing::{debug, trace};

use super::{DataStream, StreamError, StreamReference};

/// Output of [`DataStream::finalize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedStream {
    /// The complete container.
    pub bytes: Vec<u8>,
    /// One entry per data unit, in registration order.
    pub units: Vec<DataUnitInfo>,
}

/// Placement summary of one data unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUnitInfo {
    pub signature: Hash160,
    /// Offset of the unit from the start of the container.
    pub offset: u32,
    pub size: u32,
    /// Blocks left after deduplication.
    pub blocks: usize,
    /// Blocks merged into an identical earlier block.
    pub merged: usize,
    pub pointers: usize,
}

/// A laid-out unit before it is placed in the container.
struct UnitImage {
    bytes: Vec<u8>,
    alignment: u32,
    blocks: usize,
    merged: usize,
    pointers: usize,
}

impl DataStream {
    /// Merge identical blocks, lay out every data unit and patch all
    /// references into a single container.
    ///
    /// # Panics
    /// Panics if a block or unit is still open, if a registered block was
    /// never written, or if a reference has no target in its unit.
    pub fn finalize(mut self) -> Result<FinalizedStream, StreamError> {
        self.ensure_finished();

        let mut per_unit: Vec<Vec<usize>> = vec![Vec::new(); self.units.len()];
        for (index, block) in self.blocks.iter().enumerate() {
            if let Some(unit) = block.unit {
                per_unit[unit].push(index);
            }
        }

        let mut images = Vec::with_capacity(per_unit.len());
        for (unit, mut blocks) in per_unit.into_iter().enumerate() {
            let before = blocks.len();
            let aliases = self.deduplicate(&mut blocks);
            let mut image = self.layout_unit(unit, &blocks, &aliases)?;
            image.merged = before - blocks.len();
            debug!(
                unit,
                blocks = image.blocks,
                merged = image.merged,
                pointers = image.pointers,
                size = image.bytes.len(),
                "finalize: laid out data unit"
            );
            images.push(image);
        }

        self.assemble(images)
    }

    /// Merge byte-identical blocks until no duplicates remain.
    ///
    /// Returns the replaced references mapped to their survivors.
    fn deduplicate(
        &mut self,
        blocks: &mut Vec<usize>,
    ) -> HashMap<StreamReference, StreamReference> {
        let endian = self.endian;
        let mut aliases = HashMap::new();

        loop {
            let mut first: HashMap<Hash160, usize> = HashMap::new();
            let mut replaced = Vec::new();
            let mut survivors = Vec::with_capacity(blocks.len());

            for &index in blocks.iter() {
                let hash = self.blocks[index].content_hash(&self.scratch);
                match first.entry(hash) {
                    Entry::Occupied(e) => {
                        let keep = self.blocks[*e.get()].reference;
                        replaced.push((self.blocks[index].reference, keep));
                    }
                    Entry::Vacant(e) => {
                        e.insert(index);
                        survivors.push(index);
                    }
                }
            }

            if replaced.is_empty() {
                return aliases;
            }
            trace!(merged = replaced.len(), "finalize: dedup pass");

            *blocks = survivors;
            for &index in blocks.iter() {
                for &(old, new) in &replaced {
                    self.blocks[index].replace_reference(&mut self.scratch, old, new, endian);
                }
            }
            aliases.extend(replaced);
        }
    }

    fn layout_unit(
        &self,
        unit: usize,
        blocks: &[usize],
        aliases: &HashMap<StreamReference, StreamReference>,
    ) -> Result<UnitImage, StreamError> {
        let too_large = || StreamError::UnitTooLarge { unit };

        // Offsets of blocks and markers relative to the unit start.
        let mut offsets: HashMap<StreamReference, u32> = HashMap::new();
        let mut placements = Vec::with_capacity(blocks.len());
        let mut alignment = UNIT_ALIGN;
        let mut pos = UNIT_HEADER_SIZE as u64;
        for &index in blocks {
            let block = &self.blocks[index];
            alignment = alignment.max(block.alignment);
            let start = align_up(u32::try_from(pos).map_err(|_| too_large())?, block.alignment);
            offsets.insert(block.reference, start);
            for (&marker, &offset) in &block.markers {
                offsets.insert(marker, start + offset);
            }
            placements.push(start);
            pos = start as u64 + block.size as u64;
        }
        let size = u32::try_from(pos).map_err(|_| too_large())?;

        let mut bytes = vec![0u8; size as usize];
        let mut sites = Vec::new();
        for (&index, &start) in blocks.iter().zip(&placements) {
            let block = &self.blocks[index];
            let content = block.content(&self.scratch);
            bytes[start as usize..start as usize + content.len()].copy_from_slice(content);

            for (&reference, list) in &block.pointers {
                let target = self.ensure_target(&offsets, resolve(aliases, reference));
                for site in list {
                    sites.push((StreamPointer::new(start + site.offset, target), site.mode));
                }
            }
        }
        sites.sort_by_key(|(p, _)| p.position);

        let endian = self.endian;
        let chained: Vec<StreamPointer> = sites
            .iter()
            .filter(|(_, mode)| *mode == PointerMode::Chained)
            .map(|(p, _)| *p)
            .collect();
        for (pointer, mode) in &sites {
            let encoded = match mode {
                PointerMode::Chained => continue,
                PointerMode::Absolute => pointer.encode_absolute(endian),
                PointerMode::Relative => pointer.encode_relative(endian),
            };
            patch(&mut bytes, pointer.position, &encoded);
        }
        for (i, pointer) in chained.iter().enumerate() {
            let next = chained.get(i + 1).map(|n| n.position);
            let encoded = chain_site(pointer, next, endian)?;
            patch(&mut bytes, pointer.position, &encoded);
        }

        let root_offset = match self.units[unit].root {
            Some(root) => self.ensure_target(&offsets, resolve(aliases, root)),
            None => NO_ROOT,
        };
        let header = UnitHeader {
            pointer_head: chained.first().map_or(NO_POINTERS, |p| p.position),
            pointer_count: chained.len() as u32,
            root_offset,
        };
        bytes[..UNIT_HEADER_SIZE].copy_from_slice(&header.to_bytes(endian));

        Ok(UnitImage {
            bytes,
            alignment,
            blocks: blocks.len(),
            merged: 0,
            pointers: sites.len(),
        })
    }

    fn assemble(self, images: Vec<UnitImage>) -> Result<FinalizedStream, StreamError> {
        let endian = self.endian;
        let records_end = HEADER_SIZE + images.len() * UNIT_RECORD_SIZE;
        let mut bytes = vec![0u8; records_end];
        let mut units = Vec::with_capacity(images.len());

        for (index, image) in images.into_iter().enumerate() {
            let len = u32::try_from(bytes.len()).map_err(|_| StreamError::ContainerTooLarge)?;
            let offset = align_up(len, image.alignment);
            let size = image.bytes.len() as u32;
            bytes.resize(offset as usize, 0);
            bytes.extend_from_slice(&image.bytes);

            let record = UnitRecord {
                file_placeholder: 0,
                offset,
                size,
            };
            let at = HEADER_SIZE + index * UNIT_RECORD_SIZE;
            bytes[at..at + UNIT_RECORD_SIZE].copy_from_slice(&record.to_bytes(endian));

            units.push(DataUnitInfo {
                signature: self.units[index].signature,
                offset,
                size,
                blocks: image.blocks,
                merged: image.merged,
                pointers: image.pointers,
            });
        }

        let total_size = u32::try_from(bytes.len()).map_err(|_| StreamError::ContainerTooLarge)?;
        let header = Header {
            endian,
            pointer_mode: self.pointer_mode,
            checksum: crc32fast::hash(&bytes[HEADER_SIZE..]),
            total_size,
            unit_count: units.len() as u32,
            ..Header::default()
        };
        bytes[..HEADER_SIZE].copy_from_slice(&header.to_bytes());

        debug!(units = units.len(), size = total_size, "finalize: container assembled");
        Ok(FinalizedStream { bytes, units })
    }
}

/// Follow merge aliases to the surviving reference.
fn resolve(
    aliases: &HashMap<StreamReference, StreamReference>,
    mut reference: StreamReference,
) -> StreamReference {
    while let Some(&next) = aliases.get(&reference) {
        reference = next;
    }
    reference
}

/// Chained encoding of one site, failing when the link to the next site or
/// the target is out of `i32` range.
pub(super) fn chain_site(
    pointer: &StreamPointer,
    next: Option<u32>,
    endian: Endian,
) -> Result<[u8; 8], StreamError> {
    pointer.encode_chained(next, endian).ok_or_else(|| {
        let target = match next {
            Some(next) if i32::try_from(next as i64 - pointer.position as i64).is_err() => next,
            _ => pointer.target,
        };
        StreamError::DeltaOverflow {
            position: pointer.position,
            target,
        }
    })
}

fn patch(bytes: &mut [u8], position: u32, encoded: &[u8; 8]) {
    let at = position as usize;
    bytes[at..at + 8].copy_from_slice(encoded);
}
