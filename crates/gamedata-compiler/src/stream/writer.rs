use std::collections::{HashMap, HashSet};

use gamedata_core::Hash160;
use gamedata_format::{Endian, Platform, PointerMode, align_up};

use super::{BlockState, DataBlock, PointerSite, StreamReference};

macro_rules! scalar_writes {
    ($($write:ident, $align_write:ident, $ty:ty, $encode:ident;)*) => {
        $(
            /// # Panics
            /// Panics if the position is not aligned to the value's size.
            pub fn $write(&mut self, value: $ty) {
                let bytes = self.endian.$encode(value);
                self.write_scalar(&bytes);
            }

            pub fn $align_write(&mut self, value: $ty) {
                self.align(size_of::<$ty>() as u32);
                self.$write(value);
            }
        )*
    };
}

/// A data unit known to the stream.
#[derive(Debug)]
pub(crate) struct UnitEntry {
    pub signature: Hash160,
    pub root: Option<StreamReference>,
}

/// Block-structured writer over a scratch buffer.
///
/// At most one data unit and one block are open at a time. Every block is
/// opened exactly once and belongs to the unit that was open at that moment.
#[derive(Debug)]
pub struct DataStream {
    pub(crate) platform: Platform,
    pub(crate) endian: Endian,
    pub(crate) pointer_mode: PointerMode,
    pub(crate) scratch: Vec<u8>,
    pub(crate) blocks: Vec<DataBlock>,
    pub(crate) lookup: HashMap<StreamReference, usize>,
    /// Marked references per data unit.
    pub(crate) markers: HashSet<(usize, StreamReference)>,
    pub(crate) current: Option<usize>,
    pub(crate) units: Vec<UnitEntry>,
    pub(crate) unit_lookup: HashMap<Hash160, usize>,
    pub(crate) open_unit: Option<usize>,
}

impl DataStream {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            endian: platform.endian(),
            pointer_mode: PointerMode::default(),
            scratch: Vec::new(),
            blocks: Vec::new(),
            lookup: HashMap::new(),
            markers: HashSet::new(),
            current: None,
            units: Vec::new(),
            unit_lookup: HashMap::new(),
            open_unit: None,
        }
    }

    /// Set the encoding used by [`DataStream::write_block_reference`].
    pub fn with_pointer_mode(mut self, mode: PointerMode) -> Self {
        self.pointer_mode = mode;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn is_block_open(&self) -> bool {
        self.current.is_some()
    }

    // Data units

    /// Index of the unit with this signature, registering it on first use.
    pub fn data_unit_index(&mut self, signature: Hash160) -> usize {
        if let Some(&index) = self.unit_lookup.get(&signature) {
            return index;
        }
        let index = self.units.len();
        self.units.push(UnitEntry {
            signature,
            root: None,
        });
        self.unit_lookup.insert(signature, index);
        index
    }

    pub fn open_data_unit(&mut self, index: usize) {
        self.ensure_no_open_unit();
        self.ensure_unit(index);
        self.open_unit = Some(index);
    }

    pub fn close_data_unit(&mut self) {
        self.ensure_no_open_block();
        self.ensure_open_unit();
        self.open_unit = None;
    }

    /// Record the block a loader should start reading the open unit from.
    pub fn set_unit_root(&mut self, reference: StreamReference) {
        let unit = self.ensure_open_unit();
        self.units[unit].root = Some(reference);
    }

    // Blocks

    /// Register a block; its content is written later via [`DataStream::open_block`].
    pub fn new_block(&mut self, alignment: u32) -> StreamReference {
        self.register_block(alignment, None)
    }

    /// Register a block whose content must not exceed `size` bytes.
    pub fn new_sized_block(&mut self, alignment: u32, size: u32) -> StreamReference {
        self.register_block(alignment, Some(size))
    }

    fn register_block(&mut self, alignment: u32, size: Option<u32>) -> StreamReference {
        self.ensure_power_of_two(alignment);
        let reference = StreamReference::allocate();
        self.lookup.insert(reference, self.blocks.len());
        self.blocks.push(DataBlock::new(reference, alignment, size));
        reference
    }

    pub fn open_block(&mut self, reference: StreamReference) {
        self.ensure_no_open_block();
        let unit = self.ensure_open_unit();
        let index = self.ensure_block(reference);
        let block = &mut self.blocks[index];
        if block.state != BlockState::Unopened {
            panic!("DataStream: block {reference} opened twice");
        }
        block.state = BlockState::Open;
        block.unit = Some(unit);
        block.offset = self.scratch.len() as u32;
        self.current = Some(index);
    }

    /// Close the open block, padding the scratch buffer to its alignment.
    pub fn close_block(&mut self) {
        let index = self.ensure_open_block();
        let end = self.scratch.len() as u32;
        let block = &mut self.blocks[index];
        block.size = end - block.offset;
        block.state = BlockState::Closed;
        let padded = align_up(block.size, block.alignment);
        self.scratch.resize((block.offset + padded) as usize, 0);
        self.current = None;
    }

    /// Offset of the write cursor from the start of the open block.
    pub fn position(&self) -> u32 {
        let index = self.ensure_open_block();
        self.scratch.len() as u32 - self.blocks[index].offset
    }

    /// Pad with zeros up to a multiple of `alignment`.
    pub fn align(&mut self, alignment: u32) {
        let pos = self.position();
        let padded = align_up(pos, alignment);
        if padded > pos {
            self.write_raw(&vec![0u8; (padded - pos) as usize]);
        }
    }

    // Scalars

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_scalar(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_scalar(&[value as u8]);
    }

    scalar_writes! {
        write_u16, align_write_u16, u16, u16_bytes;
        write_i16, align_write_i16, i16, i16_bytes;
        write_u32, align_write_u32, u32, u32_bytes;
        write_i32, align_write_i32, i32, i32_bytes;
        write_u64, align_write_u64, u64, u64_bytes;
        write_i64, align_write_i64, i64, i64_bytes;
        write_f32, align_write_f32, f32, f32_bytes;
        write_f64, align_write_f64, f64, f64_bytes;
    }

    /// Unaligned raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_raw(bytes);
    }

    fn write_scalar(&mut self, bytes: &[u8]) {
        let index = self.ensure_open_block();
        self.ensure_aligned(index, bytes.len() as u32);
        self.write_raw(bytes);
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        let index = self.ensure_open_block();
        self.ensure_within_bounds(index, bytes.len() as u32);
        self.scratch.extend_from_slice(bytes);
    }

    // References

    /// Write a reference site using the stream's pointer mode.
    pub fn write_block_reference(&mut self, reference: StreamReference) {
        self.write_reference(reference, self.pointer_mode);
    }

    /// Write an 8-byte reference site, patched during finalize.
    pub fn write_reference(&mut self, reference: StreamReference, mode: PointerMode) {
        self.align(8);
        let index = self.ensure_open_block();
        let offset = self.position();
        self.blocks[index]
            .pointers
            .entry(reference)
            .or_default()
            .push(PointerSite { offset, mode });
        self.write_i64(reference.id() as i64);
    }

    /// Write an 8-byte null reference. It is not patched.
    pub fn write_null_reference(&mut self) {
        self.align(8);
        self.write_u64(0);
    }

    /// `string_t` layout: reference, byte length, rune length.
    pub fn write_string(&mut self, reference: StreamReference, byte_len: u32, rune_len: u32) {
        self.write_block_reference(reference);
        self.write_u32(byte_len);
        self.write_u32(rune_len);
    }

    /// `dataunit_t` layout: container index, entry index.
    pub fn write_file_id(&mut self, container: u32, entry: u32) {
        self.align_write_u32(container);
        self.write_u32(entry);
    }

    /// Make `reference` resolve to the current position.
    ///
    /// A reference may be marked once per data unit, so shared targets such
    /// as strings can be repeated in every unit that uses them.
    pub fn mark(&mut self, reference: StreamReference) {
        let index = self.ensure_open_block();
        let unit = self.ensure_open_unit();
        self.ensure_unmarked(unit, reference);
        let offset = self.position();
        self.blocks[index].markers.insert(reference, offset);
        self.markers.insert((unit, reference));
    }
}
