//! Container layout.
//!
//! ```text
//! Header (32 bytes)
//! UnitRecord[unit_count] (16 bytes each)
//! per data unit, aligned to at least UNIT_ALIGN:
//!     UnitHeader (16 bytes)
//!     string block, then data blocks
//! ```
//!
//! Every multi-byte field, headers included, uses the byte order recorded in
//! the header's endian marker.

use crate::{Endian, FormatError, PointerChain, PointerMode};

pub const MAGIC: [u8; 4] = *b"GDAT";
pub const VERSION: u32 = 1;

pub const HEADER_SIZE: usize = 32;
pub const UNIT_RECORD_SIZE: usize = 16;
pub const UNIT_HEADER_SIZE: usize = 16;

/// Minimum alignment of each data unit within the container.
pub const UNIT_ALIGN: u32 = 16;

/// `pointer_head` value of a unit without chained sites.
pub const NO_POINTERS: u32 = u32::MAX;
/// `root_offset` value of a unit without blocks.
pub const NO_ROOT: u32 = u32::MAX;

/// Round up to the next multiple of `align` (a power of two, or 0/1 for none).
pub fn align_up(value: u32, align: u32) -> u32 {
    if align <= 1 {
        return value;
    }
    (value + align - 1) & !(align - 1)
}

/// Container header - first 32 bytes of the file.
///
/// - 0-7: magic, endian marker, pointer mode, reserved
/// - 8-23: version, checksum, total size, unit count
/// - 24-31: reserved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub endian: Endian,
    pub pointer_mode: PointerMode,
    pub version: u32,
    /// CRC32 of everything after the header.
    pub checksum: u32,
    pub total_size: u32,
    pub unit_count: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            endian: Endian::Little,
            pointer_mode: PointerMode::Chained,
            version: VERSION,
            checksum: 0,
            total_size: 0,
            unit_count: 0,
        }
    }
}

impl Header {
    /// Decode a header from the first 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::Truncated {
                needed: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let endian = Endian::from_u8(bytes[4]).ok_or(FormatError::InvalidEndian(bytes[4]))?;
        let pointer_mode =
            PointerMode::from_u8(bytes[5]).ok_or(FormatError::InvalidPointerMode(bytes[5]))?;

        Ok(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            endian,
            pointer_mode,
            version: endian.read_u32(&bytes[8..12]),
            checksum: endian.read_u32(&bytes[12..16]),
            total_size: endian.read_u32(&bytes[16..20]),
            unit_count: endian.read_u32(&bytes[20..24]),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let e = self.endian;
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = e as u8;
        bytes[5] = self.pointer_mode as u8;
        bytes[8..12].copy_from_slice(&e.u32_bytes(self.version));
        bytes[12..16].copy_from_slice(&e.u32_bytes(self.checksum));
        bytes[16..20].copy_from_slice(&e.u32_bytes(self.total_size));
        bytes[20..24].copy_from_slice(&e.u32_bytes(self.unit_count));
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }

    /// Offset of the first byte after the unit record table.
    pub fn records_end(&self) -> usize {
        HEADER_SIZE + self.unit_count as usize * UNIT_RECORD_SIZE
    }
}

/// Entry of the data-unit record table.
///
/// `file_placeholder` is zero in the compiler output; a packer may
/// overwrite it with a runtime file handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitRecord {
    pub file_placeholder: u64,
    pub offset: u32,
    pub size: u32,
}

impl UnitRecord {
    pub fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
        Self {
            file_placeholder: endian.read_u64(&bytes[0..8]),
            offset: endian.read_u32(&bytes[8..12]),
            size: endian.read_u32(&bytes[12..16]),
        }
    }

    pub fn to_bytes(&self, endian: Endian) -> [u8; UNIT_RECORD_SIZE] {
        let mut bytes = [0u8; UNIT_RECORD_SIZE];
        bytes[0..8].copy_from_slice(&endian.u64_bytes(self.file_placeholder));
        bytes[8..12].copy_from_slice(&endian.u32_bytes(self.offset));
        bytes[12..16].copy_from_slice(&endian.u32_bytes(self.size));
        bytes
    }
}

/// Header at the start of every data unit. Offsets are unit-relative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitHeader {
    /// First chained pointer site, or [`NO_POINTERS`].
    pub pointer_head: u32,
    pub pointer_count: u32,
    /// Offset of the unit's root block, or [`NO_ROOT`].
    pub root_offset: u32,
}

impl Default for UnitHeader {
    fn default() -> Self {
        Self {
            pointer_head: NO_POINTERS,
            pointer_count: 0,
            root_offset: NO_ROOT,
        }
    }
}

impl UnitHeader {
    pub fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
        Self {
            pointer_head: endian.read_u32(&bytes[0..4]),
            pointer_count: endian.read_u32(&bytes[4..8]),
            root_offset: endian.read_u32(&bytes[8..12]),
        }
    }

    pub fn to_bytes(&self, endian: Endian) -> [u8; UNIT_HEADER_SIZE] {
        let mut bytes = [0u8; UNIT_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&endian.u32_bytes(self.pointer_head));
        bytes[4..8].copy_from_slice(&endian.u32_bytes(self.pointer_count));
        bytes[8..12].copy_from_slice(&endian.u32_bytes(self.root_offset));
        bytes
    }
}

/// Read-only, validated view over a container.
#[derive(Clone, Copy, Debug)]
pub struct Container<'a> {
    bytes: &'a [u8],
    header: Header,
}

impl<'a> Container<'a> {
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, FormatError> {
        let header = Header::from_bytes(bytes)?;
        if !header.validate_magic() {
            return Err(FormatError::BadMagic);
        }
        if !header.validate_version() {
            return Err(FormatError::UnsupportedVersion(header.version));
        }
        if header.total_size as usize != bytes.len() {
            return Err(FormatError::SizeMismatch {
                expected: header.total_size,
                actual: bytes.len(),
            });
        }
        let actual = crc32fast::hash(&bytes[HEADER_SIZE..]);
        if actual != header.checksum {
            return Err(FormatError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }
        if header.records_end() > bytes.len() {
            return Err(FormatError::Truncated {
                needed: header.records_end(),
                actual: bytes.len(),
            });
        }

        let container = Self { bytes, header };
        for index in 0..container.unit_count() {
            let record = container.record(index);
            let end = record.offset as usize + record.size as usize;
            if end > bytes.len() || (record.size as usize) < UNIT_HEADER_SIZE {
                return Err(FormatError::UnitOutOfBounds { index });
            }
        }
        Ok(container)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn endian(&self) -> Endian {
        self.header.endian
    }

    pub fn unit_count(&self) -> usize {
        self.header.unit_count as usize
    }

    fn record(&self, index: usize) -> UnitRecord {
        let start = HEADER_SIZE + index * UNIT_RECORD_SIZE;
        UnitRecord::from_bytes(&self.bytes[start..start + UNIT_RECORD_SIZE], self.endian())
    }

    pub fn unit(&self, index: usize) -> Option<UnitView<'a>> {
        if index >= self.unit_count() {
            return None;
        }
        let record = self.record(index);
        let start = record.offset as usize;
        let bytes = &self.bytes[start..start + record.size as usize];
        Some(UnitView {
            bytes,
            record,
            header: UnitHeader::from_bytes(bytes, self.endian()),
            endian: self.endian(),
            pointer_mode: self.header.pointer_mode,
        })
    }

    pub fn units(&self) -> impl Iterator<Item = UnitView<'a>> + use<'a> {
        let container = *self;
        (0..self.unit_count()).filter_map(move |i| container.unit(i))
    }
}

/// One data unit inside a [`Container`].
#[derive(Clone, Copy, Debug)]
pub struct UnitView<'a> {
    bytes: &'a [u8],
    record: UnitRecord,
    header: UnitHeader,
    endian: Endian,
    pointer_mode: PointerMode,
}

impl<'a> UnitView<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn record(&self) -> &UnitRecord {
        &self.record
    }

    pub fn header(&self) -> &UnitHeader {
        &self.header
    }

    pub fn root_offset(&self) -> Option<u32> {
        (self.header.root_offset != NO_ROOT).then_some(self.header.root_offset)
    }

    /// Chained pointer sites in link order.
    pub fn pointers(&self) -> PointerChain<'a> {
        let head = (self.header.pointer_head != NO_POINTERS).then_some(self.header.pointer_head);
        PointerChain::new(self.bytes, self.endian, head, self.header.pointer_count)
    }

    /// Target of the reference stored at `site`, decoded per the container's
    /// pointer mode. Returns `None` for a null reference.
    pub fn resolve(&self, site: u32) -> Option<u32> {
        let at = site as usize;
        let slot = self.bytes.get(at..at + 8)?;
        match self.pointer_mode {
            PointerMode::Absolute => {
                let target = self.endian.read_u64(slot);
                (target != 0).then_some(target as u32)
            }
            PointerMode::Relative => {
                let delta = self.endian.read_i64(slot);
                (delta != 0).then(|| (site as i64 + delta) as u32)
            }
            PointerMode::Chained => {
                if slot.iter().all(|&b| b == 0) {
                    return None;
                }
                let delta = self.endian.read_i32(&slot[4..8]);
                Some((site as i64 + delta as i64) as u32)
            }
        }
    }

    /// # Panics
    /// Panics if the value extends past the unit, as do the other
    /// fixed-width readers. [`Self::read_cstr`] and [`Self::resolve`] are
    /// checked.
    pub fn read_u8(&self, at: u32) -> u8 {
        self.slot(at, 1)[0]
    }

    pub fn read_u32(&self, at: u32) -> u32 {
        self.endian.read_u32(self.slot(at, 4))
    }

    pub fn read_i32(&self, at: u32) -> i32 {
        self.endian.read_i32(self.slot(at, 4))
    }

    pub fn read_u64(&self, at: u32) -> u64 {
        self.endian.read_u64(self.slot(at, 8))
    }

    pub fn read_f32(&self, at: u32) -> f32 {
        self.endian.read_f32(self.slot(at, 4))
    }

    fn slot(&self, at: u32, len: usize) -> &'a [u8] {
        let start = at as usize;
        self.bytes.get(start..start + len).unwrap_or_else(|| {
            panic!(
                "read of {len} bytes at {at} is outside the unit ({} bytes)",
                self.bytes.len()
            )
        })
    }

    /// NUL-terminated UTF-8 string starting at `at`.
    pub fn read_cstr(&self, at: u32) -> Option<&'a str> {
        let tail = self.bytes.get(at as usize..)?;
        let len = tail.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&tail[..len]).ok()
    }
}
