//! Pointer sites and the load-time pointer-patch chain.
//!
//! A chained site occupies 8 bytes: `{next: i32, target: i32}`, both deltas
//! relative to the site itself. `next` links to the following site and is
//! zero for the last one. A loader walks the chain from the unit header and
//! replaces each site with `base + site + target`.

use crate::Endian;

/// Size of every pointer slot.
pub const POINTER_SIZE: u32 = 8;

/// How reference sites are encoded in the output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum PointerMode {
    /// Linked `{next, target}` deltas, patched by the loader.
    #[default]
    Chained = 0,
    /// `u64` offset of the target from the unit start.
    Absolute = 1,
    /// `i64` delta from the site to the target.
    Relative = 2,
}

impl PointerMode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Chained),
            1 => Some(Self::Absolute),
            2 => Some(Self::Relative),
            _ => None,
        }
    }
}

/// A resolved pointer site: both positions are offsets from the unit start.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct StreamPointer {
    pub position: u32,
    pub target: u32,
}

impl StreamPointer {
    pub fn new(position: u32, target: u32) -> Self {
        Self { position, target }
    }

    /// Signed distance from the site to its target.
    pub fn target_delta(&self) -> i64 {
        self.target as i64 - self.position as i64
    }

    /// Chained encoding; `next` is the position of the following site.
    ///
    /// Returns `None` when either delta does not fit in an `i32`.
    pub fn encode_chained(&self, next: Option<u32>, endian: Endian) -> Option<[u8; 8]> {
        let next_delta = next.map_or(0, |n| n as i64 - self.position as i64);
        let next_delta = i32::try_from(next_delta).ok()?;
        let target_delta = i32::try_from(self.target_delta()).ok()?;
        let mut out = [0u8; 8];
        out[0..4].copy_from_slice(&endian.i32_bytes(next_delta));
        out[4..8].copy_from_slice(&endian.i32_bytes(target_delta));
        Some(out)
    }

    pub fn encode_absolute(&self, endian: Endian) -> [u8; 8] {
        endian.u64_bytes(self.target as u64)
    }

    pub fn encode_relative(&self, endian: Endian) -> [u8; 8] {
        endian.i64_bytes(self.target_delta())
    }
}

/// Walks a chained pointer list inside a unit.
///
/// Stops after `count` entries even if the chain claims to continue, and on
/// any entry that would leave the unit.
pub struct PointerChain<'a> {
    unit: &'a [u8],
    endian: Endian,
    next: Option<u32>,
    remaining: u32,
}

impl<'a> PointerChain<'a> {
    pub fn new(unit: &'a [u8], endian: Endian, head: Option<u32>, count: u32) -> Self {
        Self {
            unit,
            endian,
            next: head,
            remaining: count,
        }
    }
}

impl Iterator for PointerChain<'_> {
    type Item = StreamPointer;

    fn next(&mut self) -> Option<StreamPointer> {
        if self.remaining == 0 {
            return None;
        }
        let position = self.next.take()?;
        let start = position as usize;
        let site = self.unit.get(start..start + POINTER_SIZE as usize)?;
        let next_delta = self.endian.read_i32(&site[0..4]);
        let target_delta = self.endian.read_i32(&site[4..8]);

        self.remaining -= 1;
        if next_delta != 0 {
            self.next = u32::try_from(position as i64 + next_delta as i64).ok();
        }
        let target = u32::try_from(position as i64 + target_delta as i64).ok()?;
        Some(StreamPointer { position, target })
    }
}
