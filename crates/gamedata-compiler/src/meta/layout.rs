//! Member sorting and layout derivation.
//!
//! Booleans of a class are folded into 32-bit bitsets, then every class's
//! fields are stably sorted by descending alignment, kind, and name. Sizes and
//! alignments derived here must agree byte for byte with the data writer.

use std::cmp::Ordering;

use gamedata_format::{MetaKind, align_up};
use tracing::debug;

use super::MetaCode;

/// Booleans folded into one bitset.
pub const BITSET_WIDTH: usize = 32;

impl MetaCode {
    /// Fold the boolean fields of `class` into bitsets.
    ///
    /// Booleans are moved, in order, behind the other fields. Each run of up
    /// to 32 is copied to a new tail range and replaced by one bitset whose
    /// bit `i` holds the `i`-th boolean of the run.
    pub fn combine_booleans(&mut self, class: usize) {
        let range = self.members(class);
        let start = range.start;
        let total = range.len();

        let (mut order, bools): (Vec<usize>, Vec<usize>) =
            range.partition(|&i| self.kind(i) != MetaKind::Bool);
        if bools.is_empty() {
            return;
        }
        let num_bools = bools.len();
        order.extend(bools);
        self.permute(start, &order);

        let end = start + total - num_bools;
        let groups = num_bools.div_ceil(BITSET_WIDTH);
        for group in 0..groups {
            let first = end + group * BITSET_WIDTH;
            let num_bits = BITSET_WIDTH.min(num_bools - group * BITSET_WIDTH);
            let name = self.name_symbol(first);

            let dup_start = self.len();
            let mut bits = 0u32;
            for bit in 0..num_bits {
                let row = first + bit;
                self.duplicate_member(row);
                if self.value(row).as_bool() == Some(true) {
                    bits |= 1 << bit;
                }
            }
            self.set_bitset(end + group, name, dup_start, num_bits, bits);
        }
        self.set_count(class, total - num_bools + groups);
    }

    /// Layout order of two members.
    pub fn compare_members(&self, a: usize, b: usize) -> Ordering {
        self.member_alignment(b)
            .cmp(&self.member_alignment(a))
            .then_with(|| self.kind(a).cmp(&self.kind(b)))
            .then_with(|| self.name(a).cmp(self.name(b)))
    }

    /// Stable bubble sort of the fields of `class`. Returns whether any
    /// rows moved.
    pub fn sort_members(&mut self, class: usize) -> bool {
        let range = self.members(class);
        if range.len() < 2 {
            return false;
        }
        let mut moved = false;
        loop {
            let mut swapped = false;
            for i in range.start..range.end - 1 {
                if self.compare_members(i, i + 1) == Ordering::Greater {
                    self.swap_members(i, i + 1);
                    swapped = true;
                }
            }
            if !swapped {
                return moved;
            }
            moved = true;
        }
    }

    /// Fold booleans and sort every class until a sorting pass changes
    /// nothing. Returns the number of sorting passes.
    ///
    /// Rows move during sorting, so classes are found by scanning the kind
    /// column in place. A class row always precedes its fields, and sorting
    /// only moves rows after the class being sorted.
    pub fn solve_layout(&mut self) -> usize {
        let mut i = 0;
        while i < self.len() {
            if self.kind(i) == MetaKind::Class {
                self.combine_booleans(i);
            }
            i += 1;
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for i in 0..self.len() {
                if self.kind(i) == MetaKind::Class {
                    changed |= self.sort_members(i);
                }
            }
            if !changed {
                break;
            }
        }
        debug!(members = self.len(), passes, "layout: solved");
        passes
    }

    /// Alignment of the member inline in its parent.
    pub fn member_alignment(&self, i: usize) -> u32 {
        match self.kind(i) {
            // Representatives of empty struct arrays carry no value.
            MetaKind::Struct => self.value(i).as_struct().map_or(1, |s| s.struct_align()),
            MetaKind::Enum => self.ensure_enum(i).alignment(),
            kind => kind.alignment(),
        }
    }

    /// Size of the member inline in its parent.
    pub fn member_size(&self, i: usize) -> u32 {
        match self.kind(i) {
            MetaKind::Struct => self.value(i).as_struct().map_or(0, |s| s.struct_size()),
            MetaKind::Enum => self.ensure_enum(i).size_in_bytes(),
            kind => kind.size_in_bytes(),
        }
    }

    /// Element rows of an array (`.0`) or key and value rows of a
    /// dictionary. Present even for empty containers, which keep one
    /// representative of each.
    pub fn element_rows(&self, i: usize) -> (Option<usize>, Option<usize>) {
        let Some(start) = self.start(i) else {
            return (None, None);
        };
        match self.kind(i) {
            MetaKind::Array => (Some(start), None),
            MetaKind::Dictionary => (Some(start), Some(start + self.count(i).max(1))),
            _ => (None, None),
        }
    }

    /// Alignment of the block holding the member's data.
    pub fn data_alignment(&self, i: usize) -> u32 {
        match self.kind(i) {
            MetaKind::Struct => self.member_alignment(i),
            MetaKind::Class => self
                .members(i)
                .map(|m| self.member_alignment(m))
                .max()
                .unwrap_or(1),
            MetaKind::Array | MetaKind::Dictionary => {
                let (first, second) = self.element_rows(i);
                first
                    .into_iter()
                    .chain(second)
                    .map(|m| self.member_alignment(m))
                    .max()
                    .unwrap_or(1)
            }
            MetaKind::String => 1,
            kind => kind.alignment().max(1),
        }
    }

    /// Size of the block holding the member's data: members laid out in
    /// order at their own alignment, the total aligned to the block.
    pub fn data_size(&self, i: usize) -> u32 {
        match self.kind(i) {
            MetaKind::Class | MetaKind::Array | MetaKind::Dictionary => {
                let extent = self.members(i).fold(0, |offset, m| {
                    align_up(offset, self.member_alignment(m)) + self.member_size(m)
                });
                align_up(extent, self.data_alignment(i))
            }
            MetaKind::String => self.count(i) as u32 + 1,
            _ => self.member_size(i),
        }
    }

    /// Offset of every member of `class` within its block.
    pub fn field_offsets(&self, class: usize) -> Vec<u32> {
        let mut offset = 0;
        self.members(class)
            .map(|m| {
                let at = align_up(offset, self.member_alignment(m));
                offset = at + self.member_size(m);
                at
            })
            .collect()
    }
}
