//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;

use gamedata_core::Hash160;
use gamedata_format::MetaKind;

use crate::meta::MetaCode;
use crate::stream::{BlockState, DataStream, StreamReference};

impl DataStream {
    pub(crate) fn ensure_open_block(&self) -> usize {
        self.current
            .unwrap_or_else(|| panic!("DataStream: no open block"))
    }

    pub(crate) fn ensure_no_open_block(&self) {
        if let Some(index) = self.current {
            panic!(
                "DataStream: block {} is still open",
                self.blocks[index].reference
            );
        }
    }

    pub(crate) fn ensure_open_unit(&self) -> usize {
        self.open_unit
            .unwrap_or_else(|| panic!("DataStream: no open data unit"))
    }

    pub(crate) fn ensure_no_open_unit(&self) {
        if let Some(unit) = self.open_unit {
            panic!("DataStream: data unit {unit} is still open");
        }
    }

    pub(crate) fn ensure_unit(&self, index: usize) {
        assert!(
            index < self.units.len(),
            "DataStream: unknown data unit {index}"
        );
    }

    pub(crate) fn ensure_block(&self, reference: StreamReference) -> usize {
        *self
            .lookup
            .get(&reference)
            .unwrap_or_else(|| panic!("DataStream: {reference} does not name a block"))
    }

    pub(crate) fn ensure_power_of_two(&self, alignment: u32) {
        assert!(
            alignment.is_power_of_two(),
            "DataStream: block alignment {alignment} is not a power of two"
        );
    }

    pub(crate) fn ensure_aligned(&self, index: usize, size: u32) {
        let block = &self.blocks[index];
        let pos = self.scratch.len() as u32 - block.offset;
        if size > 1 && pos % size != 0 {
            panic!(
                "DataStream: misaligned {size}-byte write at offset {pos} of block {}",
                block.reference
            );
        }
    }

    pub(crate) fn ensure_within_bounds(&self, index: usize, len: u32) {
        let block = &self.blocks[index];
        let Some(limit) = block.declared_size else {
            return;
        };
        let end = self.scratch.len() as u32 - block.offset + len;
        if end > limit {
            panic!(
                "DataStream: write of {len} bytes overruns block {} ({end} > {limit})",
                block.reference
            );
        }
    }

    pub(crate) fn ensure_unmarked(&self, unit: usize, reference: StreamReference) {
        if self.lookup.contains_key(&reference) || self.markers.contains(&(unit, reference)) {
            panic!("DataStream: {reference} already has a target");
        }
    }

    pub(crate) fn ensure_finished(&self) {
        self.ensure_no_open_block();
        self.ensure_no_open_unit();
        for block in &self.blocks {
            if block.state != BlockState::Closed {
                panic!(
                    "DataStream: block {} was registered but never written",
                    block.reference
                );
            }
        }
    }

    pub(crate) fn ensure_target(
        &self,
        offsets: &HashMap<StreamReference, u32>,
        reference: StreamReference,
    ) -> u32 {
        *offsets
            .get(&reference)
            .unwrap_or_else(|| panic!("DataStream: dangling reference {reference} at patch time"))
    }
}

impl MetaCode {
    pub(crate) fn ensure_enum(&self, i: usize) -> MetaKind {
        self.value(i)
            .as_enum()
            .map(|(def, _)| def.underlying())
            .unwrap_or_else(|| {
                panic!(
                    "MetaCode: enum member {} ({}) carries no value",
                    i,
                    self.name(i)
                )
            })
    }

    pub(crate) fn ensure_start(&self, i: usize) -> usize {
        self.start(i).unwrap_or_else(|| {
            panic!(
                "MetaCode: member {} ({}, {:?}) has no sub-range",
                i,
                self.name(i),
                self.kind(i)
            )
        })
    }

    pub(crate) fn ensure_type_name(&self, i: usize) -> &str {
        self.type_name(i).unwrap_or_else(|| {
            panic!(
                "MetaCode: member {} ({}, {:?}) has no type name",
                i,
                self.name(i),
                self.kind(i)
            )
        })
    }

    pub(crate) fn ensure_data_unit(&self, i: usize) -> Hash160 {
        self.value(i)
            .as_data_unit()
            .unwrap_or_else(|| panic!("MetaCode: member {i} is not a present data unit"))
    }

    pub(crate) fn unexpected_member(&self, i: usize, context: &str) -> ! {
        panic!(
            "MetaCode: member {} ({}, {:?}) cannot be written as {}",
            i,
            self.name(i),
            self.kind(i),
            context
        )
    }
}
