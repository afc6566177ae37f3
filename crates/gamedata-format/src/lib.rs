#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Binary container format and meta kinds for gamedata.
//!
//! This crate contains:
//! - The closed table of member kinds with size, alignment and C++ names
//! - Target platform descriptors and endian-aware scalar encoding
//! - The container layout (file header, data-unit records, unit headers)
//! - Pointer-patch chain encoding and a read-only container view

mod container;
mod error;
mod kind;
mod platform;
mod pointer;

#[cfg(test)]
mod kind_tests;

pub use container::{
    Container, Header, UnitHeader, UnitRecord, UnitView, HEADER_SIZE, MAGIC, NO_POINTERS,
    NO_ROOT, UNIT_ALIGN, UNIT_HEADER_SIZE, UNIT_RECORD_SIZE, VERSION, align_up,
};
pub use error::FormatError;
pub use kind::MetaKind;
pub use platform::{Endian, Platform};
pub use pointer::{PointerChain, PointerMode, StreamPointer, POINTER_SIZE};
