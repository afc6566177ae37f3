#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the gamedata crates.
//!
//! - [`Hash160`]: 160-bit content hash used for block dedup and data-unit signatures
//! - [`Interner`]: member and type name interning
//! - [`utils`]: naming helpers for generated code

mod hash;
mod interner;
pub mod utils;

#[cfg(test)]
mod utils_tests;

pub use hash::{Hash160, Hasher160};
pub use interner::{Interner, Symbol};
