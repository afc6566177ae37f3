//! C++ reader generation.
//!
//! Emits enum declarations, forward declarations, opaque struct code and one
//! struct per class type. Fields follow the laid-out member order, so the
//! generated structs read the blob the data writer produced.

mod config;
mod emitter;
mod error;
mod render;

#[cfg(test)]
mod emitter_tests;

pub use config::Config;
pub use emitter::Emitter;
pub use error::CodegenError;

use crate::meta::MetaCode;

/// Generate C++ declarations for a laid-out model.
pub fn emit(code: &MetaCode, config: &Config) -> Result<String, CodegenError> {
    Emitter::new(code, config.clone()).emit()
}
