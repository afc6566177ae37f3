//! Gamedata compiler: turns reflected object graphs into packed binary data
//! and the C++ structs that read it.
//!
//! # Example
//!
//! ```
//! use gamedata_compiler::{Config, DataUnit, Object, SignatureDatabase, Ty, compile};
//!
//! let root = Object::new("Game.Hero")
//!     .with("m_level", Ty::Int32, 7)
//!     .with("m_name", Ty::String, "hero");
//! let unit = DataUnit::new("Heroes/Main", root);
//!
//! let compiled = compile(&unit, &SignatureDatabase::new(), &Config::new()).unwrap();
//! assert!(compiled.code.contains("struct hero_t"));
//! assert_eq!(compiled.data.units.len(), 1);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod codegen;
pub mod config;
pub mod emit;
mod invariants;
pub mod meta;
pub mod pipeline;
pub mod reflect;
pub mod signature_db;
pub mod stream;
pub mod string_table;

#[cfg(test)]
mod test_utils;

pub use codegen::cpp::CodegenError;
pub use config::{Config, FieldOrder, UnknownFieldPolicy};
pub use emit::{DataWriter, EmitError};
pub use meta::{MemberValue, MetaCode};
pub use pipeline::{Compiled, Compiler, compile};
pub use reflect::{
    DataUnit, DefaultClassifier, EnumDef, Object, OpaqueStruct, ReflectError, Ty, TypeClassifier,
    Value,
};
pub use signature_db::{FileId, SignatureDatabase, SignatureError, SignatureLookup};
pub use stream::{DataStream, DataUnitInfo, FinalizedStream, StreamError, StreamReference};
pub use string_table::StringTable;

/// Errors from a compiler run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
