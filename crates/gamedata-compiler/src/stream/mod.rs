//! Binary data-stream writer.
//!
//! Values are written into blocks held in a scratch buffer. Blocks refer to
//! each other through [`StreamReference`] placeholders; [`DataStream::finalize`]
//! merges identical blocks, assigns final offsets and patches every reference.

mod block;
mod error;
mod finalize;
mod reference;
mod writer;

#[cfg(test)]
mod finalize_tests;

pub use error::StreamError;
pub use finalize::{DataUnitInfo, FinalizedStream};
pub use reference::StreamReference;
pub use writer::DataStream;

pub(crate) use block::{BlockState, DataBlock, PointerSite};
