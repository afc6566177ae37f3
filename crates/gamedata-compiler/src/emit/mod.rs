//! Data writer: serializes sorted meta-code into a data stream.

mod data_writer;
mod error;


pub use data_writer::DataWriter;
pub use error::EmitError;
