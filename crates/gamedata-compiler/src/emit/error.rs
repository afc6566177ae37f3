use crate::stream::StreamError;

/// Errors raised while writing or finalizing data.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("member {row} is not a data unit")]
    InvalidRoot { row: usize },

    #[error("struct `{name}` wrote {written} bytes, declared {declared}")]
    StructSize {
        name: String,
        declared: u32,
        written: u32,
    },

    #[error(transparent)]
    Stream(#[from] StreamError),
}
