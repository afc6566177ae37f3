/// Errors raised while reading a container.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("container truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("invalid magic bytes")]
    BadMagic,

    #[error("unsupported container version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid endian marker {0}")]
    InvalidEndian(u8),

    #[error("invalid pointer mode {0}")]
    InvalidPointerMode(u8),

    #[error("size mismatch: header says {expected} bytes, got {actual}")]
    SizeMismatch { expected: u32, actual: usize },

    #[error("checksum mismatch: expected {expected:08x}, computed {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("data unit {index} lies outside the container")]
    UnitOutOfBounds { index: usize },
}
