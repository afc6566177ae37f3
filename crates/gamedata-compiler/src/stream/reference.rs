use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_REFERENCE: AtomicU32 = AtomicU32::new(1);

/// Opaque handle naming a block or a marked position.
///
/// Handles are unique for the life of the process. They are dictionary keys
/// only; the numeric id never reaches the final output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamReference(u32);

impl StreamReference {
    pub const EMPTY: Self = Self(0);

    /// Allocate a fresh reference.
    pub fn allocate() -> Self {
        Self(NEXT_REFERENCE.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for StreamReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref#{}", self.0)
    }
}

impl fmt::Display for StreamReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref#{}", self.0)
    }
}
