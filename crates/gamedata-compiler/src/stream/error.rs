/// Errors raised while finalizing a data stream.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("data unit {unit} exceeds the 32-bit offset range")]
    UnitTooLarge { unit: usize },

    #[error("container exceeds the 32-bit offset range")]
    ContainerTooLarge,

    #[error("pointer site at {position} cannot reach target {target} with a 32-bit delta")]
    DeltaOverflow { position: u32, target: u32 },
}
