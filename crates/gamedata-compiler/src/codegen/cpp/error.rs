/// Errors from C++ generation.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// Definitions embed each other, directly or transitively.
    #[error("no valid ordering exists for types: {}", .types.join(", "))]
    DependencyCycle { types: Vec<String> },
}
