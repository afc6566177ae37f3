//! Errors raised while walking an object graph.

/// A schema or value the walker cannot turn into members.
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error("field `{field}` has unsupported type `{ty}`")]
    UnsupportedType { field: String, ty: String },

    #[error("field `{field}`: expected `{expected}`, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("collection `{field}` mixes `{first}` and `{other}` elements")]
    HeterogeneousElements {
        field: String,
        first: String,
        other: String,
    },

    #[error("struct field `{field}` has no value")]
    NullStruct { field: String },

    #[error("empty collection `{field}` has no element type")]
    UntypedEmptyCollection { field: String },
}
