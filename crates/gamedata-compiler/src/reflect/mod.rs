//! Reflection: the input object model and the walker that turns it into
//! meta-code.

mod classify;
mod error;
mod value;
mod walker;


pub use classify::{DefaultClassifier, TypeClassifier};
pub(crate) use classify::{Shape, classify};
pub use error::ReflectError;
pub use value::{DataUnit, EnumDef, EnumVariant, Field, Object, OpaqueStruct, Ty, Value};
pub use walker::Reflector;
