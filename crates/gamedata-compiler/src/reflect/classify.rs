//! Type classification.
//!
//! The walker asks a [`TypeClassifier`] what each type is. The default
//! answers from the [`Ty`] variant; callers can plug in their own to map
//! foreign types onto kinds the compiler understands.

use gamedata_format::MetaKind;

use super::Ty;

/// Predicates deciding the kind of a type.
///
/// They are consulted in a fixed order (data unit, opaque struct,
/// dictionary, array, list, struct, class, string, bool, integers, floats,
/// enum) and the first match wins. The provided methods classify by [`Ty`]
/// variant; implementors override the ones they want to extend.
pub trait TypeClassifier {
    fn is_bool(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Bool)
    }

    fn is_int8(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Int8)
    }

    fn is_uint8(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::UInt8)
    }

    fn is_int16(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Int16)
    }

    fn is_uint16(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::UInt16)
    }

    fn is_int32(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Int32)
    }

    fn is_uint32(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::UInt32)
    }

    fn is_int64(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Int64)
    }

    fn is_uint64(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::UInt64)
    }

    fn is_float(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Float)
    }

    fn is_double(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Double)
    }

    fn is_string(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::String)
    }

    fn is_enum(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Enum(_))
    }

    /// Fixed-size array.
    fn is_array(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Array(_))
    }

    fn is_generic_list(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::List(_))
    }

    fn is_generic_dictionary(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Dictionary(..))
    }

    fn is_class(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Class(_))
    }

    /// Value type with fields.
    fn is_struct(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Struct(_))
    }

    /// Self-describing [`OpaqueStruct`](super::OpaqueStruct).
    fn is_istruct(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::Opaque(_))
    }

    fn is_data_unit(&self, ty: &Ty) -> bool {
        matches!(ty, Ty::DataUnit(_))
    }
}

/// Classifies by [`Ty`] variant. Foreign types are unsupported.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultClassifier;

impl TypeClassifier for DefaultClassifier {}

/// What the walker does with a value of some type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shape {
    Scalar(MetaKind),
    String,
    Enum,
    /// Opaque struct, written by the value itself.
    Opaque,
    /// Class or value struct: fields in a separate block.
    Class,
    Array,
    Dictionary,
    DataUnit,
}

pub(crate) fn classify(classifier: &dyn TypeClassifier, ty: &Ty) -> Option<Shape> {
    let c = classifier;
    let shape = if c.is_data_unit(ty) {
        Shape::DataUnit
    } else if c.is_istruct(ty) {
        Shape::Opaque
    } else if c.is_generic_dictionary(ty) {
        Shape::Dictionary
    } else if c.is_array(ty) || c.is_generic_list(ty) {
        Shape::Array
    } else if c.is_struct(ty) || c.is_class(ty) {
        Shape::Class
    } else if c.is_string(ty) {
        Shape::String
    } else if c.is_bool(ty) {
        Shape::Scalar(MetaKind::Bool)
    } else if c.is_int8(ty) {
        Shape::Scalar(MetaKind::Int8)
    } else if c.is_uint8(ty) {
        Shape::Scalar(MetaKind::UInt8)
    } else if c.is_int16(ty) {
        Shape::Scalar(MetaKind::Int16)
    } else if c.is_uint16(ty) {
        Shape::Scalar(MetaKind::UInt16)
    } else if c.is_int32(ty) {
        Shape::Scalar(MetaKind::Int32)
    } else if c.is_uint32(ty) {
        Shape::Scalar(MetaKind::UInt32)
    } else if c.is_int64(ty) {
        Shape::Scalar(MetaKind::Int64)
    } else if c.is_uint64(ty) {
        Shape::Scalar(MetaKind::UInt64)
    } else if c.is_float(ty) {
        Shape::Scalar(MetaKind::Float)
    } else if c.is_double(ty) {
        Shape::Scalar(MetaKind::Double)
    } else if c.is_enum(ty) {
        Shape::Enum
    } else {
        return None;
    };
    Some(shape)
}
