use std::sync::Arc;

use gamedata_core::Hash160;
use gamedata_format::MetaKind;

use crate::reflect::{EnumDef, OpaqueStruct};

/// Payload of a member row, tagged by its kind.
#[derive(Clone, Debug)]
pub enum MemberValue {
    /// Present container, class or string; the data lives in sub-members
    /// or the string table.
    Present,
    /// Absent class, string or data unit.
    Null,
    Bool(bool),
    BitSet(u32),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Enum(Arc<EnumDef>, i64),
    Struct(Arc<dyn OpaqueStruct>),
    DataUnit(Hash160),
}

impl MemberValue {
    /// Zero value of a scalar kind.
    pub fn zero(kind: MetaKind) -> Option<Self> {
        Some(match kind {
            MetaKind::Bool => Self::Bool(false),
            MetaKind::BitSet => Self::BitSet(0),
            MetaKind::Int8 => Self::Int8(0),
            MetaKind::UInt8 => Self::UInt8(0),
            MetaKind::Int16 => Self::Int16(0),
            MetaKind::UInt16 => Self::UInt16(0),
            MetaKind::Int32 => Self::Int32(0),
            MetaKind::UInt32 => Self::UInt32(0),
            MetaKind::Int64 => Self::Int64(0),
            MetaKind::UInt64 => Self::UInt64(0),
            MetaKind::Float => Self::Float(0.0),
            MetaKind::Double => Self::Double(0.0),
            _ => return None,
        })
    }

    /// Kind of a scalar payload.
    pub fn scalar_kind(&self) -> Option<MetaKind> {
        Some(match self {
            Self::Bool(_) => MetaKind::Bool,
            Self::BitSet(_) => MetaKind::BitSet,
            Self::Int8(_) => MetaKind::Int8,
            Self::UInt8(_) => MetaKind::UInt8,
            Self::Int16(_) => MetaKind::Int16,
            Self::UInt16(_) => MetaKind::UInt16,
            Self::Int32(_) => MetaKind::Int32,
            Self::UInt32(_) => MetaKind::UInt32,
            Self::Int64(_) => MetaKind::Int64,
            Self::UInt64(_) => MetaKind::UInt64,
            Self::Float(_) => MetaKind::Float,
            Self::Double(_) => MetaKind::Double,
            _ => return None,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bitset(&self) -> Option<u32> {
        match self {
            Self::BitSet(bits) => Some(*bits),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Arc<dyn OpaqueStruct>> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_data_unit(&self) -> Option<Hash160> {
        match self {
            Self::DataUnit(signature) => Some(*signature),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<(&Arc<EnumDef>, i64)> {
        match self {
            Self::Enum(def, v) => Some((def, *v)),
            _ => None,
        }
    }
}
