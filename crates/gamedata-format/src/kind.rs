//! Member kinds.
//!
//! Every reflected value is classified into exactly one of these kinds. The
//! table below fixes each kind's size, alignment, signedness and C++ spelling.

/// Member kind, indexed into a static property table.
///
/// The discriminant doubles as the secondary sort key of the layout solver,
/// so the order is part of the data format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum MetaKind {
    Unknown = 0,
    Bool = 1,
    /// Up to 32 booleans folded into one `u32`.
    BitSet = 2,
    Int8 = 3,
    UInt8 = 4,
    Int16 = 5,
    UInt16 = 6,
    Int32 = 7,
    UInt32 = 8,
    Int64 = 9,
    UInt64 = 10,
    Float = 11,
    Double = 12,
    String = 13,
    /// Named integer enumeration. Size comes from the underlying kind.
    Enum = 14,
    /// Opaque self-describing value type. Size comes from the value.
    Struct = 15,
    /// Reference to a separately written block of fields.
    Class = 16,
    Array = 17,
    Dictionary = 18,
    /// Reference to another data unit by signature.
    DataUnit = 19,
}

struct Properties {
    size_in_bits: u32,
    alignment: u32,
    signed: bool,
    type_name: &'static str,
}

const fn props(size_in_bits: u32, alignment: u32, signed: bool, type_name: &'static str) -> Properties {
    Properties {
        size_in_bits,
        alignment,
        signed,
        type_name,
    }
}

static PROPERTIES: [Properties; MetaKind::COUNT] = [
    props(0, 1, false, "unknown"),
    props(8, 1, false, "bool"),
    props(32, 4, false, "u32"),
    props(8, 1, true, "s8"),
    props(8, 1, false, "u8"),
    props(16, 2, true, "s16"),
    props(16, 2, false, "u16"),
    props(32, 4, true, "s32"),
    props(32, 4, false, "u32"),
    props(64, 8, true, "s64"),
    props(64, 8, false, "u64"),
    props(32, 4, true, "f32"),
    props(64, 8, true, "f64"),
    props(128, 8, false, "string_t"),
    props(0, 0, false, "enum_t"),
    props(0, 0, false, "struct"),
    props(64, 8, false, "class"),
    props(128, 8, false, "array_t"),
    props(128, 8, false, "dict_t"),
    props(64, 4, false, "dataunit_t"),
];

impl MetaKind {
    pub const COUNT: usize = 20;

    pub const ALL: [MetaKind; Self::COUNT] = [
        Self::Unknown,
        Self::Bool,
        Self::BitSet,
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float,
        Self::Double,
        Self::String,
        Self::Enum,
        Self::Struct,
        Self::Class,
        Self::Array,
        Self::Dictionary,
        Self::DataUnit,
    ];

    /// Convert from raw discriminant.
    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    fn props(self) -> &'static Properties {
        &PROPERTIES[self.index()]
    }

    /// Size in bits. Zero for `Enum` and `Struct`, which size themselves.
    pub fn size_in_bits(self) -> u32 {
        self.props().size_in_bits
    }

    /// Size in bytes, rounded up from bits.
    pub fn size_in_bytes(self) -> u32 {
        (self.size_in_bits() + 7) >> 3
    }

    /// Required byte alignment. Zero for `Enum` and `Struct`.
    pub fn alignment(self) -> u32 {
        self.props().alignment
    }

    pub fn is_signed(self) -> bool {
        self.props().signed
    }

    /// Canonical C++ spelling.
    pub fn type_name(self) -> &'static str {
        self.props().type_name
    }

    /// Whether values of this kind are fixed-width numbers.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Float
                | Self::Double
        )
    }

    /// Whether this kind can back an enumeration.
    pub fn is_integer(self) -> bool {
        self.is_primitive() && !matches!(self, Self::Float | Self::Double)
    }

    /// Whether the member's data lives in a separate block behind a reference.
    pub fn is_referenced(self) -> bool {
        matches!(
            self,
            Self::String | Self::Class | Self::Array | Self::Dictionary
        )
    }

    /// Whether the member owns a contiguous sub-range of members.
    pub fn has_members(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Array | Self::Dictionary | Self::DataUnit
        )
    }
}
