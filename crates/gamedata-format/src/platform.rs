//! Target platforms and endian-aware scalar encoding.
//!
//! All supported targets use 64-bit pointer slots; they differ only in byte
//! order.

/// Byte order of every scalar written to the container.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum Endian {
    #[default]
    Little = 0,
    Big = 1,
}

macro_rules! endian_codec {
    ($($put:ident, $get:ident, $ty:ty, $n:literal;)*) => {
        $(
            #[inline]
            pub fn $put(self, value: $ty) -> [u8; $n] {
                match self {
                    Self::Little => value.to_le_bytes(),
                    Self::Big => value.to_be_bytes(),
                }
            }

            /// # Panics
            /// Panics if `bytes` is shorter than the value.
            #[inline]
            pub fn $get(self, bytes: &[u8]) -> $ty {
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&bytes[..$n]);
                match self {
                    Self::Little => <$ty>::from_le_bytes(raw),
                    Self::Big => <$ty>::from_be_bytes(raw),
                }
            }
        )*
    };
}

impl Endian {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Little),
            1 => Some(Self::Big),
            _ => None,
        }
    }

    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    endian_codec! {
        u16_bytes, read_u16, u16, 2;
        i16_bytes, read_i16, i16, 2;
        u32_bytes, read_u32, u32, 4;
        i32_bytes, read_i32, i32, 4;
        u64_bytes, read_u64, u64, 8;
        i64_bytes, read_i64, i64, 8;
        f32_bytes, read_f32, f32, 4;
        f64_bytes, read_f64, f64, 8;
    }
}

/// Build target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Platform {
    #[default]
    Win64,
    Mac,
    XboxOne,
    XboxSeriesX,
    Ps4,
    Ps5,
    NintendoSwitch,
    /// Generic big-endian 64-bit target.
    BigEndian64,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Self::Win64,
        Self::Mac,
        Self::XboxOne,
        Self::XboxSeriesX,
        Self::Ps4,
        Self::Ps5,
        Self::NintendoSwitch,
        Self::BigEndian64,
    ];

    pub fn endian(self) -> Endian {
        match self {
            Self::BigEndian64 => Endian::Big,
            _ => Endian::Little,
        }
    }

    /// Size of a pointer slot in bytes.
    pub fn pointer_size(self) -> u32 {
        8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Win64 => "win64",
            Self::Mac => "mac",
            Self::XboxOne => "xboxone",
            Self::XboxSeriesX => "xboxseriesx",
            Self::Ps4 => "ps4",
            Self::Ps5 => "ps5",
            Self::NintendoSwitch => "switch",
            Self::BigEndian64 => "be64",
        }
    }

    /// Parse a platform from its [`Platform::name`], case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}
