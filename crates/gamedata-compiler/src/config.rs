//! Compiler configuration.

use gamedata_format::{Platform, PointerMode};

use crate::codegen::cpp;

/// What to do with a field whose type no classifier recognizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Leave the field out and log a warning.
    #[default]
    Skip,
    /// Abort with [`ReflectError::UnsupportedType`](crate::reflect::ReflectError::UnsupportedType).
    Fail,
}

/// Order in which an object's fields become members.
///
/// The layout solver reorders members afterwards; this only decides the
/// tie-break among members of equal alignment, kind and name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldOrder {
    #[default]
    Declaration,
    /// Stable sort by declared type name.
    TypeName,
}

/// Configuration for one compiler run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Target platform; decides byte order
    pub(crate) platform: Platform,
    /// Encoding of pointer sites
    pub(crate) pointer_mode: PointerMode,
    pub(crate) unknown_fields: UnknownFieldPolicy,
    pub(crate) field_order: FieldOrder,
    /// Prefix stripped from field names
    pub(crate) member_prefix: String,
    pub(crate) codegen: cpp::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            pointer_mode: PointerMode::default(),
            unknown_fields: UnknownFieldPolicy::default(),
            field_order: FieldOrder::default(),
            member_prefix: "m_".to_owned(),
            codegen: cpp::Config::default(),
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target platform.
    pub fn platform(mut self, value: Platform) -> Self {
        self.platform = value;
        self
    }

    /// Set how pointer sites are encoded.
    pub fn pointer_mode(mut self, value: PointerMode) -> Self {
        self.pointer_mode = value;
        self
    }

    /// Set the policy for fields of unsupported types.
    pub fn unknown_fields(mut self, value: UnknownFieldPolicy) -> Self {
        self.unknown_fields = value;
        self
    }

    /// Set the field enumeration order.
    pub fn field_order(mut self, value: FieldOrder) -> Self {
        self.field_order = value;
        self
    }

    /// Set the prefix stripped from field names.
    pub fn member_prefix(mut self, value: impl Into<String>) -> Self {
        self.member_prefix = value.into();
        self
    }

    /// Set the C++ generator configuration.
    pub fn codegen(mut self, value: cpp::Config) -> Self {
        self.codegen = value;
        self
    }
}
