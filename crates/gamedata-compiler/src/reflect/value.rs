//! Input object model.
//!
//! Rust has no runtime reflection, so callers describe their data with
//! [`Object`]s: each field carries its declared [`Ty`] and its runtime
//! [`Value`]. Collections and class references are classified by the runtime
//! value when present, falling back to the declared type.

use std::fmt;
use std::sync::Arc;

use gamedata_format::MetaKind;

use crate::stream::DataStream;

/// Declared type of a field or collection element.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    Enum(Arc<EnumDef>),
    /// Fixed-size array.
    Array(Box<Ty>),
    /// Growable list.
    List(Box<Ty>),
    Dictionary(Box<Ty>, Box<Ty>),
    /// Reference type with fields, named by its type.
    Class(String),
    /// Value type with fields; laid out like a class.
    Struct(String),
    /// Self-describing value written by an [`OpaqueStruct`].
    Opaque(String),
    /// Reference to another data unit whose root has the given type.
    DataUnit(String),
    Nullable(Box<Ty>),
    /// A type the compiler does not understand.
    Foreign(String),
}

impl Ty {
    pub fn array(element: Ty) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn list(element: Ty) -> Self {
        Self::List(Box::new(element))
    }

    pub fn dictionary(key: Ty, value: Ty) -> Self {
        Self::Dictionary(Box::new(key), Box::new(value))
    }

    pub fn nullable(inner: Ty) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// Element type of arrays and lists.
    pub fn element(&self) -> Option<&Ty> {
        match self {
            Self::Array(e) | Self::List(e) => Some(e),
            _ => None,
        }
    }

    /// Key and value types of dictionaries.
    pub fn entry(&self) -> Option<(&Ty, &Ty)> {
        match self {
            Self::Dictionary(k, v) => Some((k, v)),
            _ => None,
        }
    }

    /// Name used in diagnostics and for type-name field ordering.
    pub fn display_name(&self) -> String {
        match self {
            Self::Bool => "bool".into(),
            Self::Int8 => "i8".into(),
            Self::UInt8 => "u8".into(),
            Self::Int16 => "i16".into(),
            Self::UInt16 => "u16".into(),
            Self::Int32 => "i32".into(),
            Self::UInt32 => "u32".into(),
            Self::Int64 => "i64".into(),
            Self::UInt64 => "u64".into(),
            Self::Float => "f32".into(),
            Self::Double => "f64".into(),
            Self::String => "string".into(),
            Self::Enum(def) => def.name().into(),
            Self::Array(e) => format!("{}[]", e.display_name()),
            Self::List(e) => format!("List<{}>", e.display_name()),
            Self::Dictionary(k, v) => format!("Dictionary<{}, {}>", k.display_name(), v.display_name()),
            Self::Class(n) | Self::Struct(n) | Self::Opaque(n) | Self::Foreign(n) => n.clone(),
            Self::DataUnit(n) => format!("DataUnit<{n}>"),
            Self::Nullable(inner) => format!("{}?", inner.display_name()),
        }
    }
}

/// One named value of an enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

/// Enumeration definition with an integer underlying kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDef {
    name: String,
    underlying: MetaKind,
    variants: Vec<EnumVariant>,
}

impl EnumDef {
    /// # Panics
    /// Panics if `underlying` is not an integer kind.
    pub fn new(name: impl Into<String>, underlying: MetaKind) -> Self {
        assert!(
            underlying.is_integer(),
            "enum underlying kind must be an integer, got {underlying:?}"
        );
        Self {
            name: name.into(),
            underlying,
            variants: Vec::new(),
        }
    }

    pub fn variant(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push(EnumVariant {
            name: name.into(),
            value,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn underlying(&self) -> MetaKind {
        self.underlying
    }

    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }

    /// Value used when a nullable enum field is absent.
    pub fn default_value(&self) -> i64 {
        self.variants.first().map_or(0, |v| v.value)
    }
}

/// A value type that lays itself out.
///
/// The compiler treats it as an opaque leaf: it reserves `struct_size` bytes
/// aligned to `struct_align` and lets the value write them.
pub trait OpaqueStruct: fmt::Debug + Send + Sync {
    /// C++ type name.
    fn struct_name(&self) -> &str;
    fn struct_size(&self) -> u32;
    fn struct_align(&self) -> u32;

    /// Write exactly `struct_size` bytes at the current (aligned) position.
    fn struct_write(&self, stream: &mut DataStream);

    /// C++ definition lines emitted once per struct name.
    fn struct_code(&self) -> Vec<String> {
        Vec::new()
    }

    /// Other struct names this definition embeds by value.
    fn struct_dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}

/// An object with named, typed fields.
#[derive(Clone, Debug)]
pub struct Object {
    type_name: String,
    fields: Vec<Field>,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    pub value: Value,
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, ty: Ty, value: impl Into<Value>) -> Self {
        self.push(name, ty, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, ty: Ty, value: impl Into<Value>) {
        self.fields.push(Field {
            name: name.into(),
            ty,
            value: value.into(),
        });
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// A separately loadable unit of data, identified by its signature.
#[derive(Clone, Debug)]
pub struct DataUnit {
    signature: String,
    root: Object,
}

impl DataUnit {
    pub fn new(signature: impl Into<String>, root: Object) -> Self {
        Self {
            signature: signature.into(),
            root,
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn root(&self) -> &Object {
        &self.root
    }
}

/// Runtime value of a field or element.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
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
    String(String),
    Enum(Arc<EnumDef>, i64),
    /// Array or list items.
    Sequence(Vec<Value>),
    Dictionary(Vec<(Value, Value)>),
    Object(Object),
    Opaque(Arc<dyn OpaqueStruct>),
    DataUnit(Box<DataUnit>),
}

impl Value {
    /// Type implied by the value itself, if it carries one.
    ///
    /// Null and collections defer to the declared type.
    pub fn runtime_ty(&self) -> Option<Ty> {
        Some(match self {
            Self::Bool(_) => Ty::Bool,
            Self::Int8(_) => Ty::Int8,
            Self::UInt8(_) => Ty::UInt8,
            Self::Int16(_) => Ty::Int16,
            Self::UInt16(_) => Ty::UInt16,
            Self::Int32(_) => Ty::Int32,
            Self::UInt32(_) => Ty::UInt32,
            Self::Int64(_) => Ty::Int64,
            Self::UInt64(_) => Ty::UInt64,
            Self::Float(_) => Ty::Float,
            Self::Double(_) => Ty::Double,
            Self::String(_) => Ty::String,
            Self::Enum(def, _) => Ty::Enum(def.clone()),
            Self::Object(o) => Ty::Class(o.type_name.clone()),
            Self::Opaque(s) => Ty::Opaque(s.struct_name().to_owned()),
            Self::DataUnit(u) => Ty::DataUnit(u.root.type_name.clone()),
            Self::Null | Self::Sequence(_) | Self::Dictionary(_) => return None,
        })
    }

    /// Default substituted for an absent nullable value.
    pub fn default_for(ty: &Ty) -> Value {
        match ty {
            Ty::Bool => Self::Bool(false),
            Ty::Int8 => Self::Int8(0),
            Ty::UInt8 => Self::UInt8(0),
            Ty::Int16 => Self::Int16(0),
            Ty::UInt16 => Self::UInt16(0),
            Ty::Int32 => Self::Int32(0),
            Ty::UInt32 => Self::UInt32(0),
            Ty::Int64 => Self::Int64(0),
            Ty::UInt64 => Self::UInt64(0),
            Ty::Float => Self::Float(0.0),
            Ty::Double => Self::Double(0.0),
            Ty::String => Self::String(String::new()),
            Ty::Enum(def) => Self::Enum(def.clone(), def.default_value()),
            Ty::Array(_) | Ty::List(_) => Self::Sequence(Vec::new()),
            Ty::Dictionary(..) => Self::Dictionary(Vec::new()),
            Ty::Nullable(inner) => Self::default_for(inner),
            Ty::Class(_) | Ty::Struct(_) | Ty::Opaque(_) | Ty::DataUnit(_) | Ty::Foreign(_) => {
                Self::Null
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's variant for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int8(_) => "i8",
            Self::UInt8(_) => "u8",
            Self::Int16(_) => "i16",
            Self::UInt16(_) => "u16",
            Self::Int32(_) => "i32",
            Self::UInt32(_) => "u32",
            Self::Int64(_) => "i64",
            Self::UInt64(_) => "u64",
            Self::Float(_) => "f32",
            Self::Double(_) => "f64",
            Self::String(_) => "string",
            Self::Enum(..) => "enum",
            Self::Sequence(_) => "sequence",
            Self::Dictionary(_) => "dictionary",
            Self::Object(_) => "object",
            Self::Opaque(_) => "opaque struct",
            Self::DataUnit(_) => "data unit",
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => String,
    Object => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<DataUnit> for Value {
    fn from(v: DataUnit) -> Self {
        Self::DataUnit(Box::new(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Sequence(v)
    }
}

impl<T: OpaqueStruct + 'static> From<Arc<T>> for Value {
    fn from(v: Arc<T>) -> Self {
        Self::Opaque(v)
    }
}
