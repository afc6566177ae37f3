//! Test fixtures and model dumps.

use std::fmt::Write as _;
use std::sync::Arc;

use gamedata_format::MetaKind;

use crate::meta::{MemberValue, MetaCode};
use crate::reflect::{DataUnit, EnumDef, Object, OpaqueStruct, Ty, Value};
use crate::stream::DataStream;

/// Three packed floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl OpaqueStruct for Vec3 {
    fn struct_name(&self) -> &str {
        "vec3_t"
    }

    fn struct_size(&self) -> u32 {
        12
    }

    fn struct_align(&self) -> u32 {
        4
    }

    fn struct_write(&self, stream: &mut DataStream) {
        stream.write_f32(self.x);
        stream.write_f32(self.y);
        stream.write_f32(self.z);
    }

    fn struct_code(&self) -> Vec<String> {
        ["struct vec3_t", "{", "    f32 x, y, z;", "};"]
            .map(String::from)
            .to_vec()
    }
}

/// Opaque struct with a chosen name, shape and by-value dependencies.
/// Writes zeros.
#[derive(Debug, Clone)]
pub struct Blob {
    pub name: &'static str,
    pub size: u32,
    pub align: u32,
    pub dependencies: Vec<&'static str>,
}

impl Blob {
    pub fn new(name: &'static str, size: u32, align: u32) -> Self {
        Self {
            name,
            size,
            align,
            dependencies: Vec::new(),
        }
    }

    pub fn uses(mut self, name: &'static str) -> Self {
        self.dependencies.push(name);
        self
    }
}

impl OpaqueStruct for Blob {
    fn struct_name(&self) -> &str {
        self.name
    }

    fn struct_size(&self) -> u32 {
        self.size
    }

    fn struct_align(&self) -> u32 {
        self.align
    }

    fn struct_write(&self, stream: &mut DataStream) {
        stream.write_bytes(&vec![0; self.size as usize]);
    }

    fn struct_code(&self) -> Vec<String> {
        let mut lines = vec![format!("struct {}", self.name), "{".to_owned()];
        for (i, dep) in self.dependencies.iter().enumerate() {
            lines.push(format!("    {dep} part{i};"));
        }
        lines.push("};".to_owned());
        lines
    }

    fn struct_dependencies(&self) -> Vec<String> {
        self.dependencies.iter().map(|d| (*d).to_owned()).collect()
    }
}

pub fn color() -> Arc<EnumDef> {
    Arc::new(
        EnumDef::new("Color", MetaKind::UInt8)
            .variant("Red", 0)
            .variant("Green", 1)
            .variant("Blue", 2),
    )
}

/// `{flagA=true, flagB=false, count=5, name="hero", stats=[1,2,3]}`
pub fn hero() -> Object {
    Object::new("Game.Hero")
        .with("m_flagA", Ty::Bool, true)
        .with("m_flagB", Ty::Bool, false)
        .with("m_count", Ty::Int32, 5)
        .with("m_name", Ty::String, "hero")
        .with(
            "m_stats",
            Ty::array(Ty::Int32),
            vec![Value::from(1), Value::from(2), Value::from(3)],
        )
}

pub fn hero_unit() -> DataUnit {
    DataUnit::new("Hero/Main", hero())
}

/// One line per member row.
pub fn dump(code: &MetaCode) -> String {
    let mut out = String::new();
    for i in 0..code.len() {
        let kind = code.kind(i);
        write!(out, "#{i} {kind:?}").unwrap();
        if !code.name(i).is_empty() {
            write!(out, " {}", code.name(i)).unwrap();
        }
        if let Some(type_name) = code.type_name(i) {
            write!(out, " <{type_name}>").unwrap();
        }
        match (kind, code.start(i)) {
            (MetaKind::String, Some(index)) => {
                write!(out, " {:?}", code.strings().entry(index).text()).unwrap();
            }
            (MetaKind::String, None) => out.push_str(" null"),
            (_, Some(start)) => write!(out, " [{start}+{}]", code.count(i)).unwrap(),
            (_, None) if code.value(i).is_null() => out.push_str(" null"),
            _ => {}
        }
        if let Some(value) = scalar(code.value(i)) {
            write!(out, " = {value}").unwrap();
        }
        out.push('\n');
    }
    out
}

fn scalar(value: &MemberValue) -> Option<String> {
    Some(match value {
        MemberValue::Bool(v) => v.to_string(),
        MemberValue::BitSet(v) => format!("{v:#b}"),
        MemberValue::Int8(v) => v.to_string(),
        MemberValue::UInt8(v) => v.to_string(),
        MemberValue::Int16(v) => v.to_string(),
        MemberValue::UInt16(v) => v.to_string(),
        MemberValue::Int32(v) => v.to_string(),
        MemberValue::UInt32(v) => v.to_string(),
        MemberValue::Int64(v) => v.to_string(),
        MemberValue::UInt64(v) => v.to_string(),
        MemberValue::Float(v) => format!("{v:?}"),
        MemberValue::Double(v) => format!("{v:?}"),
        MemberValue::Enum(_, v) => v.to_string(),
        MemberValue::Struct(s) => s.struct_name().to_owned(),
        _ => return None,
    })
}
