//! Output rendering methods.

use gamedata_format::MetaKind;
use indexmap::{IndexMap, IndexSet};

use super::Emitter;
use crate::reflect::OpaqueStruct;

impl Emitter<'_> {
    /// One `enums` namespace block per distinct enum name.
    pub(super) fn emit_enums(&mut self) {
        let code = self.code;
        let mut enums = IndexMap::new();
        for i in 0..code.len() {
            if let Some((def, _)) = code.value(i).as_enum() {
                enums.entry(def.name()).or_insert(def);
            }
        }

        for (name, def) in enums {
            self.output.push_str("namespace enums\n{\n");
            self.output.push_str(&format!("    enum {name}\n    {{\n"));
            for variant in def.variants() {
                self.output
                    .push_str(&format!("        {} = {},\n", variant.name, variant.value));
            }
            self.output.push_str("    };\n}\n\n");
        }
    }

    /// With `all`, every class and data-unit type, so pointers and handles
    /// can name types defined later. Base types of polymorphic collections
    /// are declared regardless when no class defines them.
    pub(super) fn emit_forward_declarations(&mut self, all: bool) {
        let code = self.code;
        let mut names: IndexSet<&str> = IndexSet::new();
        for i in 0..code.len() {
            match code.kind(i) {
                MetaKind::Class | MetaKind::DataUnit if all => {
                    names.insert(code.ensure_type_name(i));
                }
                MetaKind::Array | MetaKind::Dictionary => {
                    if let Some(base) = code.type_name(i)
                        && (all || !self.definitions.contains_key(base))
                    {
                        names.insert(base);
                    }
                }
                _ => {}
            }
        }
        if names.is_empty() {
            return;
        }

        self.output.push_str("// Forward declarations\n");
        for name in names {
            self.output.push_str(&format!("struct {name};\n"));
        }
        self.output.push('\n');
    }

    pub(super) fn emit_struct_code(&mut self, value: &dyn OpaqueStruct) {
        let lines = value.struct_code();
        if lines.is_empty() {
            return;
        }
        for line in lines {
            self.output.push_str(&line);
            self.output.push('\n');
        }
        self.output.push('\n');
    }

    /// Getters in member order, then the private fields in the same order.
    pub(super) fn emit_class(&mut self, name: &str, class: usize) {
        self.output.push_str(&format!("struct {name}\n{{\n"));

        let members = self.code.members(class);
        if !members.is_empty() {
            for m in members.clone() {
                self.emit_getters(m);
            }
            self.output.push_str("\nprivate:\n");
            for m in members {
                let field = format!("    {} m_{};\n", self.field_type(m), self.code.name(m));
                self.output.push_str(&field);
            }
        }

        self.output.push_str("};\n\n");
    }

    fn emit_getters(&mut self, m: usize) {
        let code = self.code;
        let name = code.name(m);
        match code.kind(m) {
            MetaKind::BitSet => {
                for (bit, b) in code.members(m).enumerate() {
                    self.output.push_str(&format!(
                        "    inline bool get{}() const {{ return (m_{name} & (1u << {bit})) != 0; }}\n",
                        code.name(b)
                    ));
                }
            }
            MetaKind::Enum => {
                let enum_name = code.ensure_type_name(m);
                self.output.push_str(&format!(
                    "    inline enums::{enum_name} get{name}() const {{ return (enums::{enum_name})m_{name}; }}\n"
                ));
            }
            MetaKind::Class => {
                let class_name = code.ensure_type_name(m);
                self.output.push_str(&format!(
                    "    inline {class_name} const* get{name}() const {{ return m_{name}; }}\n"
                ));
            }
            MetaKind::String
            | MetaKind::Struct
            | MetaKind::Array
            | MetaKind::Dictionary
            | MetaKind::DataUnit => {
                let ty = self.field_type(m);
                self.output.push_str(&format!(
                    "    inline {ty} const& get{name}() const {{ return m_{name}; }}\n"
                ));
            }
            _ => {
                let ty = self.field_type(m);
                self.output.push_str(&format!(
                    "    inline {ty} get{name}() const {{ return m_{name}; }}\n"
                ));
            }
        }
    }

    /// C++ type of the member as stored in its parent.
    pub(super) fn field_type(&self, m: usize) -> String {
        let code = self.code;
        match code.kind(m) {
            MetaKind::Unknown => code.unexpected_member(m, "a C++ field"),
            MetaKind::Enum => code.ensure_enum(m).type_name().to_owned(),
            MetaKind::Struct => code.ensure_type_name(m).to_owned(),
            MetaKind::Class => format!("{}*", code.ensure_type_name(m)),
            MetaKind::Array => {
                let element = match code.type_name(m) {
                    Some(base) => format!("{base}*"),
                    None => self.field_type(code.ensure_start(m)),
                };
                format!("array_t<{element}>")
            }
            MetaKind::Dictionary => {
                let key = code.ensure_start(m);
                let value = match code.type_name(m) {
                    Some(base) => format!("{base}*"),
                    None => self.field_type(key + code.count(m).max(1)),
                };
                format!("dict_t<{}, {value}>", self.field_type(key))
            }
            MetaKind::DataUnit => format!("dataunit_t<{}>", code.ensure_type_name(m)),
            kind => kind.type_name().to_owned(),
        }
    }
}
