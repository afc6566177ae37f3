//! Core emitter struct and main emit logic.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use gamedata_format::MetaKind;
use indexmap::IndexMap;
use tracing::debug;

use super::{CodegenError, Config};
use crate::meta::MetaCode;
use crate::reflect::OpaqueStruct;

/// A type that gets a definition in the output.
#[derive(Clone, Debug)]
pub(super) enum Definition {
    /// Opaque struct code, emitted once per struct name.
    Struct(Arc<dyn OpaqueStruct>),
    /// First present class row of a type.
    Class(usize),
}

/// C++ emitter over a laid-out model.
pub struct Emitter<'a> {
    pub(super) code: &'a MetaCode,
    pub(super) config: Config,

    /// Type name -> definition, in first-seen row order
    pub(super) definitions: IndexMap<String, Definition>,
    /// Output buffer
    pub(super) output: String,
}

impl<'a> Emitter<'a> {
    pub fn new(code: &'a MetaCode, config: Config) -> Self {
        Self {
            code,
            config,
            definitions: IndexMap::new(),
            output: String::new(),
        }
    }

    /// Emit the header.
    ///
    /// Fails when definitions embed each other in a cycle.
    pub fn emit(mut self) -> Result<String, CodegenError> {
        self.collect_definitions();
        let order = self.sort_topologically()?;

        if self.config.pragma_once {
            self.output.push_str("#pragma once\n\n");
        }
        if let Some(namespace) = &self.config.namespace {
            self.output.push_str(&format!("namespace {namespace}\n{{\n\n"));
        }

        self.emit_enums();
        self.emit_forward_declarations(self.config.forward_declarations);
        for name in &order {
            match self.definitions[name].clone() {
                Definition::Struct(value) => self.emit_struct_code(value.as_ref()),
                Definition::Class(row) => self.emit_class(name, row),
            }
        }

        if let Some(namespace) = &self.config.namespace {
            self.output.truncate(self.output.trim_end().len());
            self.output
                .push_str(&format!("\n\n}} // namespace {namespace}\n"));
        }

        debug!(definitions = order.len(), "codegen: emitted");

        // Ensure exactly one trailing newline
        self.output.truncate(self.output.trim_end().len());
        self.output.push('\n');
        Ok(self.output)
    }

    fn collect_definitions(&mut self) {
        let code = self.code;
        for i in 0..code.len() {
            match code.kind(i) {
                MetaKind::Struct => {
                    if let Some(value) = code.value(i).as_struct() {
                        self.definitions
                            .entry(value.struct_name().to_owned())
                            .or_insert_with(|| Definition::Struct(value.clone()));
                    }
                }
                MetaKind::Class if !code.value(i).is_null() => {
                    let name = code.ensure_type_name(i);
                    self.definitions
                        .entry(name.to_owned())
                        .or_insert(Definition::Class(i));
                }
                _ => {}
            }
        }
    }

    /// Type names a definition needs declared before it.
    fn direct_dependencies(&self, definition: &Definition) -> Vec<String> {
        match definition {
            Definition::Struct(value) => value.struct_dependencies(),
            &Definition::Class(row) => {
                let mut out = Vec::new();
                for m in self.code.members(row) {
                    self.collect_dependencies(m, &mut out);
                }
                out
            }
        }
    }

    fn collect_dependencies(&self, m: usize, out: &mut Vec<String>) {
        match self.code.kind(m) {
            MetaKind::Struct => out.push(self.code.ensure_type_name(m).to_owned()),
            MetaKind::Class | MetaKind::DataUnit if !self.config.forward_declarations => {
                out.push(self.code.ensure_type_name(m).to_owned());
            }
            MetaKind::Array | MetaKind::Dictionary => {
                if let Some(base) = self.code.type_name(m)
                    && !self.config.forward_declarations
                {
                    out.push(base.to_owned());
                }
                let (first, second) = self.code.element_rows(m);
                for e in first.into_iter().chain(second) {
                    self.collect_dependencies(e, out);
                }
            }
            _ => {}
        }
    }

    /// Kahn's algorithm over the definitions, ties broken by first-seen
    /// order. Types left with unmet dependencies form or depend on a cycle.
    fn sort_topologically(&self) -> Result<Vec<String>, CodegenError> {
        let mut deps: IndexMap<&str, HashSet<String>> = IndexMap::new();
        let mut rdeps: HashMap<String, Vec<&str>> = HashMap::new();

        for (name, definition) in &self.definitions {
            let mut set = HashSet::new();
            for dep in self.direct_dependencies(definition) {
                if dep == *name || !self.definitions.contains_key(&dep) {
                    continue;
                }
                if set.insert(dep.clone()) {
                    rdeps.entry(dep).or_default().push(name.as_str());
                }
            }
            deps.insert(name.as_str(), set);
        }

        let mut result = Vec::with_capacity(deps.len());
        let mut queue: VecDeque<&str> = deps
            .iter()
            .filter(|(_, d)| d.is_empty())
            .map(|(&name, _)| name)
            .collect();

        while let Some(name) = queue.pop_front() {
            result.push(name.to_owned());
            let Some(dependents) = rdeps.get(name) else {
                continue;
            };
            for &dependent in dependents {
                if let Some(dep_set) = deps.get_mut(dependent) {
                    dep_set.remove(name);
                    if dep_set.is_empty() {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if result.len() < deps.len() {
            let types = deps
                .into_iter()
                .filter(|(_, d)| !d.is_empty())
                .map(|(name, _)| name.to_owned())
                .collect();
            return Err(CodegenError::DependencyCycle { types });
        }
        Ok(result)
    }
}
