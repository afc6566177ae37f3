//! Column-oriented member registry.
//!
//! Every reflected value becomes one row. Rows of a class, array or
//! dictionary own the contiguous sub-range `[start, start + count)` holding
//! their fields or elements (dictionaries: keys, then values). Sorting swaps
//! whole rows in place, so row indices stay valid.

use std::ops::Range;
use std::sync::Arc;

use gamedata_core::{Hash160, Interner, Symbol};
use gamedata_format::MetaKind;

use super::MemberValue;
use crate::reflect::{EnumDef, OpaqueStruct};
use crate::string_table::StringTable;

/// One row, detached from the columns.
#[derive(Clone, Debug)]
struct Row {
    kind: MetaKind,
    name: Symbol,
    type_name: Option<Symbol>,
    start: Option<usize>,
    count: usize,
    value: MemberValue,
}

#[derive(Debug, Default)]
pub struct MetaCode {
    kinds: Vec<MetaKind>,
    names: Vec<Symbol>,
    type_names: Vec<Option<Symbol>>,
    starts: Vec<Option<usize>>,
    counts: Vec<usize>,
    values: Vec<MemberValue>,
    interner: Interner,
    strings: StringTable,
}

impl MetaCode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Append a row and return its index.
    pub fn add_member(
        &mut self,
        kind: MetaKind,
        name: &str,
        value: MemberValue,
        start: Option<usize>,
        count: usize,
    ) -> usize {
        let name = self.interner.intern(name);
        self.push_row(Row {
            kind,
            name,
            type_name: None,
            start,
            count,
            value,
        })
    }

    fn push_row(&mut self, row: Row) -> usize {
        let index = self.kinds.len();
        self.kinds.push(row.kind);
        self.names.push(row.name);
        self.type_names.push(row.type_name);
        self.starts.push(row.start);
        self.counts.push(row.count);
        self.values.push(row.value);
        index
    }

    fn row(&self, i: usize) -> Row {
        Row {
            kind: self.kinds[i],
            name: self.names[i],
            type_name: self.type_names[i],
            start: self.starts[i],
            count: self.counts[i],
            value: self.values[i].clone(),
        }
    }

    fn set_row(&mut self, i: usize, row: Row) {
        self.kinds[i] = row.kind;
        self.names[i] = row.name;
        self.type_names[i] = row.type_name;
        self.starts[i] = row.start;
        self.counts[i] = row.count;
        self.values[i] = row.value;
    }

    /// Copy row `i` to the end of the model.
    pub fn duplicate_member(&mut self, i: usize) -> usize {
        let row = self.row(i);
        self.push_row(row)
    }

    pub fn swap_members(&mut self, a: usize, b: usize) {
        self.kinds.swap(a, b);
        self.names.swap(a, b);
        self.type_names.swap(a, b);
        self.starts.swap(a, b);
        self.counts.swap(a, b);
        self.values.swap(a, b);
    }

    /// Reorder the rows `start..start + order.len()` so that position `k`
    /// receives the row previously at `order[k]`.
    pub(crate) fn permute(&mut self, start: usize, order: &[usize]) {
        let rows: Vec<Row> = order.iter().map(|&i| self.row(i)).collect();
        for (k, row) in rows.into_iter().enumerate() {
            self.set_row(start + k, row);
        }
    }

    /// Turn row `i` into a bitset.
    pub(crate) fn set_bitset(&mut self, i: usize, name: Symbol, start: usize, count: usize, bits: u32) {
        self.set_row(
            i,
            Row {
                kind: MetaKind::BitSet,
                name,
                type_name: None,
                start: Some(start),
                count,
                value: MemberValue::BitSet(bits),
            },
        );
    }

    // Typed constructors

    pub fn new_scalar(&mut self, kind: MetaKind, name: &str, value: MemberValue) -> usize {
        self.add_member(kind, name, value, None, 1)
    }

    /// String row pointing at its string-table entry; `count` is the UTF-8
    /// byte length.
    pub fn new_string(&mut self, name: &str, text: Option<&str>) -> usize {
        match text {
            Some(text) => {
                let index = self.strings.add(text);
                let len = self.strings.entry(index).byte_len() as usize;
                self.add_member(MetaKind::String, name, MemberValue::Present, Some(index), len)
            }
            None => self.add_member(MetaKind::String, name, MemberValue::Null, None, 0),
        }
    }

    pub fn new_enum(&mut self, name: &str, def: Arc<EnumDef>, value: i64) -> usize {
        let type_name = def.name().to_owned();
        let row = self.add_member(MetaKind::Enum, name, MemberValue::Enum(def, value), None, 1);
        self.set_type_name(row, &type_name);
        row
    }

    /// Opaque struct row. `None` only for representatives of empty
    /// collections.
    pub fn new_struct(
        &mut self,
        name: &str,
        type_name: &str,
        value: Option<Arc<dyn OpaqueStruct>>,
    ) -> usize {
        let value = value.map_or(MemberValue::Null, MemberValue::Struct);
        let row = self.add_member(MetaKind::Struct, name, value, None, 1);
        self.set_type_name(row, type_name);
        row
    }

    pub fn new_class(&mut self, name: &str, type_name: &str, present: bool) -> usize {
        let value = if present {
            MemberValue::Present
        } else {
            MemberValue::Null
        };
        let row = self.add_member(MetaKind::Class, name, value, None, 0);
        self.set_type_name(row, type_name);
        row
    }

    pub fn new_array(&mut self, name: &str) -> usize {
        self.add_member(MetaKind::Array, name, MemberValue::Present, None, 0)
    }

    pub fn new_dictionary(&mut self, name: &str) -> usize {
        self.add_member(MetaKind::Dictionary, name, MemberValue::Present, None, 0)
    }

    pub fn new_data_unit(&mut self, name: &str, type_name: &str, signature: Option<Hash160>) -> usize {
        let value = signature.map_or(MemberValue::Null, MemberValue::DataUnit);
        let row = self.add_member(MetaKind::DataUnit, name, value, None, 0);
        self.set_type_name(row, type_name);
        row
    }

    // Columns

    pub fn kind(&self, i: usize) -> MetaKind {
        self.kinds[i]
    }

    pub fn name(&self, i: usize) -> &str {
        self.interner.resolve(self.names[i])
    }

    pub fn name_symbol(&self, i: usize) -> Symbol {
        self.names[i]
    }

    pub fn type_name(&self, i: usize) -> Option<&str> {
        self.type_names[i].map(|s| self.interner.resolve(s))
    }

    pub fn set_type_name(&mut self, i: usize, type_name: &str) {
        self.type_names[i] = Some(self.interner.intern(type_name));
    }

    pub fn start(&self, i: usize) -> Option<usize> {
        self.starts[i]
    }

    pub fn count(&self, i: usize) -> usize {
        self.counts[i]
    }

    pub fn set_count(&mut self, i: usize, count: usize) {
        self.counts[i] = count;
    }

    pub fn set_range(&mut self, i: usize, start: usize, count: usize) {
        self.starts[i] = Some(start);
        self.counts[i] = count;
    }

    pub fn value(&self, i: usize) -> &MemberValue {
        &self.values[i]
    }

    /// Rows owned by member `i`: fields, elements, or keys followed by values.
    pub fn members(&self, i: usize) -> Range<usize> {
        let Some(start) = self.starts[i] else {
            return 0..0;
        };
        let count = self.counts[i];
        match self.kinds[i] {
            MetaKind::Class | MetaKind::Array | MetaKind::BitSet | MetaKind::DataUnit => {
                start..start + count
            }
            MetaKind::Dictionary => start..start + 2 * count,
            _ => 0..0,
        }
    }

    /// Indices of all class rows, in row order.
    pub fn classes(&self) -> impl Iterator<Item = usize> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == MetaKind::Class)
            .map(|(i, _)| i)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn strings_mut(&mut self) -> &mut StringTable {
        &mut self.strings
    }
}
