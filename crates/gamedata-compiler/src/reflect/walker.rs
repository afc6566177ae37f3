//! Queue-driven walk from a root data unit into [`MetaCode`] rows.
//!
//! Every member row is created when its owner is decomposed; composites are
//! queued and decomposed later, so the rows of one owner are always
//! contiguous and an owner row always precedes its sub-range.

use std::collections::{HashMap, VecDeque};

use gamedata_core::Hash160;
use gamedata_core::utils::{strip_member_prefix, to_cpp_type_name};
use gamedata_format::MetaKind;
use tracing::{debug, warn};

use super::classify::{DefaultClassifier, Shape, TypeClassifier, classify};
use super::{DataUnit, Field, Object, ReflectError, Ty, Value};
use crate::config::{Config, FieldOrder, UnknownFieldPolicy};
use crate::meta::{MemberValue, MetaCode};

type Result<T> = std::result::Result<T, ReflectError>;

/// Declared type of elements in a collection without one.
static UNTYPED: Ty = Ty::Foreign(String::new());

/// A composite waiting to be decomposed.
enum Pending<'v> {
    Class {
        member: usize,
        object: &'v Object,
    },
    Sequence {
        member: usize,
        label: String,
        items: &'v [Value],
        element: Option<&'v Ty>,
    },
    Dictionary {
        member: usize,
        label: String,
        entries: &'v [(Value, Value)],
        key: Option<&'v Ty>,
        value: Option<&'v Ty>,
    },
    DataUnit {
        member: usize,
        unit: &'v DataUnit,
    },
}

/// Turns an object graph into member rows.
pub struct Reflector<'a> {
    classifier: &'a dyn TypeClassifier,
    unknown_fields: UnknownFieldPolicy,
    field_order: FieldOrder,
    member_prefix: &'a str,
}

impl<'a> Reflector<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            classifier: &DefaultClassifier,
            unknown_fields: config.unknown_fields,
            field_order: config.field_order,
            member_prefix: &config.member_prefix,
        }
    }

    pub fn with_classifier(mut self, classifier: &'a dyn TypeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Walk `unit` and everything reachable from it.
    ///
    /// Returns the row of the root data unit. Its sub-range is the single
    /// class row of the unit's root object. Data units reached twice share
    /// that class row.
    pub fn analyze(&self, unit: &DataUnit, code: &mut MetaCode) -> Result<usize> {
        let mut queue = VecDeque::new();
        let mut units: HashMap<Hash160, usize> = HashMap::new();

        let root = code.new_data_unit(
            "",
            &to_cpp_type_name(unit.root().type_name()),
            Some(Hash160::compute_str(unit.signature())),
        );
        queue.push_back(Pending::DataUnit { member: root, unit });

        while let Some(item) = queue.pop_front() {
            match item {
                Pending::DataUnit { member, unit } => {
                    let signature = Hash160::compute_str(unit.signature());
                    let class = *units.entry(signature).or_insert_with(|| {
                        let object = unit.root();
                        let row = code.new_class("", &to_cpp_type_name(object.type_name()), true);
                        queue.push_back(Pending::Class { member: row, object });
                        row
                    });
                    code.set_range(member, class, 1);
                }
                Pending::Class { member, object } => {
                    self.class(code, &mut queue, member, object)?;
                }
                Pending::Sequence {
                    member,
                    label,
                    items,
                    element,
                } => {
                    self.sequence(code, &mut queue, member, &label, items, element)?;
                }
                Pending::Dictionary {
                    member,
                    label,
                    entries,
                    key,
                    value,
                } => {
                    self.dictionary(code, &mut queue, member, &label, entries, key, value)?;
                }
            }
        }

        debug!(
            members = code.len(),
            units = units.len(),
            strings = code.strings().len(),
            "reflect: walked object graph"
        );
        Ok(root)
    }

    fn class<'v>(
        &self,
        code: &mut MetaCode,
        queue: &mut VecDeque<Pending<'v>>,
        member: usize,
        object: &'v Object,
    ) -> Result<()> {
        let mut fields: Vec<&'v Field> = object.fields().iter().collect();
        if self.field_order == FieldOrder::TypeName {
            fields.sort_by_cached_key(|f| f.ty.display_name());
        }

        let start = code.len();
        let mut count = 0;
        for field in fields {
            let name = strip_member_prefix(&field.name, self.member_prefix);
            let label = format!("{}.{}", object.type_name(), name);
            if self
                .member(code, queue, name, &label, &field.ty, Some(&field.value))?
                .is_some()
            {
                count += 1;
            }
        }
        code.set_range(member, start, count);
        Ok(())
    }

    fn sequence<'v>(
        &self,
        code: &mut MetaCode,
        queue: &mut VecDeque<Pending<'v>>,
        member: usize,
        label: &str,
        items: &'v [Value],
        element: Option<&'v Ty>,
    ) -> Result<()> {
        let start = code.len();
        if items.is_empty() {
            let element = element.ok_or_else(|| ReflectError::UntypedEmptyCollection {
                field: label.to_owned(),
            })?;
            if self.member(code, queue, "", label, element, None)?.is_some() {
                code.set_range(member, start, 0);
            }
            return Ok(());
        }

        let declared = element.unwrap_or(&UNTYPED);
        let mut count = 0;
        for (i, item) in items.iter().enumerate() {
            let item_label = format!("{label}[{i}]");
            if self
                .member(code, queue, "", &item_label, declared, Some(item))?
                .is_some()
            {
                count += 1;
            }
        }
        if let Some(base) = ensure_homogeneous(code, label, start, count, element)? {
            code.set_type_name(member, &base);
        }
        if count > 0 {
            code.set_range(member, start, count);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn dictionary<'v>(
        &self,
        code: &mut MetaCode,
        queue: &mut VecDeque<Pending<'v>>,
        member: usize,
        label: &str,
        entries: &'v [(Value, Value)],
        key: Option<&'v Ty>,
        value: Option<&'v Ty>,
    ) -> Result<()> {
        let start = code.len();
        if entries.is_empty() {
            let (Some(key), Some(value)) = (key, value) else {
                return Err(ReflectError::UntypedEmptyCollection {
                    field: label.to_owned(),
                });
            };
            let k = self.member(code, queue, "", label, key, None)?;
            let v = self.member(code, queue, "", label, value, None)?;
            if k.is_some() && v.is_some() {
                code.set_range(member, start, 0);
            }
            return Ok(());
        }

        let key_ty = key.unwrap_or(&UNTYPED);
        let value_ty = value.unwrap_or(&UNTYPED);

        // A pair is kept only if both halves are supported.
        let mut kept = Vec::with_capacity(entries.len());
        for (i, (k, v)) in entries.iter().enumerate() {
            let entry_label = format!("{label}[{i}]");
            if !self.usable(&entry_label, key_ty, Some(k))? {
                self.unsupported(&entry_label, key_ty)?;
                continue;
            }
            if !self.usable(&entry_label, value_ty, Some(v))? {
                self.unsupported(&entry_label, value_ty)?;
                continue;
            }
            kept.push((entry_label, k, v));
        }

        for (entry_label, k, _) in &kept {
            self.member(code, queue, "", entry_label, key_ty, Some(*k))?;
        }
        for (entry_label, _, v) in &kept {
            self.member(code, queue, "", entry_label, value_ty, Some(*v))?;
        }

        let count = kept.len();
        ensure_homogeneous(code, label, start, count, None)?;
        if let Some(base) = ensure_homogeneous(code, label, start + count, count, value)? {
            code.set_type_name(member, &base);
        }
        if count > 0 {
            code.set_range(member, start, count);
        }
        Ok(())
    }

    /// Create the row for one field or element. `value` is `None` for the
    /// representative element of an empty collection.
    ///
    /// Returns `None` when the type is unsupported and skipped.
    fn member<'v>(
        &self,
        code: &mut MetaCode,
        queue: &mut VecDeque<Pending<'v>>,
        name: &str,
        label: &str,
        declared: &'v Ty,
        value: Option<&'v Value>,
    ) -> Result<Option<usize>> {
        let declared = unwrap_nullable(declared);
        let Some(shape) = self.shape(label, declared, value)? else {
            self.unsupported(label, declared)?;
            return Ok(None);
        };
        // In strict mode the unsupported element itself reports the error.
        if matches!(shape, Shape::Array | Shape::Dictionary)
            && self.unknown_fields == UnknownFieldPolicy::Skip
            && !self.usable(label, declared, value)?
        {
            self.unsupported(label, declared)?;
            return Ok(None);
        }
        let null = matches!(value, None | Some(Value::Null));

        let row = match (shape, value) {
            (Shape::Scalar(kind), _) => {
                let v = scalar_value(kind, value)
                    .ok_or_else(|| mismatch(label, declared, value))?;
                code.new_scalar(kind, name, v)
            }
            (Shape::String, Some(Value::String(text))) => code.new_string(name, Some(text)),
            (Shape::String, _) if null => code.new_string(name, None),
            (Shape::Enum, Some(Value::Enum(def, v))) => code.new_enum(name, def.clone(), *v),
            (Shape::Enum, _) if null => match declared {
                Ty::Enum(def) => code.new_enum(name, def.clone(), def.default_value()),
                _ => return Err(mismatch(label, declared, value)),
            },
            (Shape::Opaque, Some(Value::Opaque(s))) => {
                code.new_struct(name, s.struct_name(), Some(s.clone()))
            }
            (Shape::Opaque, Some(Value::Null)) => {
                return Err(ReflectError::NullStruct {
                    field: label.to_owned(),
                });
            }
            (Shape::Opaque, None) => code.new_struct(name, &declared_type_name(declared), None),
            (Shape::Class, Some(Value::Object(object))) => {
                let row = code.new_class(name, &to_cpp_type_name(object.type_name()), true);
                queue.push_back(Pending::Class {
                    member: row,
                    object,
                });
                row
            }
            (Shape::Class, _) if null => {
                code.new_class(name, &declared_type_name(declared), false)
            }
            (Shape::Array, Some(Value::Sequence(items))) => {
                self.push_sequence(code, queue, name, label, items, declared)
            }
            (Shape::Array, _) if null => {
                self.push_sequence(code, queue, name, label, Default::default(), declared)
            },
            (Shape::Dictionary, Some(Value::Dictionary(entries))) => {
                self.push_dictionary(code, queue, name, label, entries, declared)
            }
            (Shape::Dictionary, _) if null => {
                self.push_dictionary(code, queue, name, label, Default::default(), declared)
            }
            (Shape::DataUnit, Some(Value::DataUnit(unit))) => {
                let row = code.new_data_unit(
                    name,
                    &to_cpp_type_name(unit.root().type_name()),
                    Some(Hash160::compute_str(unit.signature())),
                );
                queue.push_back(Pending::DataUnit {
                    member: row,
                    unit: &**unit,
                });
                row
            }
            (Shape::DataUnit, _) if null => {
                code.new_data_unit(name, &declared_type_name(declared), None)
            }
            _ => return Err(mismatch(label, declared, value)),
        };
        Ok(Some(row))
    }

    fn push_sequence<'v>(
        &self,
        code: &mut MetaCode,
        queue: &mut VecDeque<Pending<'v>>,
        name: &str,
        label: &str,
        items: &'v [Value],
        declared: &'v Ty,
    ) -> usize {
        let row = code.new_array(name);
        queue.push_back(Pending::Sequence {
            member: row,
            label: label.to_owned(),
            items,
            element: declared.element(),
        });
        row
    }

    fn push_dictionary<'v>(
        &self,
        code: &mut MetaCode,
        queue: &mut VecDeque<Pending<'v>>,
        name: &str,
        label: &str,
        entries: &'v [(Value, Value)],
        declared: &'v Ty,
    ) -> usize {
        let row = code.new_dictionary(name);
        let (key, value) = declared.entry().unzip();
        queue.push_back(Pending::Dictionary {
            member: row,
            label: label.to_owned(),
            entries,
            key,
            value,
        });
        row
    }

    /// Shape of a value: its runtime type when it has one, else the
    /// declared type. Both must agree when both are known.
    fn shape(&self, label: &str, declared: &Ty, value: Option<&Value>) -> Result<Option<Shape>> {
        let expected = classify(self.classifier, declared);
        let runtime = value
            .and_then(Value::runtime_ty)
            .and_then(|ty| classify(self.classifier, &ty));
        match (expected, runtime) {
            (Some(e), Some(r)) if e != r => Err(mismatch(label, declared, value)),
            (e, r) => Ok(r.or(e)),
        }
    }

    /// Whether `value` yields a row. A collection does only if at least one
    /// element does, or, when empty, if its representative would.
    fn usable(&self, label: &str, declared: &Ty, value: Option<&Value>) -> Result<bool> {
        let declared = unwrap_nullable(declared);
        let Some(shape) = self.shape(label, declared, value)? else {
            return Ok(false);
        };
        match shape {
            Shape::Array => {
                let element = declared.element();
                match value {
                    Some(Value::Sequence(items)) if !items.is_empty() => {
                        let element = element.unwrap_or(&UNTYPED);
                        for (i, item) in items.iter().enumerate() {
                            if self.usable(&format!("{label}[{i}]"), element, Some(item))? {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                    // Untyped empty collections fail later with their own error.
                    _ => element.map_or(Ok(true), |e| self.usable(label, e, None)),
                }
            }
            Shape::Dictionary => {
                let (key, entry_value) = declared.entry().unzip();
                match value {
                    Some(Value::Dictionary(entries)) if !entries.is_empty() => {
                        let key = key.unwrap_or(&UNTYPED);
                        let entry_value = entry_value.unwrap_or(&UNTYPED);
                        for (i, (k, v)) in entries.iter().enumerate() {
                            let entry_label = format!("{label}[{i}]");
                            if self.usable(&entry_label, key, Some(k))?
                                && self.usable(&entry_label, entry_value, Some(v))?
                            {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                    _ => match (key, entry_value) {
                        (Some(k), Some(v)) => {
                            Ok(self.usable(label, k, None)? && self.usable(label, v, None)?)
                        }
                        _ => Ok(true),
                    },
                }
            }
            _ => Ok(true),
        }
    }

    fn unsupported(&self, label: &str, ty: &Ty) -> Result<()> {
        match self.unknown_fields {
            UnknownFieldPolicy::Skip => {
                warn!(field = label, ty = %ty.display_name(), "reflect: skipping unsupported type");
                Ok(())
            }
            UnknownFieldPolicy::Fail => Err(ReflectError::UnsupportedType {
                field: label.to_owned(),
                ty: ty.display_name(),
            }),
        }
    }
}

fn unwrap_nullable(ty: &Ty) -> &Ty {
    match ty {
        Ty::Nullable(inner) => unwrap_nullable(inner),
        _ => ty,
    }
}

fn declared_type_name(ty: &Ty) -> String {
    match ty {
        Ty::Class(name) | Ty::Struct(name) | Ty::DataUnit(name) => to_cpp_type_name(name),
        Ty::Opaque(name) => name.clone(),
        _ => ty.display_name(),
    }
}

fn mismatch(label: &str, declared: &Ty, value: Option<&Value>) -> ReflectError {
    ReflectError::TypeMismatch {
        field: label.to_owned(),
        expected: declared.display_name(),
        found: value.map_or("nothing", Value::describe),
    }
}

/// Scalar payload of `value`, or zero when absent.
fn scalar_value(kind: MetaKind, value: Option<&Value>) -> Option<MemberValue> {
    Some(match (kind, value) {
        (_, None | Some(Value::Null)) => return MemberValue::zero(kind),
        (MetaKind::Bool, Some(Value::Bool(v))) => MemberValue::Bool(*v),
        (MetaKind::Int8, Some(Value::Int8(v))) => MemberValue::Int8(*v),
        (MetaKind::UInt8, Some(Value::UInt8(v))) => MemberValue::UInt8(*v),
        (MetaKind::Int16, Some(Value::Int16(v))) => MemberValue::Int16(*v),
        (MetaKind::UInt16, Some(Value::UInt16(v))) => MemberValue::UInt16(*v),
        (MetaKind::Int32, Some(Value::Int32(v))) => MemberValue::Int32(*v),
        (MetaKind::UInt32, Some(Value::UInt32(v))) => MemberValue::UInt32(*v),
        (MetaKind::Int64, Some(Value::Int64(v))) => MemberValue::Int64(*v),
        (MetaKind::UInt64, Some(Value::UInt64(v))) => MemberValue::UInt64(*v),
        (MetaKind::Float, Some(Value::Float(v))) => MemberValue::Float(*v),
        (MetaKind::Double, Some(Value::Double(v))) => MemberValue::Double(*v),
        _ => return None,
    })
}

/// Elements of one collection must share kind and, when present, type.
///
/// Class elements are pointers, so they may differ in type when `base`
/// names a declared class type. Returns that type's name in that case.
fn ensure_homogeneous(
    code: &MetaCode,
    label: &str,
    start: usize,
    count: usize,
    base: Option<&Ty>,
) -> Result<Option<String>> {
    let Some(first) = (start..start + count).next() else {
        return Ok(None);
    };
    let base = match base.map(unwrap_nullable) {
        Some(Ty::Class(name)) if code.kind(first) == MetaKind::Class => {
            Some(to_cpp_type_name(name))
        }
        _ => None,
    };
    let describe = |row: usize| {
        code.type_name(row)
            .map_or_else(|| format!("{:?}", code.kind(row)), str::to_owned)
    };

    // Types are compared against the first present element.
    let reference = (start..start + count)
        .find(|&row| !code.value(row).is_null())
        .unwrap_or(first);

    let mut polymorphic = false;
    for row in start + 1..start + count {
        let same_kind = code.kind(row) == code.kind(first);
        let same_type =
            code.value(row).is_null() || code.type_name(row) == code.type_name(reference);
        if same_kind && !same_type && base.is_some() {
            polymorphic = true;
            continue;
        }
        if !same_kind || !same_type {
            let first = if same_kind { reference } else { first };
            return Err(ReflectError::HeterogeneousElements {
                field: label.to_owned(),
                first: describe(first),
                other: describe(row),
            });
        }
    }
    Ok(base.filter(|_| polymorphic))
}
