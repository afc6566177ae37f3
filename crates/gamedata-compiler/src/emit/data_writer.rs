//! Writes every data unit reachable from a root row.
//!
//! Units are processed from an outer queue and their blocks from an inner
//! one. Each unit gets a string block registered before any data block, so
//! its strings precede its data; it is filled once the unit's last block is
//! written and every used string is known.

use std::collections::{HashSet, VecDeque};

use gamedata_core::Hash160;
use gamedata_format::MetaKind;
use tracing::{debug, trace};

use super::EmitError;
use crate::meta::{MemberValue, MetaCode};
use crate::signature_db::{FileId, SignatureLookup};
use crate::stream::{DataStream, FinalizedStream, StreamReference};

type Result<T> = std::result::Result<T, EmitError>;

pub struct DataWriter<'a> {
    code: &'a MetaCode,
    signatures: &'a dyn SignatureLookup,
    stream: DataStream,
    /// Data-unit rows not written yet.
    units: VecDeque<usize>,
    scheduled: HashSet<Hash160>,
    /// Registered blocks of the open unit and the row owning their content.
    blocks: VecDeque<(StreamReference, usize)>,
    /// String-table indices used by the open unit.
    strings: Vec<usize>,
}

impl<'a> DataWriter<'a> {
    pub fn new(code: &'a MetaCode, signatures: &'a dyn SignatureLookup, stream: DataStream) -> Self {
        Self {
            code,
            signatures,
            stream,
            units: VecDeque::new(),
            scheduled: HashSet::new(),
            blocks: VecDeque::new(),
            strings: Vec::new(),
        }
    }

    /// Write the unit at `root` and every unit it reaches, then finalize.
    ///
    /// The layout of `code` must already be solved.
    pub fn write(self, root: usize) -> Result<FinalizedStream> {
        Ok(self.write_stream(root)?.finalize()?)
    }

    /// Like [`DataWriter::write`], returning the stream unfinalized.
    pub fn write_stream(mut self, root: usize) -> Result<DataStream> {
        if self.code.kind(root) != MetaKind::DataUnit || self.code.value(root).is_null() {
            return Err(EmitError::InvalidRoot { row: root });
        }
        self.schedule(root);
        while let Some(row) = self.units.pop_front() {
            self.write_unit(row)?;
        }
        Ok(self.stream)
    }

    fn schedule(&mut self, row: usize) {
        let Some(signature) = self.code.value(row).as_data_unit() else {
            return;
        };
        if self.scheduled.insert(signature) {
            self.units.push_back(row);
        }
    }

    fn write_unit(&mut self, row: usize) -> Result<()> {
        let code = self.code;
        let signature = code.ensure_data_unit(row);
        let class = code.ensure_start(row);

        let unit = self.stream.data_unit_index(signature);
        self.stream.open_data_unit(unit);

        let string_block = self.stream.new_block(1);
        let root = self.new_data_block(class);
        self.stream.set_unit_root(root);

        let mut written = 0;
        while let Some((reference, owner)) = self.blocks.pop_front() {
            self.write_block(reference, owner)?;
            written += 1;
        }

        let strings = std::mem::take(&mut self.strings);
        let used = strings.len();
        code.strings().write_block(&mut self.stream, string_block, strings);
        self.stream.close_data_unit();

        debug!(unit, %signature, blocks = written, strings = used, "emit: wrote data unit");
        Ok(())
    }

    fn new_data_block(&mut self, row: usize) -> StreamReference {
        let code = self.code;
        let reference = self
            .stream
            .new_sized_block(code.data_alignment(row), code.data_size(row));
        self.blocks.push_back((reference, row));
        reference
    }

    fn write_block(&mut self, reference: StreamReference, owner: usize) -> Result<()> {
        let code = self.code;
        trace!(%reference, owner, kind = ?code.kind(owner), "emit: block");
        self.stream.open_block(reference);
        for member in code.members(owner) {
            self.write_member(member)?;
        }
        self.stream.close_block();
        Ok(())
    }

    /// Write one member inline at its alignment.
    fn write_member(&mut self, row: usize) -> Result<()> {
        let code = self.code;
        self.stream.align(code.member_alignment(row));

        match code.value(row) {
            MemberValue::Bool(v) => self.stream.write_bool(*v),
            MemberValue::BitSet(v) => self.stream.write_u32(*v),
            MemberValue::Int8(v) => self.stream.write_i8(*v),
            MemberValue::UInt8(v) => self.stream.write_u8(*v),
            MemberValue::Int16(v) => self.stream.write_i16(*v),
            MemberValue::UInt16(v) => self.stream.write_u16(*v),
            MemberValue::Int32(v) => self.stream.write_i32(*v),
            MemberValue::UInt32(v) => self.stream.write_u32(*v),
            MemberValue::Int64(v) => self.stream.write_i64(*v),
            MemberValue::UInt64(v) => self.stream.write_u64(*v),
            MemberValue::Float(v) => self.stream.write_f32(*v),
            MemberValue::Double(v) => self.stream.write_f64(*v),
            MemberValue::Enum(def, v) => self.write_integer(def.underlying(), *v),
            MemberValue::Struct(value) => {
                let before = self.stream.position();
                value.struct_write(&mut self.stream);
                let written = self.stream.position() - before;
                if written != value.struct_size() {
                    return Err(EmitError::StructSize {
                        name: value.struct_name().to_owned(),
                        declared: value.struct_size(),
                        written,
                    });
                }
            }
            MemberValue::DataUnit(signature) => {
                let id = self.signatures.entry(*signature);
                self.stream.write_file_id(id.container, id.entry);
                self.schedule(row);
            }
            MemberValue::Present => self.write_reference(row),
            MemberValue::Null => self.write_null(row),
        }
        Ok(())
    }

    fn write_reference(&mut self, row: usize) {
        let code = self.code;
        match code.kind(row) {
            MetaKind::String => {
                let index = code.ensure_start(row);
                let entry = code.strings().entry(index);
                self.strings.push(index);
                self.stream
                    .write_string(entry.reference(), entry.byte_len(), entry.rune_len());
            }
            MetaKind::Class => {
                let block = self.new_data_block(row);
                self.stream.write_block_reference(block);
            }
            MetaKind::Array | MetaKind::Dictionary => {
                let count = code.count(row) as u32;
                if count == 0 {
                    self.stream.write_null_reference();
                } else {
                    let block = self.new_data_block(row);
                    self.stream.write_block_reference(block);
                }
                self.stream.write_u32(count);
                self.stream.write_u32(count);
            }
            _ => code.unexpected_member(row, "a reference"),
        }
    }

    fn write_null(&mut self, row: usize) {
        match self.code.kind(row) {
            MetaKind::String => {
                self.stream.write_null_reference();
                self.stream.write_u32(0);
                self.stream.write_u32(0);
            }
            MetaKind::Class => self.stream.write_null_reference(),
            MetaKind::DataUnit => {
                let id = FileId::MISSING;
                self.stream.write_file_id(id.container, id.entry);
            }
            _ => self.code.unexpected_member(row, "null"),
        }
    }

    fn write_integer(&mut self, kind: MetaKind, value: i64) {
        match kind {
            MetaKind::Int8 => self.stream.write_i8(value as i8),
            MetaKind::UInt8 => self.stream.write_u8(value as u8),
            MetaKind::Int16 => self.stream.write_i16(value as i16),
            MetaKind::UInt16 => self.stream.write_u16(value as u16),
            MetaKind::Int32 => self.stream.write_i32(value as i32),
            MetaKind::UInt32 => self.stream.write_u32(value as u32),
            MetaKind::Int64 => self.stream.write_i64(value),
            MetaKind::UInt64 => self.stream.write_u64(value as u64),
            other => unreachable!("enum with non-integer underlying kind {other:?}"),
        }
    }
}
