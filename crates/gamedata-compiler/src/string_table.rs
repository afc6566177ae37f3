//! Content-addressed string pool.
//!
//! Each distinct string is stored once and owns a [`StreamReference`]. Data
//! units write the strings they use into a single block ahead of their other
//! data and mark each string's reference there.

use std::collections::HashMap;

use crate::stream::{DataStream, StreamReference};

#[derive(Clone, Debug)]
pub struct StringEntry {
    text: String,
    rune_len: u32,
    hash: u32,
    reference: StreamReference,
}

impl StringEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// UTF-8 length, excluding the NUL terminator.
    pub fn byte_len(&self) -> u32 {
        self.text.len() as u32
    }

    /// Number of Unicode scalar values.
    pub fn rune_len(&self) -> u32 {
        self.rune_len
    }

    /// CRC32 of the UTF-8 bytes.
    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn reference(&self) -> StreamReference {
        self.reference
    }
}

#[derive(Clone, Debug, Default)]
pub struct StringTable {
    entries: Vec<StringEntry>,
    lookup: HashMap<String, usize>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string, returning the index of the existing entry when present.
    pub fn add(&mut self, text: &str) -> usize {
        if let Some(&index) = self.lookup.get(text) {
            return index;
        }
        let index = self.entries.len();
        self.entries.push(StringEntry {
            text: text.to_owned(),
            rune_len: text.chars().count() as u32,
            hash: crc32fast::hash(text.as_bytes()),
            reference: StreamReference::allocate(),
        });
        self.lookup.insert(text.to_owned(), index);
        index
    }

    pub fn find(&self, text: &str) -> Option<usize> {
        self.lookup.get(text).copied()
    }

    /// # Panics
    /// Panics if `index` was not returned by [`StringTable::add`].
    pub fn entry(&self, index: usize) -> &StringEntry {
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StringEntry> {
        self.entries.iter()
    }

    /// Write the selected entries as NUL-terminated strings into `block`,
    /// ordered by hash, marking each entry's reference.
    ///
    /// Duplicate indices are written once.
    pub fn write_block(
        &self,
        stream: &mut DataStream,
        block: StreamReference,
        indices: impl IntoIterator<Item = usize>,
    ) {
        let mut order: Vec<usize> = indices.into_iter().collect();
        order.sort_by_key(|&i| (self.entries[i].hash, i));
        order.dedup();

        stream.open_block(block);
        for index in order {
            let entry = &self.entries[index];
            stream.mark(entry.reference);
            stream.write_bytes(entry.text.as_bytes());
            stream.write_u8(0);
        }
        stream.close_block();
    }
}
