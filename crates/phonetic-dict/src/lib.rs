//! Load tab-separated pronunciation dictionaries into a dual index.
//!
//! Each line of a dictionary file is `character<TAB>pronunciation<TAB>notes`.
//! The notes field is classified by a fixed, ordered battery of patterns
//! (variant reading, interchangeable character, Cantonese-specific, proper
//! noun, auxiliary word) and split into example use-cases and an explanation.
//! Lines that are not exactly three fields are skipped without error.
//!
//! [`Dictionary`] keeps two order-preserving multi-maps over the parsed
//! records: by character and by pronunciation. The first record in a
//! character's bucket is that character's default reading.
//!
//! # Example
//! ```no_run
//! use phonetic_dict::DictionaryStore;
//!
//! # fn main() -> Result<(), phonetic_dict::StoreError> {
//! let store = DictionaryStore::new("/path/to/data.txt");
//! let dict = store.load()?;
//! for record in dict.lookup_by_character("中").unwrap_or_default() {
//!     println!("{record}");
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p phonetic-dict --example stats -- <data.txt>`.

mod parse;
mod store;

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use phonetic_types::Record;
use tracing::debug;

pub use parse::{classify, format_line, parse_line};
pub use store::{DictionaryStore, StoreError};

/// Character- and pronunciation-keyed views over the same records.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    by_character: HashMap<String, Vec<Arc<Record>>>,
    by_pronunciation: HashMap<String, Vec<Arc<Record>>>,
    record_count: usize,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index records in iteration order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut dictionary = Self::new();
        for record in records {
            dictionary.push(record);
        }
        dictionary
    }

    /// Parse and index every line from `reader`.
    ///
    /// Malformed lines, including lines that are not valid UTF-8, are
    /// skipped; only I/O failures are errors.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, StoreError> {
        let mut dictionary = Self::new();
        let mut dropped = 0usize;
        for raw_line in reader.split(b'\n') {
            let raw_line = raw_line?;
            let record = std::str::from_utf8(&raw_line).ok().and_then(parse_line);
            match record {
                Some(record) => dictionary.push(record),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!("skipped {dropped} malformed dictionary lines");
        }
        Ok(dictionary)
    }

    /// Shorthand for `DictionaryStore::new(path).load()`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        DictionaryStore::new(path.as_ref()).load()
    }

    /// Append one record to both its character and pronunciation buckets.
    pub fn push(&mut self, record: Record) {
        let record = Arc::new(record);
        self.by_character
            .entry(record.character.clone())
            .or_default()
            .push(Arc::clone(&record));
        self.by_pronunciation
            .entry(record.pronunciation.clone())
            .or_default()
            .push(record);
        self.record_count += 1;
    }

    /// Add records under `character` in the character index only.
    ///
    /// Used for entries fetched at query time; the pronunciation index is
    /// left as loaded, so reverse lookups do not see these records. An empty
    /// `records` leaves the index untouched.
    pub fn insert_character(&mut self, character: &str, records: Vec<Record>) -> &[Arc<Record>] {
        if records.is_empty() {
            return self.lookup_by_character(character).unwrap_or(&[]);
        }
        self.record_count += records.len();
        let bucket = self.by_character.entry(character.to_string()).or_default();
        bucket.extend(records.into_iter().map(Arc::new));
        bucket.as_slice()
    }

    /// Every reading of `character`, in load order.
    pub fn lookup_by_character(&self, character: &str) -> Option<&[Arc<Record>]> {
        self.by_character.get(character).map(Vec::as_slice)
    }

    /// Every record read as `pronunciation`, in load order.
    pub fn lookup_by_pronunciation(&self, pronunciation: &str) -> Option<&[Arc<Record>]> {
        self.by_pronunciation.get(pronunciation).map(Vec::as_slice)
    }

    pub fn contains_character(&self, character: &str) -> bool {
        self.by_character.contains_key(character)
    }

    /// Number of distinct characters.
    pub fn character_count(&self) -> usize {
        self.by_character.len()
    }

    /// Number of distinct pronunciations.
    pub fn pronunciation_count(&self) -> usize {
        self.by_pronunciation.len()
    }

    /// Number of records held, including ones added by [`insert_character`](Self::insert_character).
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Distinct characters in arbitrary order.
    pub fn characters(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_character.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "X\tp1\tfoo，bar\nX\tp2\t\nY\tq1\t\n";

    #[test]
    fn preserves_bucket_order() {
        let dict = Dictionary::from_reader(Cursor::new(SAMPLE)).unwrap();
        let readings: Vec<_> = dict
            .lookup_by_character("X")
            .unwrap()
            .iter()
            .map(|r| r.pronunciation.as_str())
            .collect();
        assert_eq!(readings, ["p1", "p2"]);
        assert_eq!(dict.record_count(), 3);
        assert_eq!(dict.character_count(), 2);
        assert_eq!(dict.pronunciation_count(), 3);
    }

    #[test]
    fn both_indexes_share_records() {
        let dict = Dictionary::from_reader(Cursor::new(SAMPLE)).unwrap();
        let by_char = &dict.lookup_by_character("X").unwrap()[1];
        let by_pron = &dict.lookup_by_pronunciation("p2").unwrap()[0];
        assert!(Arc::ptr_eq(by_char, by_pron));
        assert_eq!(dict.lookup_by_pronunciation("p2").unwrap().len(), 1);
    }

    #[test]
    fn skips_malformed_and_non_utf8_lines() {
        let mut bytes = b"A\ta1\nB\tb1\t\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\t', b'x', b'\t', b'\n']);
        bytes.extend_from_slice("C\tc1\t\n".as_bytes());
        let dict = Dictionary::from_reader(Cursor::new(bytes)).unwrap();
        assert!(dict.lookup_by_character("A").is_none());
        assert!(dict.lookup_by_character("B").is_some());
        assert!(dict.lookup_by_character("C").is_some());
        assert_eq!(dict.record_count(), 2);
    }

    #[test]
    fn insert_character_leaves_pronunciation_index_alone() {
        let mut dict = Dictionary::from_reader(Cursor::new(SAMPLE)).unwrap();
        let inserted = dict.insert_character("Z", vec![Record::new("Z", "z1")]);
        assert_eq!(inserted.len(), 1);
        assert!(dict.contains_character("Z"));
        assert!(dict.lookup_by_pronunciation("z1").is_none());
        assert_eq!(dict.record_count(), 4);
    }

    #[test]
    fn insert_character_ignores_empty_batches() {
        let mut dict = Dictionary::from_reader(Cursor::new(SAMPLE)).unwrap();
        assert!(dict.insert_character("Z", Vec::new()).is_empty());
        assert!(dict.lookup_by_character("Z").is_none());
        assert!(!dict.contains_character("Z"));

        assert_eq!(dict.insert_character("X", Vec::new()).len(), 2);
        assert_eq!(dict.record_count(), 3);
    }
}
