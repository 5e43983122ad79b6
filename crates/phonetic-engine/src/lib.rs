//! Annotate text with per-character pronunciations.
//!
//! [`Annotator`] owns a [`Dictionary`], an optional [`DictionaryStore`] to
//! persist newly learned readings, and a [`PronunciationSource`] consulted
//! when a Han character is missing from the dictionary.
//!
//! # How it works
//! 1. Each code point of the input is looked up by character.
//! 2. A single reading is used as is.
//! 3. Several readings are narrowed with [`choose`], using the whole input
//!    as context.
//! 4. A missing Han character is fetched from the source; the result is
//!    indexed for the rest of the run and appended to the store.
//! 5. Anything else (punctuation, Latin, failed fetches) gets no reading.
//!
//! # Example
//! ```no_run
//! use phonetic_engine::{Annotator, NoSource};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut annotator = Annotator::open("/path/to/data.txt", NoSource)?;
//! println!("{}", annotator.annotate_inline("我唔鍾意你"));
//! for record in annotator.lookup_by_pronunciation("zung1").unwrap_or_default() {
//!     println!("{}", record.character);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p phonetic-engine --example lookup -- <data.txt>`.
//!
//! The annotator is not synchronized; share it behind a lock if several
//! threads query it.

mod disambiguate;
mod source;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use phonetic_dict::{Dictionary, DictionaryStore, StoreError};
use phonetic_types::{Record, is_han};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use disambiguate::choose;
pub use source::{DictionarySource, NoSource, PronunciationSource};

#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Annotator<S = NoSource> {
    dictionary: Dictionary,
    store: Option<DictionaryStore>,
    source: S,
}

impl<S: PronunciationSource> Annotator<S> {
    /// Load the dictionary at `path` and persist learned readings back to it.
    pub fn open(path: impl AsRef<Path>, source: S) -> Result<Self, AnnotatorError> {
        let store = DictionaryStore::new(path.as_ref());
        let dictionary = store.load()?;
        Ok(Self::new(dictionary, Some(store), source))
    }

    /// Assemble an annotator from parts. Without a store, fetched readings
    /// live only in memory.
    pub fn new(dictionary: Dictionary, store: Option<DictionaryStore>, source: S) -> Self {
        Self {
            dictionary,
            store,
            source,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn store(&self) -> Option<&DictionaryStore> {
        self.store.as_ref()
    }

    /// One slot per code point of `text`, holding the chosen reading or
    /// `None`.
    pub fn annotate(&mut self, text: &str) -> Vec<Option<String>> {
        let mut misses = HashSet::new();
        text.chars()
            .map(|c| self.resolve(c, text, &mut misses))
            .collect()
    }

    /// `text` with each annotated character followed by `(reading)`.
    pub fn annotate_inline(&mut self, text: &str) -> String {
        let slots = self.annotate(text);
        render_inline(text, &slots)
    }

    pub fn lookup_by_character(&self, character: &str) -> Option<&[Arc<Record>]> {
        self.dictionary.lookup_by_character(character)
    }

    /// Reverse lookup. Readings learned from the source during this run are
    /// not included until the store is reloaded.
    pub fn lookup_by_pronunciation(&self, pronunciation: &str) -> Option<&[Arc<Record>]> {
        self.dictionary.lookup_by_pronunciation(pronunciation)
    }

    /// Append `records` to the store (if any), then index them under
    /// `character`. Nothing is indexed when the append fails.
    pub fn insert_and_persist(
        &mut self,
        character: char,
        records: Vec<Record>,
    ) -> Result<&[Arc<Record>], AnnotatorError> {
        let records = rekey(character, records);
        self.persist(&records)?;
        Ok(self.index(character, records))
    }

    fn resolve(&mut self, c: char, context: &str, misses: &mut HashSet<char>) -> Option<String> {
        let mut buf = [0u8; 4];
        if let Some(candidates) = self.dictionary.lookup_by_character(c.encode_utf8(&mut buf)) {
            return pick(candidates, context);
        }
        if !is_han(c) || misses.contains(&c) {
            return None;
        }
        match self.augment(c) {
            Some(candidates) => pick(candidates, context),
            None => {
                misses.insert(c);
                None
            }
        }
    }

    /// Fetch readings for an unknown character. The in-memory index is
    /// updated even if persisting fails.
    fn augment(&mut self, c: char) -> Option<&[Arc<Record>]> {
        let records = match self.source.fetch(c) {
            Ok(records) if !records.is_empty() => rekey(c, records),
            Ok(_) => {
                debug!("no readings found for {c}");
                return None;
            }
            Err(err) => {
                warn!("pronunciation lookup for {c} failed: {err:#}");
                return None;
            }
        };
        if let Err(err) = self.persist(&records) {
            warn!("keeping readings for {c} in memory only: {err}");
        }
        info!("learned {} readings for {c}", records.len());
        Some(self.index(c, records))
    }

    fn persist(&self, records: &[Record]) -> Result<(), StoreError> {
        match &self.store {
            Some(store) => store.append(records),
            None => Ok(()),
        }
    }

    fn index(&mut self, c: char, records: Vec<Record>) -> &[Arc<Record>] {
        let mut buf = [0u8; 4];
        self.dictionary
            .insert_character(c.encode_utf8(&mut buf), records)
    }
}

/// Interleave `text` with `(reading)` after every slot that has one.
pub fn render_inline(text: &str, slots: &[Option<String>]) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for (c, slot) in text.chars().zip(slots) {
        out.push(c);
        if let Some(pronunciation) = slot {
            out.push('(');
            out.push_str(pronunciation);
            out.push(')');
        }
    }
    out
}

fn pick(candidates: &[Arc<Record>], context: &str) -> Option<String> {
    let chosen = match candidates {
        [only] => only,
        _ => choose(candidates, context)?,
    };
    Some(chosen.pronunciation.clone())
}

/// File records under the character they were fetched for.
fn rekey(c: char, mut records: Vec<Record>) -> Vec<Record> {
    let mut buf = [0u8; 4];
    let key = c.encode_utf8(&mut buf);
    for record in &mut records {
        if record.character != *key {
            record.character = key.to_string();
        }
    }
    records
}
