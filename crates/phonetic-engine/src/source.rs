use std::path::Path;

use anyhow::Result;
use phonetic_dict::{Dictionary, StoreError};
use phonetic_types::Record;

/// Where readings for characters missing from the dictionary come from.
///
/// `fetch` may block (network, disk). An `Err` is a failed lookup; an empty
/// `Ok` means the source has nothing for this character. The annotator
/// treats both as "no reading" and never propagates them.
pub trait PronunciationSource {
    fn fetch(&self, character: char) -> Result<Vec<Record>>;
}

/// Offline: knows nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSource;

impl PronunciationSource for NoSource {
    fn fetch(&self, _character: char) -> Result<Vec<Record>> {
        Ok(Vec::new())
    }
}

/// A secondary dictionary consulted for characters the primary one lacks.
#[derive(Clone, Debug)]
pub struct DictionarySource {
    dictionary: Dictionary,
}

impl DictionarySource {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Dictionary::load(path).map(Self::new)
    }
}

impl PronunciationSource for DictionarySource {
    fn fetch(&self, character: char) -> Result<Vec<Record>> {
        let mut buf = [0u8; 4];
        let records = self
            .dictionary
            .lookup_by_character(character.encode_utf8(&mut buf))
            .unwrap_or_default();
        Ok(records.iter().map(|r| Record::clone(r)).collect())
    }
}

impl<S: PronunciationSource> PronunciationSource for Option<S> {
    fn fetch(&self, character: char) -> Result<Vec<Record>> {
        match self {
            Some(source) => source.fetch(character),
            None => Ok(Vec::new()),
        }
    }
}

impl<S: PronunciationSource + ?Sized> PronunciationSource for Box<S> {
    fn fetch(&self, character: char) -> Result<Vec<Record>> {
        (**self).fetch(character)
    }
}

impl<S: PronunciationSource + ?Sized> PronunciationSource for &S {
    fn fetch(&self, character: char) -> Result<Vec<Record>> {
        (**self).fetch(character)
    }
}
