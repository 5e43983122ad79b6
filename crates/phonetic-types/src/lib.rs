//! Shared types for character-to-pronunciation dictionaries.
//!
//! A [`Record`] is one dictionary entry: a single character, one romanized
//! reading (for example a Jyutping syllable with its tone digit), and the
//! free-text annotation split into example use-cases and an explanation.
//! [`Classification`] carries the flags derived from that annotation.
//!
//! Helpers such as [`is_han`] and [`strip_annotation`] are shared by the
//! loader and the annotation engine so both agree on what a "character" is
//! and how a use-case is compared against context.
//!
//! ```rust
//! use phonetic_types::{Record, is_han, strip_annotation};
//!
//! let record = Record::new("行", "hang4").with_use_cases(["行路", "銀行(金融)"]);
//! assert_eq!(record.use_cases.as_deref().map(<[String]>::len), Some(2));
//! assert_eq!(strip_annotation("銀行(金融)"), "銀行");
//! assert!(is_han('行'));
//! assert!(!is_han('x'));
//! ```

use std::fmt;

/// Full-width comma separating use-cases within an annotation.
pub const USE_CASE_SEPARATOR: char = '，';

/// Full-width semicolon separating use-cases from the explanation.
pub const CLAUSE_SEPARATOR: char = '；';

/// Flags derived from an entry's annotation text. Not mutually exclusive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Classification {
    /// Alternative (異讀) reading of the character.
    pub variant_reading: bool,
    /// Reading specific to colloquial Cantonese usage.
    pub cantonese_specific: bool,
    /// Reading used in personal names, surnames, or place names.
    pub proper_noun_reading: bool,
    /// Character used as a substitute for another character (通假).
    pub interchangeable_character: bool,
}

impl Classification {
    /// True when any named flag is set.
    pub fn any(&self) -> bool {
        self.variant_reading
            || self.cantonese_specific
            || self.proper_noun_reading
            || self.interchangeable_character
    }
}

/// One `(character, pronunciation, annotation)` dictionary entry.
///
/// Records are built once by the parser (or by an external source) and are
/// shared read-only afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub character: String,
    pub pronunciation: String,
    /// Short example strings in which this reading applies, in source order.
    pub use_cases: Option<Vec<String>>,
    pub explanation: Option<String>,
    pub flags: Classification,
}

impl Record {
    pub fn new(character: impl Into<String>, pronunciation: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            pronunciation: pronunciation.into(),
            use_cases: None,
            explanation: None,
            flags: Classification::default(),
        }
    }

    pub fn with_use_cases<I, S>(mut self, use_cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.use_cases = Some(use_cases.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Use-cases as a slice, empty when the entry has none.
    pub fn use_cases(&self) -> &[String] {
        self.use_cases.as_deref().unwrap_or(&[])
    }
}

/// Renders `character<TAB>pronunciation`, then the explanation and the
/// use-cases joined by [`USE_CASE_SEPARATOR`] on their own lines.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.character, self.pronunciation)?;
        if let Some(explanation) = self.explanation.as_deref().filter(|e| !e.is_empty()) {
            write!(f, "\n{explanation}")?;
        }
        if !self.use_cases().is_empty() {
            let mut sep = [0u8; 4];
            let sep = USE_CASE_SEPARATOR.encode_utf8(&mut sep);
            write!(f, "\n{}", self.use_cases().join(sep))?;
        }
        Ok(())
    }
}

/// Whether `c` falls in the Han ideograph ranges that carry dictionary readings.
///
/// Punctuation, Latin letters, digits and kana are outside the range and never
/// trigger an external lookup.
pub fn is_han(c: char) -> bool {
    matches!(c as u32,
        0x3400..=0x4DBF       // Extension A
        | 0x4E00..=0x9FFF     // Unified Ideographs
        | 0xF900..=0xFAFF     // Compatibility Ideographs
        | 0x20000..=0x2EBEF   // Extensions B-F
        | 0x30000..=0x3134F   // Extension G
    )
}

/// Drop a trailing parenthetical note from a use-case: everything from the
/// first ASCII `(` onward.
pub fn strip_annotation(use_case: &str) -> &str {
    match use_case.find('(') {
        Some(idx) => &use_case[..idx],
        None => use_case,
    }
}
