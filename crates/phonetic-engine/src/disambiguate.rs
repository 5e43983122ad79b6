use std::sync::Arc;

use phonetic_types::{Record, strip_annotation};

/// Pick one reading of a homograph using `context`.
///
/// Candidates are tried in order. The first candidate owning a use-case
/// (with any `(...)` note removed) that occurs anywhere in `context` wins,
/// regardless of how long or specific later matches would be. With no match
/// the first candidate is the answer. Returns `None` only for an empty slice.
pub fn choose<'a>(candidates: &'a [Arc<Record>], context: &str) -> Option<&'a Arc<Record>> {
    candidates
        .iter()
        .find(|candidate| {
            candidate
                .use_cases()
                .iter()
                .any(|use_case| context.contains(strip_annotation(use_case)))
        })
        .or_else(|| candidates.first())
}
