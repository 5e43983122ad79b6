use std::sync::LazyLock;

use phonetic_types::{CLAUSE_SEPARATOR, Classification, Record, USE_CASE_SEPARATOR};
use regex::Regex;

/// What a matched annotation pattern contributes to classification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Marker {
    Variant,
    Interchangeable,
    Cantonese,
    ProperNoun,
    /// Auxiliary-word note: sets no flag but still counts as classified.
    Auxiliary,
}

/// Pattern battery, evaluated in this order against every annotation.
static RULES: LazyLock<Vec<(Regex, Marker)>> = LazyLock::new(|| {
    [
        ("异读字|異讀字", Marker::Variant),
        ("同「.」字|通「.」字", Marker::Interchangeable),
        ("粤语用字|粵語用字", Marker::Cantonese),
        (
            "人名|地名|姓氏|复姓|複姓|县名|縣名|国名|國名",
            Marker::ProperNoun,
        ),
        ("助词|助詞", Marker::Auxiliary),
    ]
    .into_iter()
    .map(|(pattern, marker)| (Regex::new(pattern).expect("static pattern compiles"), marker))
    .collect()
});

/// How an annotation is divided between use-cases and explanation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Layout<'a> {
    /// `uc1，uc2；explanation...`
    Clauses {
        use_cases: &'a str,
        explanation: &'a str,
    },
    /// The whole annotation is a note.
    Explanation(&'a str),
    /// The whole annotation is a list of use-cases.
    UseCases(&'a str),
}

/// Run the pattern battery. The boolean is true when any pattern matched,
/// including patterns that carry no named flag.
fn scan(annotation: &str) -> (Classification, bool) {
    let mut flags = Classification::default();
    let mut matched = false;
    for (pattern, marker) in RULES.iter() {
        if !pattern.is_match(annotation) {
            continue;
        }
        matched = true;
        match marker {
            Marker::Variant => flags.variant_reading = true,
            Marker::Interchangeable => flags.interchangeable_character = true,
            Marker::Cantonese => flags.cantonese_specific = true,
            Marker::ProperNoun => flags.proper_noun_reading = true,
            Marker::Auxiliary => {}
        }
    }
    (flags, matched)
}

/// Classification flags for a raw annotation.
pub fn classify(annotation: &str) -> Classification {
    scan(annotation).0
}

/// The clause test runs before the classification test: an annotation with
/// a semicolon is split even when it also carries a marker.
pub(crate) fn layout(annotation: &str, classified: bool) -> Layout<'_> {
    match annotation.split_once(CLAUSE_SEPARATOR) {
        Some((head, rest)) if !head.starts_with('(') => Layout::Clauses {
            use_cases: head,
            explanation: rest,
        },
        _ if classified => Layout::Explanation(annotation),
        _ => Layout::UseCases(annotation),
    }
}

fn split_use_cases(raw: &str) -> Vec<String> {
    raw.split(USE_CASE_SEPARATOR).map(str::to_string).collect()
}

/// Parse one `character<TAB>pronunciation<TAB>annotation` line.
///
/// Returns `None` for anything that does not split into exactly three
/// fields. Surrounding whitespace other than tabs is stripped, so a trailing
/// empty annotation field is still a valid line.
pub fn parse_line(line: &str) -> Option<Record> {
    let line = line
        .trim_start_matches('\u{feff}')
        .trim_matches(|c: char| c.is_whitespace() && c != '\t');
    let mut fields = line.split('\t');
    let (Some(character), Some(pronunciation), Some(annotation), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return None;
    };

    let mut record = Record::new(character, pronunciation);
    if annotation.is_empty() {
        return Some(record);
    }

    let (flags, classified) = scan(annotation);
    record.flags = flags;
    match layout(annotation, classified) {
        Layout::Clauses {
            use_cases,
            explanation,
        } => {
            record.use_cases = Some(split_use_cases(use_cases));
            record.explanation = Some(explanation.to_string());
        }
        Layout::Explanation(text) => record.explanation = Some(text.to_string()),
        Layout::UseCases(text) => record.use_cases = Some(split_use_cases(text)),
    }
    Some(record)
}

/// Inverse of [`parse_line`] for persistence, without a line terminator.
///
/// The third field rebuilds the annotation from whichever parts are present
/// (`use-cases；explanation`, the explanation alone, or the use-cases alone)
/// and is empty when the record has neither. Tabs and line breaks inside
/// fields are replaced with spaces so the record stays on one line.
pub fn format_line(record: &Record) -> String {
    let annotation = match (record.use_cases.as_deref(), record.explanation.as_deref()) {
        (Some(use_cases), Some(explanation)) => format!(
            "{}{CLAUSE_SEPARATOR}{explanation}",
            join_use_cases(use_cases)
        ),
        (None, Some(explanation)) => explanation.to_string(),
        (Some(use_cases), None) => join_use_cases(use_cases),
        (None, None) => String::new(),
    };
    format!(
        "{}\t{}\t{}",
        sanitize(&record.character),
        sanitize(&record.pronunciation),
        sanitize(&annotation)
    )
}

fn join_use_cases(use_cases: &[String]) -> String {
    let mut sep = [0u8; 4];
    use_cases.join(USE_CASE_SEPARATOR.encode_utf8(&mut sep))
}

fn sanitize(field: &str) -> String {
    field.replace(['\t', '\r', '\n'], " ")
}
