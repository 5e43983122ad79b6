use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use phonetic_dict::DictionaryStore;

fn main() -> Result<()> {
    let data_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p phonetic-dict --example stats -- <path-to-data.txt>")?;

    let dict = DictionaryStore::new(&data_path)
        .load()
        .with_context(|| format!("loading dictionary from {}", data_path.display()))?;

    let mut use_case_count = 0usize;
    let mut explained = 0usize;
    let mut variant = 0usize;
    let mut cantonese = 0usize;
    let mut proper_noun = 0usize;
    let mut interchangeable = 0usize;
    let mut homographs = 0usize;
    let mut classified = 0usize;

    for character in dict.characters() {
        let readings = dict.lookup_by_character(character).unwrap_or_default();
        if readings.len() > 1 {
            homographs += 1;
        }
        for record in readings {
            use_case_count += record.use_cases().len();
            explained += usize::from(record.explanation.is_some());
            variant += usize::from(record.flags.variant_reading);
            cantonese += usize::from(record.flags.cantonese_specific);
            proper_noun += usize::from(record.flags.proper_noun_reading);
            interchangeable += usize::from(record.flags.interchangeable_character);
            classified += usize::from(record.flags.any());
        }
    }

    println!("Dictionary: {}", data_path.display());
    println!("Records        : {}", dict.record_count());
    println!("Characters     : {}", dict.character_count());
    println!("Pronunciations : {}", dict.pronunciation_count());
    println!("Homographs     : {}", homographs);
    println!("Use-cases      : {}", use_case_count);
    println!("With notes     : {}", explained);
    println!("Variant        : {}", variant);
    println!("Cantonese      : {}", cantonese);
    println!("Proper noun    : {}", proper_noun);
    println!("Interchangeable: {}", interchangeable);
    println!("Any flag       : {}", classified);

    for character in ["中", "行"] {
        println!(
            "Readings of '{}': {}",
            character,
            dict.lookup_by_character(character).map_or(0, <[_]>::len)
        );
    }

    Ok(())
}
