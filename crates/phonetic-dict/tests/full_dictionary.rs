use std::env;
use std::path::PathBuf;

use phonetic_dict::Dictionary;

fn data_path() -> Option<PathBuf> {
    env::var("PHONETIC_DATA").ok().map(PathBuf::from)
}

#[test]
fn loads_full_dictionary() {
    let Some(path) = data_path() else {
        eprintln!("skipping: PHONETIC_DATA not set");
        return;
    };
    let dict = Dictionary::load(&path).expect("load full dictionary");

    assert!(dict.character_count() > 1_000, "too few characters");
    assert!(dict.lookup_by_character("中").is_some());
    assert!(dict.lookup_by_pronunciation("zung1").is_some());
}
