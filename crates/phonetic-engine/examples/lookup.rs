use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use phonetic_engine::{Annotator, DictionarySource};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let data_path = args.next().map(PathBuf::from).context(
        "usage: cargo run -p phonetic-engine --example lookup -- <data.txt> [<fallback.txt>]",
    )?;
    let fallback_path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let fallback = fallback_path
        .as_deref()
        .map(DictionarySource::load)
        .transpose()
        .context("loading fallback dictionary")?;
    let mut annotator = Annotator::open(&data_path, fallback)
        .with_context(|| format!("loading dictionary from {}", data_path.display()))?;

    println!("Dictionary: {}", data_path.display());

    let text = "wo我唔鍾意你";
    println!("\n{}", annotator.annotate_inline(text));

    println!();
    match annotator.lookup_by_character("中") {
        Some(records) => {
            let rendered: Vec<String> = records.iter().map(ToString::to_string).collect();
            println!("{}", rendered.join("\n---------\n"));
        }
        None => println!("中: not found"),
    }

    println!();
    match annotator.lookup_by_pronunciation("zung1") {
        Some(records) => {
            let characters: Vec<&str> = records.iter().map(|r| r.character.as_str()).collect();
            println!("zung1: {}", characters.join(","));
        }
        None => println!("zung1: not found"),
    }

    Ok(())
}
