use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use phonetic_types::Record;
use thiserror::Error;
use tracing::info;

use crate::Dictionary;
use crate::parse::format_line;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read dictionary {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to append to dictionary {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read dictionary: {0}")]
    Io(#[from] io::Error),
}

/// File-backed dictionary: one tab-separated entry per line, grown by
/// appending.
///
/// There is no locking; callers that share a store across threads must
/// serialize `append` themselves.
#[derive(Clone, Debug)]
pub struct DictionaryStore {
    path: PathBuf,
}

impl DictionaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and index the whole file. A missing or unreadable file is an
    /// error; malformed lines inside it are not.
    pub fn load(&self) -> Result<Dictionary, StoreError> {
        let read_err = |source| StoreError::Read {
            path: self.path.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(read_err)?;
        let dictionary = Dictionary::from_reader(BufReader::new(file)).map_err(|e| match e {
            StoreError::Io(source) => read_err(source),
            other => other,
        })?;
        info!(
            "loaded {} records for {} characters from {}",
            dictionary.record_count(),
            dictionary.character_count(),
            self.path.display()
        );
        Ok(dictionary)
    }

    /// Append records in the line format read by [`load`](Self::load),
    /// creating the file if needed.
    pub fn append(&self, records: &[Record]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        self.append_lines(records).map_err(|source| StoreError::Append {
            path: self.path.clone(),
            source,
        })?;
        info!(
            "appended {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn append_lines(&self, records: &[Record]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;
        let needs_newline = ends_without_newline(&mut file)?;

        let mut writer = BufWriter::new(file);
        if needs_newline {
            writer.write_all(b"\n")?;
        }
        for record in records {
            writeln!(writer, "{}", format_line(record))?;
        }
        writer.flush()
    }
}

fn ends_without_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DictionaryStore::new(dir.path().join("absent.txt"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert!(err.to_string().contains("absent.txt"));
    }

    #[test]
    fn append_creates_file_and_repairs_missing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "中\tzung1\t中間").unwrap();

        let store = DictionaryStore::new(&path);
        store
            .append(&[Record::new("嘅", "ge3").with_explanation("粵語用字")])
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "中\tzung1\t中間\n嘅\tge3\t粵語用字\n");

        let dictionary = store.load().unwrap();
        assert_eq!(dictionary.record_count(), 2);
        assert!(dictionary.lookup_by_character("嘅").is_some());
    }

    #[test]
    fn append_nothing_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        let store = DictionaryStore::new(&path);
        store.append(&[]).unwrap();
        assert!(!path.exists());
    }
}
