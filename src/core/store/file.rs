//! Plain-text backend: one `<collection>.txt` per kind

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{decode_lines, Record, Store, StoreError};

/// Stores each kind as a pipe-delimited text file inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the data directory, creating it when missing
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `R`'s kind
    pub fn path_for<R: Record>(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", R::KIND.collection()))
    }
}

impl Store for FileStore {
    fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let path = self.path_for::<R>();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let records = decode_lines(R::KIND, contents.lines());
        debug!(kind = %R::KIND, count = records.len(), path = %path.display(), "loaded records");
        Ok(records)
    }

    fn save_all<R: Record>(&mut self, records: &[R]) -> Result<(), StoreError> {
        let path = self.path_for::<R>();
        let tmp = path.with_extension("txt.tmp");

        let mut body = String::new();
        for record in records {
            body.push_str(&record.encode());
            body.push('\n');
        }

        // Full rewrite through a sibling file so a crash never leaves half a collection
        let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(body.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;

        debug!(kind = %R::KIND, count = records.len(), path = %path.display(), "saved records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::test_support::Note;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        let notes: Vec<Note> = store.load_all().unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        let notes = vec![Note::new("D001", "first|line"), Note::new("D002", "a\nb")];
        store.save_all(&notes).unwrap();

        assert!(tmp.path().join("departments.txt").exists());
        let loaded: Vec<Note> = store.load_all().unwrap();
        assert_eq!(loaded, notes);
    }

    #[test]
    fn test_save_overwrites() {
        let tmp = tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        store
            .save_all(&[Note::new("D001", "x"), Note::new("D002", "y")])
            .unwrap();
        store.save_all(&[Note::new("D003", "z")]).unwrap();

        let loaded: Vec<Note> = store.load_all().unwrap();
        assert_eq!(loaded, vec![Note::new("D003", "z")]);
        assert!(!tmp.path().join("departments.txt.tmp").exists());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join("departments.txt"),
            "D001|ok\nbroken line with no separator\n\nD002|also ok|extra\nD003|fine\n",
        )
        .unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        let loaded: Vec<Note> = store.load_all().unwrap();
        let ids: Vec<&str> = loaded.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["D001", "D003"]);
    }

    #[test]
    fn test_open_creates_directory() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("a/b/data");
        let store = FileStore::open(&nested).unwrap();
        assert!(store.dir().is_dir());
    }
}
