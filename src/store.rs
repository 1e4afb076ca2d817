//! Persistent key-value store backed by per-record JSON files.
//!
//! Two records exist today: the task ledger and the category ledger. A
//! record loads from `<key>.json` in the data directory when that file is
//! present, and from the bundled seed data otherwise. Saves rewrite the
//! whole record; there are no partial writes, no transactions, and no
//! schema versioning.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Record key for the task ledger.
pub const TASKS: &str = "tasks";
/// Record key for the category ledger.
pub const CATEGORIES: &str = "categories";

/// Starter data served until the corresponding record is first persisted.
pub const TASK_SEED: &str = include_str!("../seeds/tasks.json");
pub const CATEGORY_SEED: &str = include_str!("../seeds/categories.json");

/// Handle on the data directory holding the persisted records.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open a store over `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Store { dir })
    }

    /// Directory the record files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load the record under `key`, falling back to `seed` when nothing
    /// has been persisted yet. A record that exists but fails to parse is
    /// an error, not a reason to fall back.
    pub fn load<T: DeserializeOwned>(&self, key: &str, seed: &str) -> Result<T> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(serde_json::from_str(seed)?);
        }
        let mut buf = String::new();
        File::open(&path).and_then(|mut f| f.read_to_string(&mut buf))?;
        Ok(serde_json::from_str(&buf)?)
    }

    /// Replace the record under `key` with `value`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        // Atomic-ish write via temp + rename.
        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(value)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        count: u32,
        names: Vec<String>,
    }

    const SEED: &str = r#"{ "count": 7, "names": ["seed"] }"#;

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let record = Record { count: 2, names: vec!["a".into(), "b".into()] };
        store.save("record", &record).unwrap();
        let loaded: Record = store.load("record", SEED).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn missing_record_falls_back_to_seed() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let loaded: Record = store.load("record", SEED).unwrap();
        assert_eq!(loaded, Record { count: 7, names: vec!["seed".into()] });
        // A plain read never writes the seed back.
        assert!(!dir.path().join("record.json").exists());
    }

    #[test]
    fn save_replaces_the_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.save("record", &Record { count: 1, names: vec![] }).unwrap();
        store.save("record", &Record { count: 2, names: vec![] }).unwrap();
        let loaded: Record = store.load("record", SEED).unwrap();
        assert_eq!(loaded.count, 2);
        assert!(!dir.path().join("record.json.tmp").exists());
    }

    #[test]
    fn corrupt_record_surfaces_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("record.json"), "not json").unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(store.load::<Record>("record", SEED).is_err());
    }
}
