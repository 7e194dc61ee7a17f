//! High score persistence
//!
//! A single best-score record per save file, stored as JSON. Loading
//! degrades to a fresh record on any I/O or parse failure so a corrupt
//! file can never prevent a run from starting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The persisted record
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScoreRecord {
    pub high_score: u64,
    /// Difficulty label the score was achieved on ("easy", "normal", "hard")
    #[serde(default)]
    pub difficulty: String,
}

/// File-backed store for the best score
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
    record: HighScoreRecord,
}

impl HighScoreStore {
    /// Open the store at `path`, loading the existing record if one is
    /// readable and falling back to an empty record otherwise.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let record = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<HighScoreRecord>(&json) {
                Ok(record) => {
                    log::info!("loaded high score {} from {:?}", record.high_score, path);
                    record
                }
                Err(e) => {
                    log::warn!("unreadable high score file {:?}: {}", path, e);
                    HighScoreRecord::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HighScoreRecord::default(),
            Err(e) => {
                log::warn!("failed to read {:?}: {}", path, e);
                HighScoreRecord::default()
            }
        };
        Self { path, record }
    }

    pub fn high_score(&self) -> u64 {
        self.record.high_score
    }

    /// Record a finished run. The file is rewritten only when the score
    /// beats the stored best; returns whether it did.
    pub fn submit(&mut self, score: u64, difficulty: &str) -> io::Result<bool> {
        if score <= self.record.high_score {
            return Ok(false);
        }
        self.record = HighScoreRecord {
            high_score: score,
            difficulty: difficulty.to_string(),
        };
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)?;
        log::info!("high score saved ({})", self.record.high_score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HighScoreStore::open(dir.path().join("scores.json"));
        assert_eq!(store.high_score(), 0);
    }

    #[test]
    fn test_submit_persists_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.json");

        let mut store = HighScoreStore::open(&path);
        assert!(store.submit(420, "normal").expect("write"));
        assert_eq!(store.high_score(), 420);

        let reloaded = HighScoreStore::open(&path);
        assert_eq!(reloaded.high_score(), 420);
    }

    #[test]
    fn test_lower_score_does_not_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.json");

        let mut store = HighScoreStore::open(&path);
        assert!(store.submit(300, "hard").expect("write"));
        assert!(!store.submit(300, "hard").expect("write"));
        assert!(!store.submit(100, "easy").expect("write"));

        let reloaded = HighScoreStore::open(&path);
        assert_eq!(reloaded.high_score(), 300);
    }

    #[test]
    fn test_corrupt_file_degrades_to_fresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "not json at all").expect("seed file");

        let store = HighScoreStore::open(&path);
        assert_eq!(store.high_score(), 0);
    }
}
