//! Durable monitor state.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::status::Classification;

/// The record carried between invocations.
///
/// A fresh install, like an unreadable file, starts from `UNKNOWN` with no
/// heartbeat on record. Overlapping scheduled runs can race on the backing
/// file; last write wins, which the coarse scheduling cadence tolerates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonitorState {
    #[serde(default)]
    pub last_status: Classification,
    #[serde(default)]
    pub last_heartbeat_date: Option<NaiveDate>,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to write state file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence seam for [`MonitorState`]. The decision logic never knows
/// the backing medium.
pub trait StateStore {
    /// Loads the persisted state, falling back to the default on a missing
    /// or unreadable record.
    fn load(&self) -> MonitorState;

    fn save(&self, state: &MonitorState) -> Result<(), StateError>;
}

/// JSON file store at a fixed path relative to the working directory.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> MonitorState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return MonitorState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "State file unreadable. Starting from the default state.");
                return MonitorState::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "State file malformed. Starting from the default state.");
                MonitorState::default()
            }
        }
    }

    fn save(&self, state: &MonitorState) -> Result<(), StateError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        // Write-then-rename so a crash mid-save never leaves a truncated file.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, state)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| StateError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        let state = store.load();
        assert_eq!(state.last_status, Classification::Unknown);
        assert_eq!(state.last_heartbeat_date, None);
    }

    #[test]
    fn malformed_file_loads_default_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json at all").unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.load(), MonitorState::default());
    }

    #[test]
    fn saved_state_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        let state = MonitorState {
            last_status: Classification::Problem,
            last_heartbeat_date: NaiveDate::from_ymd_opt(2026, 8, 7),
        };

        store.save(&state).unwrap();
        assert_eq!(store.load(), state);
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "old garbage").unwrap();

        let store = FileStateStore::new(&path);
        let state = MonitorState {
            last_status: Classification::Normal,
            last_heartbeat_date: None,
        };
        store.save(&state).unwrap();
        assert_eq!(store.load(), state);
    }

    #[test]
    fn state_file_keeps_the_historical_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStateStore::new(&path);
        store
            .save(&MonitorState {
                last_status: Classification::Normal,
                last_heartbeat_date: NaiveDate::from_ymd_opt(2026, 8, 7),
            })
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"last_status\": \"NORMAL\""));
        assert!(raw.contains("\"last_heartbeat_date\": \"2026-08-07\""));
    }
}
