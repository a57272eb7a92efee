//! Where finished holes are reported
//!
//! The session hands `(level_id, strokes)` to a `ScoreSink` when the ball
//! drops. Sinks are best effort: errors are logged by the caller and never
//! change the state of play.

use std::fmt;
use std::path::PathBuf;

use crate::highscores::BestScores;

/// Failure to store a score
#[derive(Debug)]
pub enum ScoreError {
    /// Backing store could not be reached
    Unavailable(String),
    Io(std::io::Error),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::Unavailable(reason) => write!(f, "score store unavailable: {reason}"),
            ScoreError::Io(e) => write!(f, "score store I/O error: {e}"),
        }
    }
}

impl std::error::Error for ScoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoreError::Io(e) => Some(e),
            ScoreError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for ScoreError {
    fn from(e: std::io::Error) -> Self {
        ScoreError::Io(e)
    }
}

/// Receives completed holes
pub trait ScoreSink {
    fn submit_score(&mut self, level_id: u32, strokes: u32) -> Result<(), ScoreError>;
}

/// Backing location for a `LocalScoreStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreLocation {
    /// Browser LocalStorage (wasm only)
    Browser,
    File(PathBuf),
    /// Kept in memory only
    Memory,
}

/// Best scores kept locally and written back after every new best
#[derive(Debug, Clone)]
pub struct LocalScoreStore {
    scores: BestScores,
    location: ScoreLocation,
}

impl LocalScoreStore {
    pub fn in_memory() -> Self {
        Self {
            scores: BestScores::new(),
            location: ScoreLocation::Memory,
        }
    }

    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            scores: BestScores::load_from(&path),
            location: ScoreLocation::File(path),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn open_browser() -> Self {
        Self {
            scores: BestScores::load(),
            location: ScoreLocation::Browser,
        }
    }

    pub fn scores(&self) -> &BestScores {
        &self.scores
    }

    pub fn location(&self) -> &ScoreLocation {
        &self.location
    }

    fn flush(&self) -> Result<(), ScoreError> {
        match &self.location {
            ScoreLocation::Memory => Ok(()),
            ScoreLocation::File(path) => Ok(self.scores.save_to(path)?),
            #[cfg(target_arch = "wasm32")]
            ScoreLocation::Browser => self.scores.save().map_err(ScoreError::Unavailable),
            #[cfg(not(target_arch = "wasm32"))]
            ScoreLocation::Browser => Err(ScoreError::Unavailable(
                "LocalStorage requires a browser".to_string(),
            )),
        }
    }
}

impl ScoreSink for LocalScoreStore {
    fn submit_score(&mut self, level_id: u32, strokes: u32) -> Result<(), ScoreError> {
        if !self.scores.record(level_id, strokes) {
            log::debug!("Level {level_id}: {strokes} strokes is not a new best");
            return Ok(());
        }
        log::info!("New best on level {level_id}: {strokes} strokes");
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_records_best() {
        let mut store = LocalScoreStore::in_memory();
        store.submit_score(2, 5).unwrap();
        store.submit_score(2, 3).unwrap();
        store.submit_score(2, 4).unwrap();
        assert_eq!(store.scores().best(2), Some(3));
    }

    #[test]
    fn test_file_store_persists_new_best() {
        let path = std::env::temp_dir().join(format!("mini_golf_store_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut store = LocalScoreStore::open_file(&path);
            store.submit_score(1, 2).unwrap();
        }
        let reopened = LocalScoreStore::open_file(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(reopened.scores().best(1), Some(2));
    }

    #[test]
    fn test_unwritable_file_reports_io_error() {
        let mut store = LocalScoreStore::open_file("/nonexistent/mini_golf/scores.json");
        let err = store.submit_score(1, 2).unwrap_err();
        assert!(matches!(err, ScoreError::Io(_)));
        // The best is still held in memory
        assert_eq!(store.scores().best(1), Some(2));
    }
}
