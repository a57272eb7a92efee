//! Best score per hole
//!
//! Persisted to LocalStorage on web, a JSON file natively.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Lowest stroke count achieved on each level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScores {
    /// level id -> strokes
    pub entries: BTreeMap<u32, u32>,
}

impl BestScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mini_golf_best_scores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished hole. Returns true if it is a new best.
    pub fn record(&mut self, level_id: u32, strokes: u32) -> bool {
        if strokes == 0 {
            return false;
        }
        match self.entries.get(&level_id) {
            Some(&best) if best <= strokes => false,
            _ => {
                self.entries.insert(level_id, strokes);
                true
            }
        }
    }

    pub fn best(&self, level_id: u32) -> Option<u32> {
        self.entries.get(&level_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of bests over the given levels, if every one has been played
    pub fn total<I: IntoIterator<Item = u32>>(&self, level_ids: I) -> Option<u32> {
        level_ids.into_iter().map(|id| self.best(id)).sum()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read scores from a JSON file; empty if absent or malformed
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} best scores", scores.entries.len());
                    scores
                }
                Err(e) => {
                    log::warn!("Malformed scores in {}: {e}", path.display());
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No best scores found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Best scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load best scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = Self::from_json(&json) {
                    log::info!("Loaded {} best scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No best scores found, starting fresh");
        Self::new()
    }

    /// Save best scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), String> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| "LocalStorage unavailable".to_string())?;
        let json = serde_json::to_string(self).map_err(|e| e.to_string())?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|e| format!("{e:?}"))?;
        log::info!("Best scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Score relative to par as shown on a score card: "-1", "E", "+2"
pub fn par_delta(par: u32, strokes: u32) -> String {
    let delta = strokes as i64 - par as i64;
    match delta {
        0 => "E".to_string(),
        d if d > 0 => format!("+{d}"),
        d => d.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_minimum() {
        let mut scores = BestScores::new();
        assert!(scores.record(1, 4));
        assert!(!scores.record(1, 5));
        assert!(!scores.record(1, 4));
        assert!(scores.record(1, 2));
        assert_eq!(scores.best(1), Some(2));
        assert_eq!(scores.best(2), None);
    }

    #[test]
    fn test_zero_strokes_not_recorded() {
        let mut scores = BestScores::new();
        assert!(!scores.record(3, 0));
        assert!(scores.is_empty());
    }

    #[test]
    fn test_total_needs_every_level() {
        let mut scores = BestScores::new();
        scores.record(1, 2);
        scores.record(2, 3);
        assert_eq!(scores.total([1, 2]), Some(5));
        assert_eq!(scores.total([1, 2, 3]), None);
    }

    #[test]
    fn test_par_delta_formatting() {
        assert_eq!(par_delta(3, 2), "-1");
        assert_eq!(par_delta(3, 3), "E");
        assert_eq!(par_delta(2, 4), "+2");
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("mini_golf_scores_{}.json", std::process::id()));
        let mut scores = BestScores::new();
        scores.record(1, 2);
        scores.record(6, 5);
        scores.save_to(&path).unwrap();
        let loaded = BestScores::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, scores);
    }
}
