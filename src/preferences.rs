// src/preferences.rs
use crate::models::Stock;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const WATCHLIST_KEY: &str = "watchlist";
pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value pairs kept in one JSON object on disk. Every write
/// rewrites the whole file, so the last writer wins.
#[derive(Debug, Default)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn in_memory() -> Self {
        LocalStorage::default()
    }

    /// Loads `path` if it exists. A file that can't be read or parsed is
    /// logged and the store starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable preferences in {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No preferences at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Failed to read preferences from {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        LocalStorage {
            path: Some(path),
            entries,
        }
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Writes the updated map to disk first; memory only changes once the
    /// write has succeeded.
    pub fn set_item(&mut self, key: &str, value: String) -> Result<(), PreferencesError> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value);
        self.flush(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), PreferencesError> {
        if let Some(path) = &self.path {
            let text = serde_json::to_string_pretty(entries)?;
            fs::write(path, text)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesSnapshot {
    pub watchlist: Vec<String>,
    pub dark_mode: bool,
}

#[derive(Debug, Default)]
pub struct Preferences {
    storage: LocalStorage,
}

impl Preferences {
    pub fn new(storage: LocalStorage) -> Self {
        Preferences { storage }
    }

    pub fn watchlist(&self) -> Vec<String> {
        let Some(raw) = self.storage.get_item(WATCHLIST_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!("Discarding malformed watchlist {:?}: {}", raw, e);
            Vec::new()
        })
    }

    fn save_watchlist(&mut self, symbols: &[String]) -> Result<(), PreferencesError> {
        let raw = serde_json::to_string(symbols)?;
        self.storage.set_item(WATCHLIST_KEY, raw)
    }

    /// Returns false without touching storage when the symbol is already
    /// on the list.
    pub fn add_to_watchlist(&mut self, symbol: &str) -> Result<bool, PreferencesError> {
        let mut symbols = self.watchlist();
        if symbols.iter().any(|s| s == symbol) {
            return Ok(false);
        }
        symbols.push(symbol.to_string());
        self.save_watchlist(&symbols)?;
        Ok(true)
    }

    /// Returns whether the symbol was on the list. The list is written back
    /// either way.
    pub fn remove_from_watchlist(&mut self, symbol: &str) -> Result<bool, PreferencesError> {
        let mut symbols = self.watchlist();
        let before = symbols.len();
        symbols.retain(|s| s != symbol);
        self.save_watchlist(&symbols)?;
        Ok(symbols.len() != before)
    }

    pub fn is_dark_mode(&self) -> bool {
        self.storage.get_item(DARK_MODE_KEY) == Some("true")
    }

    pub fn toggle_dark_mode(&mut self) -> Result<bool, PreferencesError> {
        let dark_mode = !self.is_dark_mode();
        self.storage.set_item(DARK_MODE_KEY, dark_mode.to_string())?;
        Ok(dark_mode)
    }

    pub fn snapshot(&self) -> PreferencesSnapshot {
        PreferencesSnapshot {
            watchlist: self.watchlist(),
            dark_mode: self.is_dark_mode(),
        }
    }
}

/// Catalogue stocks on the watchlist, in catalogue order.
pub fn resolve_watchlist(stocks: &[Stock], symbols: &[String]) -> Vec<Stock> {
    stocks
        .iter()
        .filter(|stock| symbols.contains(&stock.symbol))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "stock_desk_prefs_{}_{}.json",
            std::process::id(),
            name
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn adding_twice_is_a_no_op() {
        let mut prefs = Preferences::default();
        assert!(prefs.add_to_watchlist("AAPL").unwrap());
        assert!(!prefs.add_to_watchlist("AAPL").unwrap());
        assert_eq!(prefs.watchlist(), vec!["AAPL"]);
    }

    #[test]
    fn removing_absent_symbol_is_a_no_op() {
        let mut prefs = Preferences::default();
        prefs.add_to_watchlist("MSFT").unwrap();
        assert!(!prefs.remove_from_watchlist("TSLA").unwrap());
        assert_eq!(prefs.watchlist(), vec!["MSFT"]);
        assert!(prefs.remove_from_watchlist("MSFT").unwrap());
        assert!(prefs.watchlist().is_empty());
    }

    #[test]
    fn dark_mode_toggles() {
        let mut prefs = Preferences::default();
        assert!(!prefs.is_dark_mode());
        assert!(prefs.toggle_dark_mode().unwrap());
        assert!(!prefs.toggle_dark_mode().unwrap());
    }

    #[test]
    fn values_survive_reopening() {
        let path = temp_path("reopen");
        {
            let mut prefs = Preferences::new(LocalStorage::open(&path));
            prefs.add_to_watchlist("NFLX").unwrap();
            prefs.add_to_watchlist("V").unwrap();
            prefs.toggle_dark_mode().unwrap();
        }

        let storage = LocalStorage::open(&path);
        assert_eq!(storage.get_item(WATCHLIST_KEY), Some(r#"["NFLX","V"]"#));
        assert_eq!(storage.get_item(DARK_MODE_KEY), Some("true"));

        let prefs = Preferences::new(storage);
        assert_eq!(
            prefs.snapshot(),
            PreferencesSnapshot {
                watchlist: vec!["NFLX".to_string(), "V".to_string()],
                dark_mode: true,
            }
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json").unwrap();
        let prefs = Preferences::new(LocalStorage::open(&path));
        assert!(prefs.watchlist().is_empty());
        assert!(!prefs.is_dark_mode());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_write_leaves_values_unchanged() {
        let path = std::env::temp_dir()
            .join(format!("stock_desk_missing_dir_{}", std::process::id()))
            .join("prefs.json");
        let mut prefs = Preferences::new(LocalStorage::open(&path));

        assert!(matches!(
            prefs.toggle_dark_mode(),
            Err(PreferencesError::Io(_))
        ));
        assert!(!prefs.is_dark_mode());
        assert!(prefs.add_to_watchlist("AAPL").is_err());
        assert!(prefs.watchlist().is_empty());
    }

    #[test]
    fn malformed_watchlist_value_is_ignored() {
        let mut storage = LocalStorage::in_memory();
        storage.set_item(WATCHLIST_KEY, "{oops".to_string()).unwrap();
        assert!(Preferences::new(storage).watchlist().is_empty());
    }

    #[test]
    fn watchlist_resolves_in_catalogue_order() {
        let stocks = mock_data::stocks();
        let symbols = vec!["V".to_string(), "AAPL".to_string(), "ZZZ".to_string()];
        let resolved: Vec<String> = resolve_watchlist(&stocks, &symbols)
            .into_iter()
            .map(|s| s.symbol)
            .collect();
        assert_eq!(resolved, vec!["AAPL", "V"]);
    }
}
