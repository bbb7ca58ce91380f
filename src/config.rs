// src/config.rs
use log::LevelFilter;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub prefs_path: PathBuf,
    /// Whether service calls sleep their fixed delays.
    pub latency: bool,
    pub history_days: u32,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            prefs_path: PathBuf::from("stock_desk_prefs.json"),
            latency: true,
            history_days: 30,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Config {
            addr: lookup("STOCK_DESK_ADDR")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.addr),
            prefs_path: lookup("STOCK_DESK_PREFS")
                .map(PathBuf::from)
                .unwrap_or(defaults.prefs_path),
            latency: lookup("STOCK_DESK_LATENCY")
                .map(|v| !matches!(v.to_lowercase().as_str(), "off" | "false" | "0"))
                .unwrap_or(defaults.latency),
            history_days: lookup("STOCK_DESK_HISTORY_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.history_days),
            log_level: lookup("STOCK_DESK_LOG")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.addr, "127.0.0.1:3030".parse().unwrap());
        assert!(config.latency);
        assert_eq!(config.history_days, 30);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("STOCK_DESK_ADDR", "0.0.0.0:8080"),
            ("STOCK_DESK_PREFS", "/tmp/prefs.json"),
            ("STOCK_DESK_LATENCY", "off"),
            ("STOCK_DESK_HISTORY_DAYS", "90"),
            ("STOCK_DESK_LOG", "debug"),
        ]));
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.prefs_path, PathBuf::from("/tmp/prefs.json"));
        assert!(!config.latency);
        assert_eq!(config.history_days, 90);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("STOCK_DESK_ADDR", "nowhere"),
            ("STOCK_DESK_HISTORY_DAYS", "-3"),
        ]));
        assert_eq!(config.addr.port(), 3030);
        assert_eq!(config.history_days, 30);
    }
}
