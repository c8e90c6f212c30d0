use crate::engine::{TrackerOptions, UndoPolicy};
use crate::models::DEFAULT_TARGET_PERCENTAGE;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HISTORY_CAP: usize = 100;
const DEFAULT_DATA_PATH: &str = "data/subjects.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub tracker: TrackerOptions,
    pub default_target: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT);
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let history_cap = history_cap(lookup("APP_HISTORY_CAP"));
        let undo_policy = match lookup("APP_UNDO_EDITS").as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => UndoPolicy::IncludeEdits,
            _ => UndoPolicy::PresenceOnly,
        };

        let mut default_target = parse_or(
            "APP_DEFAULT_TARGET",
            lookup("APP_DEFAULT_TARGET"),
            DEFAULT_TARGET_PERCENTAGE,
        );
        if !(0.0..=100.0).contains(&default_target) {
            warn!(default_target, "APP_DEFAULT_TARGET out of range, using default");
            default_target = DEFAULT_TARGET_PERCENTAGE;
        }

        Self {
            port,
            data_path,
            tracker: TrackerOptions {
                history_cap,
                undo_policy,
            },
            default_target,
        }
    }
}

fn history_cap(value: Option<String>) -> Option<usize> {
    let Some(value) = value else {
        return Some(DEFAULT_HISTORY_CAP);
    };
    match value.trim() {
        "0" | "none" | "unbounded" => None,
        other => match other.parse::<usize>() {
            Ok(cap) => Some(cap),
            Err(_) => {
                warn!(value = other, "invalid APP_HISTORY_CAP, using default");
                Some(DEFAULT_HISTORY_CAP)
            }
        },
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/subjects.json"));
        assert_eq!(config.tracker.history_cap, Some(100));
        assert_eq!(config.tracker.undo_policy, UndoPolicy::PresenceOnly);
        assert_eq!(config.default_target, 75.0);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/a.json"),
            ("APP_HISTORY_CAP", "unbounded"),
            ("APP_UNDO_EDITS", "true"),
            ("APP_DEFAULT_TARGET", "80"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/a.json"));
        assert_eq!(config.tracker.history_cap, None);
        assert_eq!(config.tracker.undo_policy, UndoPolicy::IncludeEdits);
        assert_eq!(config.default_target, 80.0);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(&[
            ("PORT", "not-a-port"),
            ("APP_HISTORY_CAP", "-3"),
            ("APP_DEFAULT_TARGET", "250"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.tracker.history_cap, Some(100));
        assert_eq!(config.default_target, 75.0);
    }
}
