use crate::app_dirs::AppDirs;
use crate::content::{Mode, MAX_ORDERED_WORDS};
use crate::corpus::Corpus;
use crate::error::{GameError, Result};
use crate::session::SessionSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    /// Custom corpus; the built-in one for `mode` when absent
    pub corpus: Option<Vec<String>>,
    pub pool_target_count: usize,
    pub session_duration_secs: f64,
    pub reset_delay_ms: u64,
    pub speed_bonus_window_secs: f64,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Pool,
            corpus: None,
            pool_target_count: 3,
            session_duration_secs: 60.0,
            reset_delay_ms: 500,
            speed_bonus_window_secs: 10.0,
            seed: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if let Some(entries) = &self.corpus {
            Corpus::new("config", entries.clone()).validate()?;
            if self.mode == Mode::Ordered {
                let longest = entries
                    .iter()
                    .map(|e| e.split_whitespace().count())
                    .max()
                    .unwrap_or(0);
                if longest > MAX_ORDERED_WORDS {
                    return Err(GameError::InvalidConfig(format!(
                        "sentence has {longest} words, at most {MAX_ORDERED_WORDS} fit"
                    )));
                }
            }
        }
        if self.pool_target_count == 0 {
            return Err(GameError::InvalidConfig(
                "pool_target_count must be at least 1".to_string(),
            ));
        }
        if !(self.session_duration_secs.is_finite() && self.session_duration_secs > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "session_duration_secs must be positive, got {}",
                self.session_duration_secs
            )));
        }
        if !(self.speed_bonus_window_secs.is_finite() && self.speed_bonus_window_secs >= 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "speed_bonus_window_secs must not be negative, got {}",
                self.speed_bonus_window_secs
            )));
        }
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        let defaults = SessionSettings::default();
        SessionSettings {
            pool_target_count: self.pool_target_count,
            session_duration: Duration::try_from_secs_f64(self.session_duration_secs)
                .unwrap_or(defaults.session_duration),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
            speed_bonus_window: Duration::try_from_secs_f64(self.speed_bonus_window_secs)
                .unwrap_or(defaults.speed_bonus_window),
        }
    }

    /// The corpus sessions draw from: the configured one, else the built-in
    pub fn resolved_corpus(&self) -> Result<Corpus> {
        let corpus = match &self.corpus {
            Some(entries) => Corpus::new("custom", entries.clone()),
            None => Corpus::builtin(self.mode)?,
        };
        corpus.validate()?;
        Ok(corpus)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            mode: Mode::Ordered,
            corpus: Some(vec!["the quick brown fox".into()]),
            pool_target_count: 2,
            session_duration_secs: 45.0,
            reset_delay_ms: 250,
            speed_bonus_window_secs: 5.0,
            seed: Some(7),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"mode": "ordered", "seed": 3}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, Mode::Ordered);
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.pool_target_count, 3);
        assert_eq!(cfg.reset_delay_ms, 500);
    }

    #[test]
    fn defaults_match_session_settings() {
        assert_eq!(Config::default().session_settings(), SessionSettings::default());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let empty = Config {
            corpus: Some(vec![]),
            ..Config::default()
        };
        assert_matches!(empty.validate(), Err(GameError::EmptyCorpus));

        let zero_k = Config {
            pool_target_count: 0,
            ..Config::default()
        };
        assert_matches!(zero_k.validate(), Err(GameError::InvalidConfig(_)));

        let no_time = Config {
            session_duration_secs: 0.0,
            ..Config::default()
        };
        assert_matches!(no_time.validate(), Err(GameError::InvalidConfig(_)));

        let negative_window = Config {
            speed_bonus_window_secs: -1.0,
            ..Config::default()
        };
        assert_matches!(negative_window.validate(), Err(GameError::InvalidConfig(_)));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_sentences_too_long_to_label() {
        let words = |n: usize| (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");

        let at_limit = Config {
            mode: Mode::Ordered,
            corpus: Some(vec![words(MAX_ORDERED_WORDS)]),
            ..Config::default()
        };
        assert!(at_limit.validate().is_ok());

        let too_long = Config {
            mode: Mode::Ordered,
            corpus: Some(vec!["short one".into(), words(MAX_ORDERED_WORDS + 1)]),
            ..Config::default()
        };
        assert_matches!(too_long.validate(), Err(GameError::InvalidConfig(_)));

        // letters, not words, matter in pool mode
        let pool = Config {
            mode: Mode::Pool,
            ..too_long
        };
        assert!(pool.validate().is_ok());
    }

    #[test]
    fn resolved_corpus_prefers_custom_entries() {
        let cfg = Config {
            corpus: Some(vec!["alpha".into(), "beta".into()]),
            ..Config::default()
        };
        assert_eq!(cfg.resolved_corpus().unwrap().entries, vec!["alpha", "beta"]);

        let builtin = Config {
            mode: Mode::Ordered,
            ..Config::default()
        };
        assert_eq!(builtin.resolved_corpus().unwrap().name, "ordered");
    }
}
