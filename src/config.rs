use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sketch::SketchParams;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub minimum_confidence: f64,
    pub expected_symbol: Option<String>,
    pub commit_delay_ms: u64,
    pub limited_area: bool,
    pub auto_reset: bool,
    pub gesture_set: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minimum_confidence: 0.90,
            expected_symbol: None,
            commit_delay_ms: 1000,
            limited_area: true,
            auto_reset: true,
            gesture_set: "numeric".to_string(),
        }
    }
}

impl From<&Config> for SketchParams {
    fn from(cfg: &Config) -> Self {
        Self {
            minimum_confidence: cfg.minimum_confidence,
            // a blank expected symbol means "accept anything"
            expected: cfg
                .expected_symbol
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            commit_delay: Duration::from_millis(cfg.commit_delay_ms),
            gated: cfg.limited_area,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "scrawl") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("scrawl_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            minimum_confidence: 0.75,
            expected_symbol: Some("7".into()),
            commit_delay_ms: 400,
            limited_area: false,
            auto_reset: false,
            gesture_set: "numeric".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn params_from_config_normalize_blank_expected() {
        let cfg = Config {
            expected_symbol: Some("   ".into()),
            ..Config::default()
        };
        let params = SketchParams::from(&cfg);
        assert_eq!(params.expected, None);

        let cfg = Config {
            expected_symbol: Some(" 7 ".into()),
            commit_delay_ms: 250,
            ..Config::default()
        };
        let params = SketchParams::from(&cfg);
        assert_eq!(params.expected.as_deref(), Some("7"));
        assert_eq!(params.commit_delay, Duration::from_millis(250));
    }
}
