//! Locating and loading the application configuration.
//!
//! Priority: `--config` > `PLANSWEEP_CONFIG` > `~/.plansweep/config.yaml`.
//! A missing file is not an error; defaults and `PLANSWEEP_*` environment
//! variables still apply.

use anyhow::{Context, Result};
use plansweep_common::config::AppConfig;
use std::env;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "PLANSWEEP_CONFIG";

pub fn load(path_arg: Option<&str>) -> Result<AppConfig> {
    let path = config_path(path_arg);
    let path_str = path.to_string_lossy();
    AppConfig::from_file(&path_str)
        .with_context(|| format!("Failed to load configuration from {}", path_str))
}

pub fn config_path(path_arg: Option<&str>) -> PathBuf {
    if let Some(path) = path_arg {
        return PathBuf::from(path);
    }
    if let Ok(path) = env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".plansweep").join("config.yaml"),
        None => PathBuf::from(".plansweep/config.yaml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(config_path(Some("conf/app.yaml")), PathBuf::from("conf/app.yaml"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let config = load(missing.to_str()).unwrap();
        assert_eq!(config.sweep.decimal_places, 8);
    }

    #[test]
    fn test_file_values_are_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(
            &path,
            "sweep:\n  sample_cap: 25\n  proxy:\n    url: http://proxy.internal:4000\n",
        )
        .unwrap();

        let config = load(path.to_str()).unwrap();
        assert_eq!(config.sweep.sample_cap, Some(25));
        assert_eq!(config.sweep.proxy.url, "http://proxy.internal:4000");
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "sweep:\n  decimal_places: 40\n").unwrap();
        let err = load(path.to_str()).unwrap_err();
        assert!(format!("{err:#}").contains("validation"));
    }
}
