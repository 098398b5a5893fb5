use anyhow::{Context, Result};
use serde::Deserialize;
use validator::Validate;

// Default constants
pub const DEFAULT_FLOAT_TOLERANCE: f64 = 1e-8;
pub const DEFAULT_DECIMAL_PLACES: u32 = 8;
pub const DEFAULT_SAMPLE_CAP: usize = 100;

pub const DEFAULT_PROXY_URL: &str = "http://localhost:4000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PING_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_BASE_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 2_000;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment prefix; `PLANSWEEP_SWEEP__SAMPLE_CAP` maps to `sweep.sample_cap`.
pub const ENV_PREFIX: &str = "PLANSWEEP";

#[derive(Debug, Deserialize, Default, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub sweep: SweepSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Knobs of the execution sweep.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SweepSettings {
    /// Slack accepted past the declared end of an interval.
    #[serde(default = "default_float_tolerance")]
    #[validate(range(min = 0.0))]
    pub float_tolerance: f64,

    /// Fractional digits kept for grid values and combination keys.
    #[serde(default = "default_decimal_places")]
    #[validate(range(max = 15))]
    pub decimal_places: u32,

    /// Above this many combinations only an evenly spaced subset of raw
    /// results is returned. `None` keeps everything.
    #[serde(default = "default_sample_cap")]
    #[validate(range(min = 1))]
    pub sample_cap: Option<usize>,

    #[serde(default)]
    #[validate(nested)]
    pub proxy: ProxySettings,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            float_tolerance: default_float_tolerance(),
            decimal_places: default_decimal_places(),
            sample_cap: default_sample_cap(),
            proxy: ProxySettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ProxySettings {
    #[serde(default = "default_proxy_url")]
    #[validate(url)]
    pub url: String,
    #[serde(default = "default_request_timeout_ms")]
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,
    #[serde(default = "default_ping_timeout_ms")]
    #[validate(range(min = 1))]
    pub ping_timeout_ms: u64,
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetrySettings,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            url: default_proxy_url(),
            request_timeout_ms: default_request_timeout_ms(),
            ping_timeout_ms: default_ping_timeout_ms(),
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Validate)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1))]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `info` or `plansweep_core=debug`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit JSON lines instead of human-readable logs.
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_float_tolerance() -> f64 {
    DEFAULT_FLOAT_TOLERANCE
}
fn default_decimal_places() -> u32 {
    DEFAULT_DECIMAL_PLACES
}
fn default_sample_cap() -> Option<usize> {
    Some(DEFAULT_SAMPLE_CAP)
}
fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}
fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}
fn default_ping_timeout_ms() -> u64 {
    DEFAULT_PING_TIMEOUT_MS
}
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl AppConfig {
    /// Load from a YAML file (if it exists) layered under `PLANSWEEP_*` environment variables.
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = ::config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(::config::File::with_name(path))
        } else {
            builder
        };

        let builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;
        Self::finish(cfg)
    }

    /// Load from an in-memory YAML document, without environment overrides.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg = ::config::Config::builder()
            .add_source(::config::File::from_str(yaml, ::config::FileFormat::Yaml))
            .build()
            .context("Failed to build configuration")?;
        Self::finish(cfg)
    }

    fn finish(cfg: ::config::Config) -> Result<Self> {
        let app_config: AppConfig = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config
            .validate()
            .context("Configuration validation failed")?;

        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_app_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sweep.float_tolerance, 1e-8);
        assert_eq!(config.sweep.decimal_places, 8);
        assert_eq!(config.sweep.sample_cap, Some(100));
        assert_eq!(config.sweep.proxy.url, "http://localhost:4000");
        assert_eq!(config.sweep.proxy.ping_timeout_ms, 5_000);
    }

    #[test]
    fn test_proxy_url_validation() {
        let settings = ProxySettings {
            url: "not_a_url".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_sample_cap_rejected() {
        let settings = SweepSettings {
            sample_cap: Some(0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let unlimited = SweepSettings {
            sample_cap: None,
            ..Default::default()
        };
        assert!(unlimited.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_str_partial_override() {
        let config = AppConfig::from_yaml_str(
            r#"
sweep:
  sample_cap: 250
  proxy:
    url: "http://db-proxy:4000"
    retry:
      max_attempts: 3
telemetry:
  log_filter: "plansweep_core=debug"
"#,
        )
        .unwrap();

        assert_eq!(config.sweep.sample_cap, Some(250));
        assert_eq!(config.sweep.decimal_places, DEFAULT_DECIMAL_PLACES);
        assert_eq!(config.sweep.proxy.url, "http://db-proxy:4000");
        assert_eq!(config.sweep.proxy.retry.max_attempts, 3);
        assert_eq!(
            config.sweep.proxy.retry.base_delay_ms,
            DEFAULT_BASE_DELAY_MS
        );
        assert_eq!(config.telemetry.log_filter, "plansweep_core=debug");
        assert!(!config.telemetry.json);
    }

    #[test]
    fn test_invalid_yaml_settings_rejected() {
        let err = AppConfig::from_yaml_str("sweep:\n  decimal_places: 40\n").unwrap_err();
        assert!(err.to_string().contains("validation"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "sweep:\n  decimal_places: 4\n  sample_cap: 10").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.sweep.decimal_places, 4);
        assert_eq!(config.sweep.sample_cap, Some(10));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.sweep.proxy.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }
}
