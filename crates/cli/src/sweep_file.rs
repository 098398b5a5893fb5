//! YAML sweep definitions.
//!
//! ```yaml
//! title: Key threshold
//! dim0_label: WHERE key > X
//! backend:
//!   kind: proxy
//!   url: http://localhost:4000
//! grid:
//!   dim0: { start: 0, end: 50000, step: 1000 }
//! template: SELECT * FROM data WHERE key > %%DIMENSION0%%;
//! preparation: |
//!   ANALYZE data;
//! execute_queries: false
//! ```

use plansweep_core::backend::BackendConfig;
use plansweep_core::demo::DemoScenario;
use plansweep_core::sweep::SweepRequest;
use plansweep_error::{ErrorCode, ErrorContext, Result, SweepError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim0_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim1_label: Option<String>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(flatten)]
    pub request: SweepRequest,
}

impl SweepFile {
    pub fn load(path: &Path) -> Result<Self> {
        let context = || ErrorContext::Config {
            file_path: Some(path.display().to_string()),
            field: None,
        };
        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::config(
                ErrorCode::InvalidSetting,
                format!("Cannot read sweep file {}: {}", path.display(), e),
            )
            .with_context(context())
        })?;
        let file: SweepFile = serde_yaml::from_str(&content).map_err(|e| {
            SweepError::from(e)
                .with_context(context())
                .with_hint("See `plansweep init` for a sweep file to start from")
        })?;
        file.request
            .grid
            .validate()
            .map_err(|e| e.with_context(context()))?;
        Ok(file)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl From<DemoScenario> for SweepFile {
    fn from(demo: DemoScenario) -> Self {
        Self {
            title: Some(demo.title.to_string()),
            dim0_label: Some(demo.dim0_label.to_string()),
            dim1_label: demo.dim1_label.map(str::to_string),
            backend: BackendConfig::default(),
            request: demo.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plansweep_core::demo;
    use plansweep_core::grid::Interval;

    #[test]
    fn test_parse_minimal_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.yaml");
        fs::write(
            &path,
            "grid:\n  dim0: { start: 0, end: 10, step: 2 }\ntemplate: SELECT * FROM t WHERE k > %%DIMENSION0%%;\n",
        )
        .unwrap();

        let file = SweepFile::load(&path).unwrap();
        assert_eq!(file.request.grid.dim0, Interval::new(0.0, 10.0, 2.0));
        assert!(file.request.grid.dim1.is_none());
        assert!(file.request.preparation.is_empty());
        assert!(!file.request.execute_queries);
        assert_eq!(file.backend, BackendConfig::Proxy { url: None });
    }

    #[test]
    fn test_demo_roundtrips_through_yaml() {
        let file = SweepFile::from(demo::scenario(2).unwrap());
        let yaml = file.to_yaml().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.yaml");
        fs::write(&path, yaml).unwrap();
        assert_eq!(SweepFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_invalid_step_is_rejected_with_file_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "grid:\n  dim0: { start: 0, end: 10, step: 0 }\ntemplate: SELECT 1;\n").unwrap();

        let err = SweepFile::load(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidGrid);
        assert!(matches!(err.context, Some(ErrorContext::Config { .. })));
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "grid: [unclosed").unwrap();
        assert_eq!(SweepFile::load(&path).unwrap_err().code, ErrorCode::InvalidYaml);
    }
}
