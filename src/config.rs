// Dashboard configuration: JSON file with defaults, overridden by CLI flags

use crate::binder::Binding;
use crate::fetch::DEFAULT_ENDPOINT;
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Endpoint(String),
    /// Local `.json` or `.csv` file
    File(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Data endpoint, used unless `input` is set
    pub url: String,
    pub input: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub render: RenderOptions,
    pub binding: Binding,
    /// Write only `dashboard.html` and `charts.json`, skip raster output
    pub html_only: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            input: None,
            out_dir: PathBuf::from("."),
            render: RenderOptions::default(),
            binding: Binding::default(),
            html_only: false,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .render
            .validate()
            .with_context(|| format!("Invalid render options in {}", path.display()))?;
        Ok(config)
    }

    pub fn source(&self) -> DataSource {
        match &self.input {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Endpoint(self.url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.source(), DataSource::Endpoint(DEFAULT_ENDPOINT.to_string()));
        assert_eq!(cfg.render.width, 800);
        assert_eq!(cfg.render.height, 600);
        assert!(!cfg.html_only);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"render": {{"type": "svg", "width": 1024}},
                "binding": {{"secondary_category": "store"}},
                "input": "data.csv"}}"#
        )
        .unwrap();

        let cfg = DashboardConfig::load(file.path()).unwrap();
        assert!(matches!(cfg.render.format, OutputFormat::Svg));
        assert_eq!(cfg.render.width, 1024);
        assert_eq!(cfg.render.height, 600);
        assert_eq!(cfg.binding.secondary_category.as_deref(), Some("store"));
        assert_eq!(cfg.binding.primary_category, None);
        assert_eq!(cfg.source(), DataSource::File(PathBuf::from("data.csv")));
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"render": {{"width": 0}}}}"#).unwrap();

        let err = DashboardConfig::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("at least 1"));
    }

    #[test]
    fn test_missing_file() {
        let err = DashboardConfig::load(Path::new("/nonexistent/chartbind.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
