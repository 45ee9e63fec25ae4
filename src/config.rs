use crate::error::{AutoUpdateError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.gemnasium.com/v1";
pub const DEFAULT_PROJECT_BRANCH: &str = "master";
pub const DEFAULT_CONFIG_FILE: &str = ".gemnasium.yml";

/// Settings loaded from the project's YAML configuration file.
///
/// Unknown keys are ignored. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_endpoint: String,
    pub api_key: String,
    pub project_slug: String,
    pub project_branch: String,
    pub ignored_paths: Vec<String>,
    pub raw_format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_key: String::new(),
            project_slug: String::new(),
            project_branch: DEFAULT_PROJECT_BRANCH.to_string(),
            ignored_paths: Vec::new(),
            raw_format: false,
        }
    }
}

impl Config {
    /// Parse configuration from a YAML document.
    ///
    /// An empty (or comment-only) document yields the defaults. A malformed
    /// document is an error rather than a silent fallback to defaults.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(data)?;
        if value.is_null() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file. A missing file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            AutoUpdateError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_yaml(&data)
    }

    fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.api_endpoint).map_err(|e| {
            AutoUpdateError::Config(format!(
                "Invalid api_endpoint '{}': {}",
                self.api_endpoint, e
            ))
        })?;

        match parsed.scheme() {
            "https" | "http" => Ok(()),
            scheme => Err(AutoUpdateError::Config(format!(
                "Unsupported api_endpoint scheme: {scheme}"
            ))),
        }
    }
}
