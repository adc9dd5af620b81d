//! Configuration management for tcga-fetch
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.tcga-fetch/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::{FetchError, Result};

/// Default GDC REST API endpoint
pub const DEFAULT_GDC_URL: &str = "https://api.gdc.cancer.gov";

/// Default TCGA project
pub const DEFAULT_PROJECT_ID: &str = "TCGA-BRCA";

/// File name of the published PAM50 subtype table
pub const DEFAULT_PAM50_FILE: &str = "BRCA.547.PAM50.SigClust.Subtypes.txt";

/// Mirrors of the PAM50 subtype table, tried in order
pub const DEFAULT_PAM50_MIRRORS: &[&str] = &[
    "https://gdc.cancer.gov/files/public/file/BRCA_PAM50_Subtypes.txt",
    "https://gdc.cancer.gov/files/public/file/BRCA.547.PAM50.SigClust.Subtypes.txt",
    "https://tcga-data.nci.nih.gov/docs/publications/brca_2012/BRCA.547.PAM50.SigClust.Subtypes.txt",
    "https://gdac.broadinstitute.org/runs/stddata__2016_01_28/data/BRCA/20160128/BRCA.547.PAM50.SigClust.Subtypes.txt",
];

/// Complete configuration for tcga-fetch
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gdc: GdcConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub pam50: Pam50Config,
}

/// GDC connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GdcConfig {
    pub base_url: String,
    pub project_id: String,
    pub page_size: usize,
    pub request_timeout_sec: u64,
    pub download_timeout_sec: u64,
}

/// Backoff for API queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// ±25% random variation on each wait
    #[serde(default)]
    pub jitter: bool,
}

/// File system paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub data_dir: String,
}

/// PAM50 fallback download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pam50Config {
    pub file_name: String,
    pub mirrors: Vec<String>,
    pub auto_download: bool,
}

impl Default for GdcConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GDC_URL.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            page_size: 10_000,
            request_timeout_sec: 60,
            download_timeout_sec: 300,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            jitter: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for Pam50Config {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_PAM50_FILE.to_string(),
            mirrors: DEFAULT_PAM50_MIRRORS.iter().map(|s| s.to_string()).collect(),
            auto_download: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| FetchError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tcga-fetch").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.gdc.base_url.starts_with("http://") && !self.gdc.base_url.starts_with("https://") {
            return Err(FetchError::Config(format!(
                "base_url must be an http(s) URL: {}",
                self.gdc.base_url
            )));
        }

        if self.gdc.project_id.trim().is_empty() {
            return Err(FetchError::Config("project_id must not be empty".to_string()));
        }

        if self.gdc.page_size == 0 {
            return Err(FetchError::Config(
                "page_size must be greater than 0".to_string()
            ));
        }

        if self.gdc.request_timeout_sec == 0 || self.gdc.download_timeout_sec == 0 {
            return Err(FetchError::Config(
                "timeouts must be greater than 0".to_string()
            ));
        }

        if self.retry.max_retries == 0 {
            return Err(FetchError::Config(
                "max_retries must be at least 1".to_string()
            ));
        }

        if self.pam50.file_name.trim().is_empty() {
            return Err(FetchError::Config("pam50.file_name must not be empty".to_string()));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| FetchError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FetchError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FetchError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get data directory path
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.data_dir)
    }
}
