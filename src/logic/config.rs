//! Run Configuration
//!
//! One `AnalyzerConfig` value is constructed per run (file defaults, then
//! CLI overrides), passed by reference into every engine, and never mutated
//! after construction.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;

use super::classify::Category;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    // Inference service
    pub ollama_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub probe_timeout_secs: u64,
    pub generate_timeout_secs: u64,

    // Analysis
    pub use_llm: bool,
    pub max_iterations: u32,
    pub analyze_network: bool,
    pub max_processes: usize,

    // Cache
    pub cache_enabled: bool,
    /// `None` resolves to the per-user cache directory.
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl_hours: u64,

    // Taxonomy
    pub enabled_categories: Vec<Category>,
    pub custom_keywords: HashMap<Category, Vec<String>>,

    /// Process names never submitted to classification.
    pub exclude_processes: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ollama_url: constants::get_ollama_url(),
            ollama_model: constants::get_ollama_model(),
            temperature: constants::DEFAULT_TEMPERATURE,
            probe_timeout_secs: constants::DEFAULT_PROBE_TIMEOUT_SECS,
            generate_timeout_secs: constants::DEFAULT_GENERATE_TIMEOUT_SECS,
            use_llm: true,
            max_iterations: constants::DEFAULT_MAX_ITERATIONS,
            analyze_network: true,
            max_processes: constants::DEFAULT_MAX_PROCESSES,
            cache_enabled: true,
            cache_dir: None,
            cache_ttl_hours: constants::DEFAULT_CACHE_TTL_HOURS,
            enabled_categories: Category::ALL.to_vec(),
            custom_keywords: HashMap::new(),
            exclude_processes: vec![
                "system idle process".to_string(),
                "system".to_string(),
                "registry".to_string(),
            ],
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse; the implicit
    /// `procsight.config.json` in the working directory is optional, and an
    /// unreadable implicit file degrades to defaults with a warning.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit_path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|e| ConfigError::Unreadable(path.to_path_buf(), e))?;
                serde_json::from_str(&content)
                    .map_err(|e| ConfigError::Invalid(path.to_path_buf(), e))
            }
            None => {
                let default_path = PathBuf::from(constants::CONFIG_FILE_NAME);
                if !default_path.exists() {
                    return Ok(Self::default());
                }
                match fs::read_to_string(&default_path)
                    .map_err(|e| e.to_string())
                    .and_then(|content| {
                        serde_json::from_str(&content).map_err(|e| e.to_string())
                    }) {
                    Ok(config) => Ok(config),
                    Err(e) => {
                        log::warn!(
                            "Ignoring unreadable {}: {}",
                            constants::CONFIG_FILE_NAME,
                            e
                        );
                        Ok(Self::default())
                    }
                }
            }
        }
    }

    /// Write a default config file for the user to edit.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let json = serde_json::to_vec_pretty(&Self::default())
            .expect("default config serializes");
        fs::write(path, json).map_err(|e| ConfigError::Unwritable(path.to_path_buf(), e))
    }

    /// The cache directory this run uses.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(constants::APP_NAME)
        })
    }

    /// Excluded names, lower-cased for comparison.
    pub fn excluded_names(&self) -> Vec<String> {
        self.exclude_processes
            .iter()
            .map(|name| name.to_lowercase())
            .collect()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {0}: {1}")]
    Unreadable(PathBuf, #[source] std::io::Error),
    #[error("cannot write config {0}: {1}")]
    Unwritable(PathBuf, #[source] std::io::Error),
    #[error("config {0} is not valid JSON: {1}")]
    Invalid(PathBuf, #[source] serde_json::Error),
    #[error("config file {0} already exists")]
    AlreadyExists(PathBuf),
}

// ============================================================================
// TESTS
// ============================================================================
