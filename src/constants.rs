//! Central Configuration Constants
//!
//! Single source of truth for defaults. To change the default inference
//! endpoint, only edit this file.

/// App name
pub const APP_NAME: &str = "procsight";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default inference service URL
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model identifier
pub const DEFAULT_OLLAMA_MODEL: &str = "gemma2:9b";

/// Default generation temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Reachability/catalog probe timeout (seconds)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Generation timeout (seconds), sized for local-model latency
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 120;

/// Default convergence iteration cap
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// Default process-table truncation
pub const DEFAULT_MAX_PROCESSES: usize = 400;

/// Default cache entry lifetime (hours)
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "procsight.config.json";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the inference service URL from the environment or use the default
pub fn get_ollama_url() -> String {
    std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string())
}

/// Get the model identifier from the environment or use the default
pub fn get_ollama_model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string())
}
