//! Inference Contract Types

use std::collections::HashMap;

use serde::Deserialize;

use crate::logic::classify::{Category, ClassificationResult};

// ============================================================================
// BATCH OUTCOME
// ============================================================================

/// Result of one batch categorization, keyed by lower-cased process name.
/// An empty outcome is a valid, non-error result (nothing usable came back).
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub categorizations: HashMap<String, Category>,
    pub details: HashMap<String, ClassificationResult>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.categorizations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categorizations.len()
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

/// `GET /api/tags` response.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// `POST /api/generate` response (stream: false).
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

// ============================================================================
// RESPONSE SCHEMA
// ============================================================================

/// The JSON object the generation response is expected to embed.
/// Every field is optional at the wire level; validation happens after.
#[derive(Debug, Deserialize)]
pub struct RawBatch {
    #[serde(default)]
    pub categorizations: Vec<RawCategorization>,
}

#[derive(Debug, Deserialize)]
pub struct RawCategorization {
    pub process: Option<String>,
    pub category: Option<String>,
    /// Number or string in practice; coerced later.
    pub confidence: Option<serde_json::Value>,
    pub reason: Option<String>,
    pub threat_level: Option<String>,
}
