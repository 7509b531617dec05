//! Generation Response Parsing
//!
//! The service returns free-form text that is expected to *contain* one JSON
//! object. Parsing discipline is strict: extract the first balanced brace
//! span, parse it against the response schema, validate every field, and on
//! any failure yield an empty outcome - never a fault that aborts the run.

use crate::logic::classify::{
    CategoryTaxonomy, ClassificationResult, ClassifyMethod, ThreatLevel,
};

use super::types::{BatchOutcome, RawBatch};

/// Entries at or below this confidence are discarded.
pub const MIN_CONFIDENCE: u8 = 50;

// ============================================================================
// SPAN EXTRACTION
// ============================================================================

/// Best-effort extractor for the first balanced `{...}` span.
///
/// Brace depth is tracked outside string literals so embedded reasoning text
/// containing quotes or braces does not derail the scan. Returns `None` when
/// no balanced span exists.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

// ============================================================================
// FIELD COERCION
// ============================================================================

/// Coerce a wire confidence value to an integer in [0, 100].
/// Malformed or missing confidence becomes 0, which the `> MIN_CONFIDENCE`
/// filter always discards.
pub fn coerce_confidence(value: Option<&serde_json::Value>) -> u8 {
    let raw = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    raw.clamp(0.0, 100.0).round() as u8
}

// ============================================================================
// BATCH PARSING
// ============================================================================

/// Parse a raw generation response into a validated batch outcome.
///
/// Kept entries need a process name, a category present in the taxonomy and
/// confidence strictly above [`MIN_CONFIDENCE`]; everything else is dropped
/// silently and contributes to the convergence engine's stall detection.
pub fn parse_batch(raw_text: &str, taxonomy: &CategoryTaxonomy) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    let Some(span) = extract_json_span(raw_text) else {
        log::warn!("No JSON object found in generation response ({} chars)", raw_text.len());
        return outcome;
    };

    let batch: RawBatch = match serde_json::from_str(span) {
        Ok(batch) => batch,
        Err(e) => {
            log::warn!("Generation response JSON did not match the schema: {}", e);
            return outcome;
        }
    };

    for raw in batch.categorizations {
        let Some(process) = raw.process.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let Some(category) = raw
            .category
            .as_deref()
            .and_then(|name| taxonomy.resolve(name))
        else {
            continue;
        };

        let confidence = coerce_confidence(raw.confidence.as_ref());
        if confidence <= MIN_CONFIDENCE {
            continue;
        }

        let key = process.to_lowercase();
        let result = ClassificationResult {
            category,
            confidence,
            reason: raw
                .reason
                .unwrap_or_else(|| "No reason provided".to_string()),
            threat_level: raw
                .threat_level
                .as_deref()
                .map(ThreatLevel::parse)
                .unwrap_or(ThreatLevel::Unknown),
            method: ClassifyMethod::Inference,
        };

        outcome.categorizations.insert(key.clone(), category);
        outcome.details.insert(key, result);
    }

    outcome
}

// ============================================================================
// TESTS
// ============================================================================
