//! Inference Client Contract
//!
//! Turns a batch of unresolved processes into classification results via an
//! external natural-language inference service. The service sees at most
//! [`MAX_BATCH_CANDIDATES`] processes per call, ranked by resource impact,
//! because it has a bounded context window.

pub mod client;
pub mod parse;
pub mod prompt;
pub mod types;

pub use client::{OllamaClient, OllamaConfig};
pub use types::BatchOutcome;

use crate::logic::classify::CategoryTaxonomy;
use crate::logic::snapshot::types::ProcessRecord;

/// Upper bound on processes embedded in one generation call.
pub const MAX_BATCH_CANDIDATES: usize = 30;

// ============================================================================
// PROVIDER SEAM
// ============================================================================

/// The contract the convergence engine depends on. Implemented by
/// [`OllamaClient`] in production and by mocks in tests.
#[allow(async_fn_in_trait)]
pub trait InferenceProvider {
    /// Lightweight reachability probe; failure is non-fatal.
    async fn is_available(&self) -> bool;

    /// Is the configured model present in the service catalog?
    async fn has_model(&self) -> bool;

    /// Categorize a batch of unresolved processes. An empty outcome is a
    /// valid result; it must never raise a fault that aborts the run.
    async fn classify_batch(
        &self,
        candidates: &[&ProcessRecord],
        taxonomy: &CategoryTaxonomy,
    ) -> BatchOutcome;
}

// ============================================================================
// CANDIDATE SELECTION
// ============================================================================

/// Pick the highest-impact candidates, ranked by cpu% + mem% descending.
pub fn select_candidates<'a>(candidates: &[&'a ProcessRecord]) -> Vec<&'a ProcessRecord> {
    let mut ranked: Vec<&ProcessRecord> = candidates.to_vec();
    ranked.sort_by(|a, b| {
        b.load_score()
            .partial_cmp(&a.load_score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(MAX_BATCH_CANDIDATES);
    ranked
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, cpu: f32, mem: f32) -> ProcessRecord {
        ProcessRecord {
            pid: 1,
            name: name.to_string(),
            cpu_percent: cpu,
            mem_percent: mem,
            mem_rss_bytes: 0,
            mem_vsz_bytes: 0,
            path: String::new(),
            command: String::new(),
            parent_pid: None,
            user: String::new(),
            priority: None,
            state: String::new(),
            start_time_secs: 0,
        }
    }

    #[test]
    fn test_selection_ranks_by_combined_load() {
        let low = record("low", 1.0, 1.0);
        let high = record("high", 40.0, 10.0);
        let mid = record("mid", 5.0, 20.0);

        let refs = vec![&low, &high, &mid];
        let selected = select_candidates(&refs);
        let names: Vec<&str> = selected.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_selection_caps_at_batch_limit() {
        let records: Vec<ProcessRecord> = (0..50)
            .map(|i| record(&format!("p{}", i), i as f32, 0.0))
            .collect();
        let refs: Vec<&ProcessRecord> = records.iter().collect();

        let selected = select_candidates(&refs);
        assert_eq!(selected.len(), MAX_BATCH_CANDIDATES);
        // Highest load first
        assert_eq!(selected[0].name, "p49");
    }
}
