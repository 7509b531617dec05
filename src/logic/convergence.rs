//! Convergence Engine
//!
//! Orchestrates the keyword classifier, the result cache and the inference
//! client across bounded iterations to shrink the unresolved set. Keyword
//! classification runs once, before the loop, and pre-empts inference for
//! the whole run. The loop always terminates: it is bounded by the iteration
//! cap and by stall detection, and every failure along the way degrades
//! coverage instead of aborting.

use std::collections::HashMap;

use serde::Serialize;

use super::cache::ResultCache;
use super::classify::{keyword, Category, CategoryTaxonomy, ClassificationResult, Fingerprint};
use super::ollama::InferenceProvider;
use super::snapshot::types::ProcessRecord;

/// Unresolved count at or below which the run counts as converged.
pub const RESOLVE_TARGET: usize = 10;

// ============================================================================
// CONFIG & OUTCOME
// ============================================================================

#[derive(Debug, Clone)]
pub struct ConvergenceConfig {
    pub max_iterations: u32,
    /// Inference disabled entirely (e.g. `--no-llm`).
    pub use_inference: bool,
    /// Lower-cased process names never submitted to classification.
    pub excluded_names: Vec<String>,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Unresolved set shrank to the target.
    Converged,
    /// Iteration cap reached with work remaining.
    Exhausted,
    /// An iteration produced zero new categorizations.
    Stalled,
    /// Service unreachable or model missing; keyword results stand.
    ServiceUnavailable,
    /// Inference switched off for the run.
    InferenceDisabled,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::Exhausted => "exhausted",
            Termination::Stalled => "stalled",
            Termination::ServiceUnavailable => "service_unavailable",
            Termination::InferenceDisabled => "inference_disabled",
        }
    }
}

/// The run's classification outcome. Degraded runs are still successful
/// runs; `failure` carries the reason coverage is lower than ideal.
#[derive(Debug, Clone)]
pub struct ConvergenceOutcome {
    /// Lower-cased process name -> category (keyword and inference merged).
    pub categorizations: HashMap<String, Category>,
    /// Lower-cased process name -> full result.
    pub details: HashMap<String, ClassificationResult>,
    /// Lower-cased names that stayed unresolved.
    pub unresolved: Vec<String>,
    /// Iteration the loop terminated in (counting from 1).
    pub iterations: u32,
    pub service_calls: u32,
    pub cache_hits: u32,
    pub termination: Termination,
    pub failure: Option<String>,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Classify one snapshot's processes.
pub async fn run<P: InferenceProvider>(
    processes: &[ProcessRecord],
    taxonomy: &CategoryTaxonomy,
    cache: &ResultCache,
    provider: &P,
    config: &ConvergenceConfig,
) -> ConvergenceOutcome {
    let mut details: HashMap<String, ClassificationResult> = HashMap::new();
    let mut cache_hits = 0u32;
    let mut service_calls = 0u32;
    let mut failure = None;

    let eligible: Vec<&ProcessRecord> = processes
        .iter()
        .filter(|p| !config.excluded_names.contains(&p.name.to_lowercase()))
        .collect();

    // Keyword pass: runs once, results are terminal for the run.
    for process in &eligible {
        let key = process.name.to_lowercase();
        if details.contains_key(&key) {
            continue;
        }
        if let Some((category, matched)) = keyword::classify_with_keyword(process, taxonomy) {
            details.insert(key, ClassificationResult::keyword(category, matched));
        }
    }

    log::info!(
        "Keyword pass classified {} of {} processes",
        details.len(),
        eligible.len()
    );

    // Inference availability is probed once per run.
    let service_ready = if !config.use_inference {
        false
    } else if !provider.is_available().await {
        failure = Some("inference service unreachable".to_string());
        false
    } else if !provider.has_model().await {
        failure = Some("configured model not present in service catalog".to_string());
        false
    } else {
        true
    };

    let max_iterations = config.max_iterations.max(1);
    let mut iteration = 1u32;

    let termination = loop {
        let unresolved = unresolved_set(&eligible, &details);
        log::info!("Iteration {}: {} unresolved", iteration, unresolved.len());

        if unresolved.len() <= RESOLVE_TARGET {
            break Termination::Converged;
        }
        if iteration > max_iterations {
            break Termination::Exhausted;
        }
        if !service_ready {
            break if config.use_inference {
                Termination::ServiceUnavailable
            } else {
                Termination::InferenceDisabled
            };
        }

        // Cache partition: hits merge without spending a service call.
        let fingerprints: Vec<(Fingerprint, &ProcessRecord)> = unresolved
            .iter()
            .map(|p| (Fingerprint::of(p), *p))
            .collect();
        let lookup =
            cache.get_batch(&fingerprints.iter().map(|(fp, _)| fp.clone()).collect::<Vec<_>>());

        let mut misses: Vec<&ProcessRecord> = Vec::new();
        for (fingerprint, process) in &fingerprints {
            match lookup.hits.get(fingerprint) {
                Some(result) => {
                    details.insert(process.name.to_lowercase(), result.clone());
                    cache_hits += 1;
                }
                None => misses.push(*process),
            }
        }

        if misses.is_empty() {
            // Everything resolved from cache; re-evaluate without a call.
            iteration += 1;
            continue;
        }

        let batch = provider.classify_batch(&misses, taxonomy).await;
        service_calls += 1;

        let mut fresh = 0usize;
        for (name, result) in batch.details {
            if details.contains_key(&name) {
                continue;
            }
            if let Some(process) = misses.iter().find(|p| p.name.to_lowercase() == name) {
                cache.put(&Fingerprint::of(process), &process.name, &result);
            }
            details.insert(name, result);
            fresh += 1;
        }

        log::info!("Iteration {}: {} newly categorized", iteration, fresh);

        if fresh == 0 {
            // The service saw this population and had nothing usable;
            // further iterations cannot help.
            break Termination::Stalled;
        }

        iteration += 1;
    };

    let unresolved: Vec<String> = unresolved_set(&eligible, &details)
        .iter()
        .map(|p| p.name.to_lowercase())
        .collect();

    let categorizations = details
        .iter()
        .map(|(name, result)| (name.clone(), result.category))
        .collect();

    log::info!(
        "Convergence terminated ({}) after iteration {}: {} classified, {} unresolved, {} service calls, {} cache hits",
        termination.as_str(),
        iteration,
        details.len(),
        unresolved.len(),
        service_calls,
        cache_hits
    );

    ConvergenceOutcome {
        categorizations,
        details,
        unresolved,
        iterations: iteration,
        service_calls,
        cache_hits,
        termination,
        failure,
    }
}

/// Eligible processes with no classification yet, deduplicated by
/// lower-cased name (classification is per-name, as is the cache).
fn unresolved_set<'a>(
    eligible: &[&'a ProcessRecord],
    details: &HashMap<String, ClassificationResult>,
) -> Vec<&'a ProcessRecord> {
    let mut seen = std::collections::HashSet::new();
    eligible
        .iter()
        .filter(|p| {
            let key = p.name.to_lowercase();
            !details.contains_key(&key) && seen.insert(key)
        })
        .copied()
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::classify::{ClassifyMethod, ThreatLevel};
    use crate::logic::ollama::BatchOutcome;
    use std::cell::RefCell;

    fn record(name: &str, cpu: f32) -> ProcessRecord {
        ProcessRecord {
            pid: 1,
            name: name.to_string(),
            cpu_percent: cpu,
            mem_percent: 1.0,
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

    fn inference_result(category: Category) -> ClassificationResult {
        ClassificationResult {
            category,
            confidence: 80,
            reason: "mocked".to_string(),
            threat_level: ThreatLevel::Unknown,
            method: ClassifyMethod::Inference,
        }
    }

    /// Mock provider: each call consumes the next scripted response; once
    /// the script runs dry every further call returns an empty outcome.
    struct ScriptedProvider {
        available: bool,
        model_present: bool,
        script: RefCell<Vec<Vec<(String, Category)>>>,
        calls: RefCell<u32>,
        seen_names: RefCell<Vec<Vec<String>>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Vec<(String, Category)>>) -> Self {
            Self {
                available: true,
                model_present: true,
                script: RefCell::new(script),
                calls: RefCell::new(0),
                seen_names: RefCell::new(Vec::new()),
            }
        }

        fn unavailable() -> Self {
            let mut p = Self::new(vec![]);
            p.available = false;
            p
        }

        fn calls(&self) -> u32 {
            *self.calls.borrow()
        }
    }

    impl InferenceProvider for ScriptedProvider {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn has_model(&self) -> bool {
            self.model_present
        }

        async fn classify_batch(
            &self,
            candidates: &[&ProcessRecord],
            _taxonomy: &CategoryTaxonomy,
        ) -> BatchOutcome {
            *self.calls.borrow_mut() += 1;
            self.seen_names
                .borrow_mut()
                .push(candidates.iter().map(|p| p.name.to_lowercase()).collect());

            let mut outcome = BatchOutcome::default();
            let mut script = self.script.borrow_mut();
            if script.is_empty() {
                return outcome;
            }
            for (name, category) in script.remove(0) {
                outcome.categorizations.insert(name.clone(), category);
                outcome.details.insert(name, inference_result(category));
            }
            outcome
        }
    }

    fn unknowns(count: usize) -> Vec<ProcessRecord> {
        (0..count)
            .map(|i| record(&format!("zzunknown{:02}", i), i as f32))
            .collect()
    }

    fn config(max_iterations: u32) -> ConvergenceConfig {
        ConvergenceConfig {
            max_iterations,
            use_inference: true,
            excluded_names: vec![],
        }
    }

    async fn run_case(
        processes: &[ProcessRecord],
        provider: &ScriptedProvider,
        cfg: &ConvergenceConfig,
        cache: &ResultCache,
    ) -> ConvergenceOutcome {
        let taxonomy = CategoryTaxonomy::builtin();
        run(processes, &taxonomy, cache, provider, cfg).await
    }

    #[tokio::test]
    async fn test_small_unresolved_set_converges_without_calls() {
        let processes = unknowns(5);
        let provider = ScriptedProvider::new(vec![]);
        let outcome = run_case(&processes, &provider, &config(5), &ResultCache::disabled()).await;

        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(provider.calls(), 0);
        assert_eq!(outcome.unresolved.len(), 5);
    }

    #[tokio::test]
    async fn test_stall_terminates_after_exactly_one_call() {
        let processes = unknowns(20);
        let provider = ScriptedProvider::new(vec![]); // always empty
        let outcome = run_case(&processes, &provider, &config(5), &ResultCache::disabled()).await;

        assert_eq!(outcome.termination, Termination::Stalled);
        assert_eq!(provider.calls(), 1);
        assert_eq!(outcome.service_calls, 1);
        assert_eq!(outcome.unresolved.len(), 20);
    }

    #[tokio::test]
    async fn test_iteration_bound_holds() {
        // Each call resolves one process; far too many remain, so the cap
        // is what stops the loop.
        let processes = unknowns(30);
        let script: Vec<Vec<(String, Category)>> = (0..10)
            .map(|i| vec![(format!("zzunknown{:02}", i), Category::Media)])
            .collect();
        let provider = ScriptedProvider::new(script);
        let outcome = run_case(&processes, &provider, &config(3), &ResultCache::disabled()).await;

        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(provider.calls(), 3);
        assert_eq!(outcome.unresolved.len(), 27);
    }

    #[tokio::test]
    async fn test_end_to_end_fifteen_unresolved() {
        // 15 unresolved; the service classifies 8 on the first call. The
        // remaining 7 is within the resolve target, so iteration 2's entry
        // check terminates the loop without a second generation call.
        let processes = unknowns(15);
        let first_batch: Vec<(String, Category)> = (0..8)
            .map(|i| (format!("zzunknown{:02}", i), Category::Office))
            .collect();
        let provider = ScriptedProvider::new(vec![first_batch, vec![]]);
        let outcome = run_case(&processes, &provider, &config(5), &ResultCache::disabled()).await;

        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(outcome.unresolved.len(), 7);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_keyword_matches_never_reach_the_service() {
        let mut processes = unknowns(15);
        processes.push(record("firefox.exe", 50.0));
        processes.push(record("postgres", 40.0));

        let provider = ScriptedProvider::new(vec![]);
        let outcome = run_case(&processes, &provider, &config(2), &ResultCache::disabled()).await;

        // Keyword results survived the stalled service.
        assert_eq!(
            outcome.categorizations.get("firefox.exe"),
            Some(&Category::Browsers)
        );
        assert_eq!(
            outcome.details.get("firefox.exe").unwrap().method,
            ClassifyMethod::Keyword
        );

        // And were never part of any batch the provider saw.
        for batch in provider.seen_names.borrow().iter() {
            assert!(!batch.contains(&"firefox.exe".to_string()));
            assert!(!batch.contains(&"postgres".to_string()));
        }
    }

    #[tokio::test]
    async fn test_service_unavailable_keeps_keyword_results() {
        let mut processes = unknowns(15);
        processes.push(record("firefox.exe", 50.0));

        let provider = ScriptedProvider::unavailable();
        let outcome = run_case(&processes, &provider, &config(5), &ResultCache::disabled()).await;

        assert_eq!(outcome.termination, Termination::ServiceUnavailable);
        assert!(outcome.failure.is_some());
        assert_eq!(provider.calls(), 0);
        assert_eq!(
            outcome.categorizations.get("firefox.exe"),
            Some(&Category::Browsers)
        );
    }

    #[tokio::test]
    async fn test_inference_disabled() {
        let processes = unknowns(15);
        let provider = ScriptedProvider::new(vec![]);
        let cfg = ConvergenceConfig {
            use_inference: false,
            ..config(5)
        };
        let outcome = run_case(&processes, &provider, &cfg, &ResultCache::disabled()).await;

        assert_eq!(outcome.termination, Termination::InferenceDisabled);
        assert_eq!(provider.calls(), 0);
        assert!(outcome.failure.is_none());
    }

    #[tokio::test]
    async fn test_cache_hits_skip_the_service() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(true, tmp.path().to_path_buf(), 24);

        // Pre-populate the cache for 12 of 15 unknowns.
        let processes = unknowns(15);
        for process in processes.iter().take(12) {
            cache.put(
                &Fingerprint::of(process),
                &process.name,
                &inference_result(Category::Networking),
            );
        }

        let provider = ScriptedProvider::new(vec![]);
        let outcome = run_case(&processes, &provider, &config(5), &cache).await;

        // 12 resolved from cache -> 3 unresolved -> converged with no call.
        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(provider.calls(), 0);
        assert_eq!(outcome.cache_hits, 12);
        assert_eq!(outcome.unresolved.len(), 3);
    }

    #[tokio::test]
    async fn test_new_service_results_are_written_back() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(true, tmp.path().to_path_buf(), 24);

        let processes = unknowns(12);
        let batch: Vec<(String, Category)> = (0..4)
            .map(|i| (format!("zzunknown{:02}", i), Category::Security))
            .collect();
        let provider = ScriptedProvider::new(vec![batch]);
        let outcome = run_case(&processes, &provider, &config(5), &cache).await;

        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(cache.stats().entry_count, 4);
        assert_eq!(
            cache.get(&Fingerprint::of(&processes[0])).unwrap().category,
            Category::Security
        );
    }

    #[tokio::test]
    async fn test_excluded_names_are_never_classified() {
        let mut processes = unknowns(3);
        processes.push(record("firefox.exe", 10.0));

        let provider = ScriptedProvider::new(vec![]);
        let cfg = ConvergenceConfig {
            max_iterations: 5,
            use_inference: true,
            excluded_names: vec!["firefox.exe".to_string()],
        };
        let outcome = run_case(&processes, &provider, &cfg, &ResultCache::disabled()).await;

        // Excluded despite matching a keyword signature.
        assert!(!outcome.categorizations.contains_key("firefox.exe"));
        assert!(!outcome.unresolved.contains(&"firefox.exe".to_string()));
    }
}
