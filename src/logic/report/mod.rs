//! Report Rendering
//!
//! Assembles the run's outputs into one `AnalysisReport` and renders it as
//! text, JSON or Markdown. Rendering is a collaborator of the engines, not
//! part of them: no classification logic lives here.

pub mod markdown;
pub mod text;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::constants;

use super::classify::ClassificationResult;
use super::convergence::{ConvergenceOutcome, Termination};
use super::detector::ConfigFinding;
use super::netrisk::NetworkReport;
use super::snapshot::types::{Snapshot, SystemFacts};
use super::summary::ProcessSummary;

// ============================================================================
// REPORT MODEL
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub termination: Termination,
    pub iterations: u32,
    pub service_calls: u32,
    pub cache_hits: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub unresolved: Vec<String>,
    /// Per-process results, ordered by name for stable rendering.
    pub details: BTreeMap<String, ClassificationResult>,
}

impl From<&ConvergenceOutcome> for ClassificationReport {
    fn from(outcome: &ConvergenceOutcome) -> Self {
        let mut unresolved = outcome.unresolved.clone();
        unresolved.sort();

        Self {
            termination: outcome.termination,
            iterations: outcome.iterations,
            service_calls: outcome.service_calls,
            cache_hits: outcome.cache_hits,
            failure: outcome.failure.clone(),
            unresolved,
            details: outcome
                .details
                .iter()
                .map(|(name, result)| (name.clone(), result.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: String,
    pub generated_at: String,
    pub app_version: &'static str,
    pub facts: SystemFacts,
    pub findings: Vec<ConfigFinding>,
    pub summary: ProcessSummary,
    pub classification: ClassificationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkReport>,
}

/// Join the run's outputs into the renderable report.
pub fn assemble(
    snapshot: &Snapshot,
    findings: Vec<ConfigFinding>,
    summary: ProcessSummary,
    outcome: &ConvergenceOutcome,
    network: Option<NetworkReport>,
) -> AnalysisReport {
    AnalysisReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        generated_at: snapshot.captured_at.to_rfc3339(),
        app_version: constants::APP_VERSION,
        facts: snapshot.facts.clone(),
        findings,
        summary,
        classification: ClassificationReport::from(outcome),
        network,
    }
}

// ============================================================================
// RENDERING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

pub fn render(report: &AnalysisReport, format: ReportFormat, top: usize) -> String {
    match format {
        ReportFormat::Text => text::render(report, top),
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
        ReportFormat::Markdown => markdown::render(report, top),
    }
}

/// Write the rendered report to a file, or print it.
pub fn emit(
    report: &AnalysisReport,
    format: ReportFormat,
    output: Option<&Path>,
    top: usize,
) -> io::Result<()> {
    let rendered = render(report, format, top);

    match output {
        Some(path) => {
            fs::write(path, &rendered)?;
            log::info!("Report saved to {}", path.display());
            Ok(())
        }
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::classify::Category;
    use crate::logic::summary;
    use chrono::Utc;
    use std::collections::HashMap;

    fn sample_report() -> AnalysisReport {
        let inferred = ClassificationResult {
            category: Category::Browsers,
            confidence: 88,
            reason: "Renderer path, browser helper binary".to_string(),
            threat_level: crate::logic::classify::ThreatLevel::Safe,
            method: crate::logic::classify::ClassifyMethod::Inference,
        };
        let outcome = ConvergenceOutcome {
            categorizations: HashMap::from([(
                "firefox".to_string(),
                Category::Browsers,
            )]),
            details: HashMap::from([("firefox".to_string(), inferred)]),
            unresolved: vec!["mystery".to_string()],
            iterations: 2,
            service_calls: 1,
            cache_hits: 0,
            termination: Termination::Converged,
            failure: None,
        };
        let snapshot = Snapshot {
            captured_at: Utc::now(),
            facts: SystemFacts::default(),
            processes: vec![],
            total_process_count: 0,
            connections: vec![],
            connection_error: None,
        };
        let process_summary = summary::build(&[], &outcome);
        assemble(&snapshot, vec![], process_summary, &outcome, None)
    }

    #[test]
    fn test_json_rendering_is_valid_json() {
        let rendered = render(&sample_report(), ReportFormat::Json, 20);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["classification"]["termination"], "converged");
        assert_eq!(value["classification"]["unresolved"][0], "mystery");
    }

    #[test]
    fn test_text_and_markdown_mention_core_sections() {
        let report = sample_report();
        for format in [ReportFormat::Text, ReportFormat::Markdown] {
            let rendered = render(&report, format, 20);
            assert!(rendered.contains("firefox"));
            assert!(rendered.contains("converged"));
        }
    }

    #[test]
    fn test_emit_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.json");
        emit(&sample_report(), ReportFormat::Json, Some(&path), 20).unwrap();
        assert!(path.exists());
    }
}
