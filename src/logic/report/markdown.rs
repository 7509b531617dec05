//! Markdown Renderer

use std::fmt::Write;

use crate::logic::classify::ClassifyMethod;

use super::AnalysisReport;

pub fn render(report: &AnalysisReport, top: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Procsight Analysis Report\n");
    let _ = writeln!(out, "- Generated: {}", report.generated_at);
    let _ = writeln!(out, "- Run: `{}`", report.run_id);
    let _ = writeln!(out, "- Version: {}\n", report.app_version);

    render_system(report, &mut out);
    render_findings(report, &mut out);
    render_summary(report, &mut out, top);
    render_classification(report, &mut out);
    render_network(report, &mut out);

    out
}

fn render_system(report: &AnalysisReport, out: &mut String) {
    let facts = &report.facts;
    let _ = writeln!(out, "## System\n");
    let _ = writeln!(
        out,
        "| CPU | Cores | Memory | OS |\n|---|---|---|---|\n| {} | {} | {:.1} GB ({:.1}% used) | {} {} |\n",
        facts.cpu.brand,
        facts.cpu.logical_cores,
        facts.memory.total_bytes as f64 / 1024.0 / 1024.0 / 1024.0,
        facts.memory.usage_percent(),
        facts.os.name,
        facts.os.version
    );
}

fn render_findings(report: &AnalysisReport, out: &mut String) {
    let _ = writeln!(out, "## Configuration Findings\n");
    if report.findings.is_empty() {
        let _ = writeln!(out, "No issues detected.\n");
        return;
    }
    for finding in &report.findings {
        let _ = writeln!(
            out,
            "- **{}** ({}): {} - {}",
            finding.issue,
            finding.severity.as_str(),
            finding.description,
            finding.recommendation
        );
    }
    let _ = writeln!(out);
}

fn render_summary(report: &AnalysisReport, out: &mut String, top: usize) {
    let summary = &report.summary;
    let _ = writeln!(out, "## Processes\n");
    let _ = writeln!(
        out,
        "{} captured ({} user, {} system).\n",
        summary.total_processes,
        summary.statistics.user_process_count,
        summary.statistics.system_process_count
    );

    let _ = writeln!(out, "| Category | Count | CPU % | Mem % |\n|---|---|---|---|");
    for category in &summary.categories {
        if category.stat.count == 0 {
            continue;
        }
        let _ = writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} |",
            category.name, category.stat.count, category.stat.total_cpu, category.stat.total_mem
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "### Top by CPU\n");
    for process in summary.top_by_cpu.iter().take(top) {
        let _ = writeln!(
            out,
            "- `{}` - cpu {:.1}%, mem {:.1}%",
            process.name, process.cpu_percent, process.mem_percent
        );
    }
    let _ = writeln!(out);
}

fn render_classification(report: &AnalysisReport, out: &mut String) {
    let classification = &report.classification;
    let _ = writeln!(out, "## Classification\n");
    let _ = writeln!(
        out,
        "Terminated `{}` at iteration {} with {} service calls, {} cache hits and {} unresolved processes.\n",
        classification.termination.as_str(),
        classification.iterations,
        classification.service_calls,
        classification.cache_hits,
        classification.unresolved.len()
    );
    if let Some(failure) = &classification.failure {
        let _ = writeln!(out, "> Degraded: {}\n", failure);
    }

    let inferred: Vec<_> = classification
        .details
        .iter()
        .filter(|(_, r)| r.method == ClassifyMethod::Inference)
        .collect();
    if !inferred.is_empty() {
        let _ = writeln!(out, "| Process | Category | Confidence | Threat | Reason |");
        let _ = writeln!(out, "|---|---|---|---|---|");
        for (name, result) in inferred {
            let _ = writeln!(
                out,
                "| {} | {} | {}% | {} | {} |",
                name, result.category, result.confidence, result.threat_level, result.reason
            );
        }
        let _ = writeln!(out);
    }
}

fn render_network(report: &AnalysisReport, out: &mut String) {
    let Some(network) = &report.network else {
        return;
    };

    let _ = writeln!(out, "## Network\n");
    if let Some(error) = &network.security.error {
        let _ = writeln!(out, "Connection snapshot failed: {}\n", error);
        return;
    }

    let _ = writeln!(
        out,
        "{} connections, {} listening ports, risk level **{:?}**.\n",
        network.breakdown.total,
        network.breakdown.listening.len(),
        network.security.risk_level
    );

    for risk in &network.security.risks {
        let _ = writeln!(
            out,
            "- **Risk**: port {} ({}) - {}",
            risk.port, risk.service, risk.recommendation
        );
    }
    for warning in &network.security.warnings {
        let _ = writeln!(out, "- Warning: {}", warning.recommendation);
    }
    for recommendation in &network.security.recommendations {
        let _ = writeln!(out, "- {}", recommendation);
    }
    let _ = writeln!(out);
}
