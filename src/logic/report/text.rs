//! Plain-Text Renderer

use std::fmt::Write;

use crate::logic::classify::ClassifyMethod;

use super::AnalysisReport;

const RULE: &str =
    "================================================================================";

pub fn render(report: &AnalysisReport, top: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "PROCSIGHT ANALYSIS REPORT");
    let _ = writeln!(out, "Generated: {}", report.generated_at);
    let _ = writeln!(out, "Run: {}", report.run_id);
    let _ = writeln!(out, "{}", RULE);

    render_system(report, &mut out);
    render_findings(report, &mut out);
    render_summary(report, &mut out, top);
    render_classification(report, &mut out);
    render_network(report, &mut out);

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "END OF REPORT");
    out
}

fn render_system(report: &AnalysisReport, out: &mut String) {
    let facts = &report.facts;
    let _ = writeln!(out, "\nSYSTEM");
    let _ = writeln!(
        out,
        "  CPU: {} ({} cores @ {} MHz)",
        facts.cpu.brand, facts.cpu.logical_cores, facts.cpu.frequency_mhz
    );
    let _ = writeln!(
        out,
        "  Memory: {:.1} GB total, {:.1}% used",
        facts.memory.total_bytes as f64 / 1024.0 / 1024.0 / 1024.0,
        facts.memory.usage_percent()
    );
    for disk in &facts.disks {
        let _ = writeln!(
            out,
            "  Disk: {} ({}, {:.0} GB)",
            disk.name,
            disk.kind,
            disk.total_bytes as f64 / 1024.0 / 1024.0 / 1024.0
        );
    }
    let _ = writeln!(
        out,
        "  OS: {} {} ({})",
        facts.os.name, facts.os.version, facts.os.arch
    );
}

fn render_findings(report: &AnalysisReport, out: &mut String) {
    let _ = writeln!(out, "\nCONFIGURATION FINDINGS ({})", report.findings.len());
    if report.findings.is_empty() {
        let _ = writeln!(out, "  No issues detected");
        return;
    }
    for finding in &report.findings {
        let _ = writeln!(
            out,
            "  [{}] {}: {} - {}",
            finding.severity.as_str().to_uppercase(),
            finding.area,
            finding.issue,
            finding.recommendation
        );
    }
}

fn render_summary(report: &AnalysisReport, out: &mut String, top: usize) {
    let summary = &report.summary;
    let _ = writeln!(out, "\nPROCESSES ({} captured)", summary.total_processes);
    let _ = writeln!(
        out,
        "  User: {}  System: {}  Total CPU: {:.1}%  Total Mem: {:.1}%",
        summary.statistics.user_process_count,
        summary.statistics.system_process_count,
        summary.statistics.total_cpu,
        summary.statistics.total_mem
    );

    let _ = writeln!(out, "\n  Categories:");
    for category in &summary.categories {
        if category.stat.count == 0 {
            continue;
        }
        let mut names = category.stat.processes.clone();
        names.sort();
        names.dedup();
        names.truncate(top);
        let _ = writeln!(
            out,
            "    {:<16} {:>4}  cpu {:>6.1}%  mem {:>6.1}%  {}",
            category.name,
            category.stat.count,
            category.stat.total_cpu,
            category.stat.total_mem,
            names.join(", ")
        );
    }

    let _ = writeln!(out, "\n  Top by CPU:");
    for process in summary.top_by_cpu.iter().take(top) {
        let _ = writeln!(
            out,
            "    {:<30} cpu {:>6.1}%  mem {:>6.1}%",
            process.name, process.cpu_percent, process.mem_percent
        );
    }
}

fn render_classification(report: &AnalysisReport, out: &mut String) {
    let classification = &report.classification;
    let _ = writeln!(out, "\nCLASSIFICATION");
    let _ = writeln!(
        out,
        "  Termination: {} (iteration {}, {} service calls, {} cache hits)",
        classification.termination.as_str(),
        classification.iterations,
        classification.service_calls,
        classification.cache_hits
    );
    if let Some(failure) = &classification.failure {
        let _ = writeln!(out, "  Degraded: {}", failure);
    }
    let _ = writeln!(out, "  Unresolved: {}", classification.unresolved.len());

    let inferred: Vec<_> = classification
        .details
        .iter()
        .filter(|(_, r)| r.method == ClassifyMethod::Inference)
        .collect();
    if !inferred.is_empty() {
        let _ = writeln!(out, "\n  Forensic categorizations:");
        for (name, result) in inferred {
            let _ = writeln!(
                out,
                "    {} -> {} ({}%, {})",
                name, result.category, result.confidence, result.threat_level
            );
            let _ = writeln!(out, "      {}", result.reason);
        }
    }
}

fn render_network(report: &AnalysisReport, out: &mut String) {
    let Some(network) = &report.network else {
        return;
    };

    let _ = writeln!(out, "\nNETWORK");
    if let Some(error) = &network.security.error {
        let _ = writeln!(out, "  Connection snapshot failed: {}", error);
        return;
    }

    let _ = writeln!(
        out,
        "  Connections: {} total, {} listening, {} established ({} external)",
        network.breakdown.total,
        network.breakdown.listening.len(),
        network.breakdown.established_count,
        network.breakdown.external_count
    );
    let _ = writeln!(out, "  Risk level: {:?}", network.security.risk_level);

    for risk in &network.security.risks {
        let _ = writeln!(
            out,
            "  [RISK] port {} ({}) on {}: {}",
            risk.port, risk.service, risk.process, risk.recommendation
        );
    }
    for warning in &network.security.warnings {
        let _ = writeln!(
            out,
            "  [WARN] {} ({})",
            warning.recommendation, warning.process
        );
    }
    for recommendation in &network.security.recommendations {
        let _ = writeln!(out, "  - {}", recommendation);
    }
}
