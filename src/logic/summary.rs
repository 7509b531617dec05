//! Classified Process Summary
//!
//! Aggregates the snapshot's processes and the convergence outcome into the
//! category -> statistics shape the report renderer consumes.

use serde::Serialize;

use super::classify::Category;
use super::convergence::ConvergenceOutcome;
use super::snapshot::types::ProcessRecord;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TopProcess {
    pub name: String,
    pub cpu_percent: f32,
    pub mem_percent: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryStat {
    pub count: usize,
    pub total_cpu: f32,
    pub total_mem: f32,
    pub processes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    #[serde(flatten)]
    pub stat: CategoryStat,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessStatistics {
    pub total_cpu: f32,
    pub total_mem: f32,
    pub user_process_count: usize,
    pub system_process_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    pub total_processes: usize,
    pub statistics: ProcessStatistics,
    pub top_by_cpu: Vec<TopProcess>,
    pub top_by_mem: Vec<TopProcess>,
    /// Categories in declared order, then the unresolved "other" bucket.
    pub categories: Vec<CategorySummary>,
}

// ============================================================================
// BUILD
// ============================================================================

const TOP_LIMIT: usize = 10;

/// Build the summary from the snapshot and the classification outcome.
pub fn build(processes: &[ProcessRecord], outcome: &ConvergenceOutcome) -> ProcessSummary {
    let mut statistics = ProcessStatistics::default();
    let mut stats: Vec<(String, CategoryStat)> = Category::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), CategoryStat::default()))
        .collect();
    stats.push(("other".to_string(), CategoryStat::default()));
    let other_index = stats.len() - 1;

    for process in processes {
        statistics.total_cpu += process.cpu_percent;
        statistics.total_mem += process.mem_percent;
        if is_system_process(process) {
            statistics.system_process_count += 1;
        } else {
            statistics.user_process_count += 1;
        }

        let index = outcome
            .categorizations
            .get(&process.name.to_lowercase())
            .and_then(|category| {
                Category::ALL.iter().position(|c| c == category)
            })
            .unwrap_or(other_index);

        let stat = &mut stats[index].1;
        stat.count += 1;
        stat.total_cpu += process.cpu_percent;
        stat.total_mem += process.mem_percent;
        stat.processes.push(process.name.clone());
    }

    ProcessSummary {
        total_processes: processes.len(),
        statistics,
        top_by_cpu: top_by(processes, |p| p.cpu_percent),
        top_by_mem: top_by(processes, |p| p.mem_percent),
        categories: stats
            .into_iter()
            .map(|(name, stat)| CategorySummary { name, stat })
            .collect(),
    }
}

fn top_by(processes: &[ProcessRecord], key: impl Fn(&ProcessRecord) -> f32) -> Vec<TopProcess> {
    let mut sorted: Vec<&ProcessRecord> = processes.iter().collect();
    sorted.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(std::cmp::Ordering::Equal));
    sorted
        .into_iter()
        .take(TOP_LIMIT)
        .map(|p| TopProcess {
            name: p.name.clone(),
            cpu_percent: p.cpu_percent,
            mem_percent: p.mem_percent,
        })
        .collect()
}

const SYSTEM_PROCESS_NAMES: &[&str] = &[
    "system", "idle", "registry", "csrss", "wininit", "services", "lsass",
    "svchost", "dwm", "winlogon", "kthreadd", "systemd", "init", "launchd",
];

/// Heuristic user/system split. The user field is often empty on Windows,
/// so well-known names and low pids stand in.
fn is_system_process(process: &ProcessRecord) -> bool {
    let name = process.name.to_lowercase();
    if SYSTEM_PROCESS_NAMES.iter().any(|s| name.contains(s)) {
        return true;
    }

    let user_upper = process.user.to_uppercase();
    if user_upper.contains("SYSTEM") || user_upper.contains("NT AUTHORITY") || user_upper == "ROOT"
    {
        return true;
    }

    process.user.is_empty() && (process.pid < 100 || name.starts_with("nt") || name.starts_with("sm"))
}

// ============================================================================
// TESTS
// ============================================================================
