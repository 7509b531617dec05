//! Process Table Sensor
//!
//! Reads the running process table via sysinfo into `ProcessRecord`s.
//! This is the one sensor whose failure aborts the run: with no process
//! table there is nothing to classify.

use sysinfo::{System, Users};

use super::types::ProcessRecord;
use super::SnapshotError;

/// Read the process table, sorted by CPU descending and truncated to
/// `max_processes`. Also returns the untruncated process count.
pub fn read_processes(max_processes: usize) -> Result<(Vec<ProcessRecord>, usize), SnapshotError> {
    let mut sys = System::new_all();
    sys.refresh_all();

    // CPU usage needs two samples a short interval apart.
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_processes();

    if sys.processes().is_empty() {
        return Err(SnapshotError::ProcessTable(
            "sensor returned an empty process table".to_string(),
        ));
    }

    let users = Users::new_with_refreshed_list();
    let total_memory = sys.total_memory();
    let total_count = sys.processes().len();

    let mut records: Vec<ProcessRecord> = sys
        .processes()
        .iter()
        .filter(|(_, p)| !p.name().trim().is_empty())
        .map(|(pid, process)| {
            let mem_rss = process.memory();
            let mem_percent = if total_memory > 0 {
                (mem_rss as f64 / total_memory as f64 * 100.0) as f32
            } else {
                0.0
            };

            let user = process
                .user_id()
                .and_then(|uid| users.get_user_by_id(uid))
                .map(|u| u.name().to_string())
                .unwrap_or_default();

            ProcessRecord {
                pid: pid.as_u32(),
                name: process.name().to_string(),
                cpu_percent: process.cpu_usage(),
                mem_percent,
                mem_rss_bytes: mem_rss,
                mem_vsz_bytes: process.virtual_memory(),
                path: process
                    .exe()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default(),
                command: process.cmd().join(" "),
                parent_pid: process.parent().map(|p| p.as_u32()),
                user,
                priority: None,
                state: format!("{:?}", process.status()),
                start_time_secs: process.start_time(),
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    records.truncate(max_processes);

    log::debug!(
        "Process sensor captured {} records ({} total)",
        records.len(),
        total_count
    );

    Ok((records, total_count))
}
