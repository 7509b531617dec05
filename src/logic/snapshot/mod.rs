//! Snapshot Sensors
//!
//! Point-in-time acquisition of host facts, the process table and the
//! connection table. The three areas are gathered concurrently and joined
//! into one atomic [`Snapshot`] before any engine runs. Only the process
//! table is allowed to fail the run; everything else degrades.

pub mod network;
pub mod process;
pub mod system;
pub mod types;

use chrono::Utc;
use thiserror::Error;

pub use types::Snapshot;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("process table unreadable: {0}")]
    ProcessTable(String),
    #[error("connection sensor failed: {0}")]
    ConnectionSensor(String),
}

/// Capture one snapshot. The sensor areas run concurrently on blocking
/// threads; classification starts only after the join.
pub async fn collect(max_processes: usize, with_network: bool) -> Result<Snapshot, SnapshotError> {
    let facts_task = tokio::task::spawn_blocking(system::collect_system_facts);
    let process_task =
        tokio::task::spawn_blocking(move || process::read_processes(max_processes));
    let network_task = tokio::task::spawn_blocking(move || {
        if with_network {
            network::read_connections().map(Some)
        } else {
            Ok(None)
        }
    });

    let (facts, processes, connections) = tokio::join!(facts_task, process_task, network_task);

    let facts = match facts {
        Ok(facts) => facts,
        Err(e) => {
            log::warn!("Host facts sensor panicked: {}", e);
            types::SystemFacts::default()
        }
    };

    let (processes, total_process_count) = processes
        .map_err(|e| SnapshotError::ProcessTable(format!("sensor task failed: {}", e)))??;

    let (connections, connection_error) = match connections {
        Ok(Ok(Some(conns))) => (conns, None),
        Ok(Ok(None)) => (Vec::new(), None),
        Ok(Err(e)) => {
            log::warn!("Connection sensor: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
        Err(e) => (Vec::new(), Some(format!("sensor task failed: {}", e))),
    };

    Ok(Snapshot {
        captured_at: Utc::now(),
        facts,
        processes,
        total_process_count,
        connections,
        connection_error,
    })
}
