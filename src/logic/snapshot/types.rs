//! Snapshot Types
//!
//! Immutable per-run snapshot values produced by the sensor collectors.
//! Read-only to every engine downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// PROCESS RECORD
// ============================================================================

/// One process as observed at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    // Identity
    pub pid: u32,
    pub name: String,

    // Resource usage
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub mem_rss_bytes: u64,
    pub mem_vsz_bytes: u64,

    // Provenance
    pub path: String,
    pub command: String,
    pub parent_pid: Option<u32>,

    // Identity & privilege
    pub user: String,
    /// Not exposed by the process sensor on every platform.
    pub priority: Option<i64>,

    // Lifecycle
    pub state: String,
    pub start_time_secs: u64,
}

impl ProcessRecord {
    /// Combined resource weight used to rank inference candidates.
    pub fn load_score(&self) -> f32 {
        self.cpu_percent + self.mem_percent
    }
}

// ============================================================================
// CONNECTION RECORD
// ============================================================================

/// Lifecycle state of an observed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnState {
    Listen,
    Established,
    Other(String),
}

impl ConnState {
    pub fn as_str(&self) -> &str {
        match self {
            ConnState::Listen => "LISTEN",
            ConnState::Established => "ESTABLISHED",
            ConnState::Other(s) => s.as_str(),
        }
    }

    /// Parse a state token as reported by the connection sensor.
    pub fn parse(token: &str) -> ConnState {
        match token.trim_matches(|c| c == '(' || c == ')') {
            "LISTEN" | "LISTENING" => ConnState::Listen,
            "ESTABLISHED" => ConnState::Established,
            other => ConnState::Other(other.to_string()),
        }
    }
}

impl Serialize for ConnState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One network connection as observed at capture time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionRecord {
    pub protocol: String,
    pub local_address: String,
    pub local_port: u16,
    pub peer_address: String,
    pub peer_port: u16,
    pub state: ConnState,
    pub process: String,
    pub pid: Option<u32>,
}

// ============================================================================
// SYSTEM FACTS
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuFacts {
    pub brand: String,
    pub frequency_mhz: u64,
    pub logical_cores: usize,
    pub physical_cores: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryFacts {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub free_bytes: u64,
}

impl MemoryFacts {
    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.total_bytes as f64 * 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskFacts {
    pub name: String,
    /// "SSD", "HDD" or an unknown kind as reported by the sensor.
    pub kind: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OsFacts {
    pub name: String,
    pub version: String,
    pub kernel_version: String,
    pub arch: String,
}

/// Host hardware/OS facts gathered once per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemFacts {
    pub cpu: CpuFacts,
    pub memory: MemoryFacts,
    pub disks: Vec<DiskFacts>,
    pub os: OsFacts,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// The atomic per-run input to the classification core: every sensor area
/// joined before any engine runs.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub facts: SystemFacts,
    pub processes: Vec<ProcessRecord>,
    pub total_process_count: usize,
    pub connections: Vec<ConnectionRecord>,
    /// Set when the connection sensor failed; the network report carries it.
    pub connection_error: Option<String>,
}

// ============================================================================
// TESTS
// ============================================================================
