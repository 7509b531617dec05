//! Connection Sensor
//!
//! Captures the current connection table by shelling out to `lsof` and
//! parsing its socket listing. A missing tool or parse trouble degrades to
//! an error the network report carries; it never aborts the run.

use std::process::Command;

use super::types::{ConnState, ConnectionRecord};
use super::SnapshotError;

/// Capture the connection table.
pub fn read_connections() -> Result<Vec<ConnectionRecord>, SnapshotError> {
    let output = Command::new("lsof")
        .args(["-nP", "-i"])
        .output()
        .map_err(|e| SnapshotError::ConnectionSensor(format!("cannot run lsof: {}", e)))?;

    if !output.status.success() && output.stdout.is_empty() {
        return Err(SnapshotError::ConnectionSensor(format!(
            "lsof exited with {}",
            output.status
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(parse_lsof_output(&text))
}

/// Parse `lsof -nP -i` socket lines.
///
/// Columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME, where NAME
/// is `local` or `local->peer` with an optional trailing `(STATE)`.
pub fn parse_lsof_output(text: &str) -> Vec<ConnectionRecord> {
    text.lines()
        .skip(1)
        .filter_map(parse_lsof_line)
        .collect()
}

fn parse_lsof_line(line: &str) -> Option<ConnectionRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 9 {
        return None;
    }

    let process = fields[0].to_string();
    let pid = fields[1].parse::<u32>().ok();
    let protocol = fields[7].to_lowercase();
    if protocol != "tcp" && protocol != "udp" {
        return None;
    }

    let (local, peer) = match fields[8].split_once("->") {
        Some((local, peer)) => (local, Some(peer)),
        None => (fields[8], None),
    };
    let (local_address, local_port) = parse_endpoint(local)?;
    let (peer_address, peer_port) = match peer {
        Some(peer) => parse_endpoint(peer)?,
        None => (String::new(), 0),
    };

    let state = match fields.get(9) {
        Some(token) => ConnState::parse(token),
        // UDP sockets carry no state column.
        None => ConnState::Other("STATELESS".to_string()),
    };

    Some(ConnectionRecord {
        protocol,
        local_address,
        local_port,
        peer_address,
        peer_port,
        state,
        process,
        pid,
    })
}

/// Split `addr:port`, tolerating bracketed IPv6 and `*` wildcards.
fn parse_endpoint(endpoint: &str) -> Option<(String, u16)> {
    let (addr, port) = endpoint.rsplit_once(':')?;
    let port = if port == "*" { 0 } else { port.parse::<u16>().ok()? };
    let addr = addr.trim_start_matches('[').trim_end_matches(']').to_string();
    Some((addr, port))
}

// ============================================================================
// TESTS
// ============================================================================
