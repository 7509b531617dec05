//! Network Risk Scorer
//!
//! Pure classification of a connection snapshot against a known-service
//! table and a dangerous-port set. No iteration, no external calls; the
//! same classified-entity shapes as the process engines, consumed by the
//! report renderer.

use std::collections::BTreeMap;

use serde::Serialize;

use super::snapshot::types::{ConnState, ConnectionRecord};

// ============================================================================
// PORT TABLES
// ============================================================================

/// Well-known ports to service names.
const KNOWN_SERVICES: &[(u16, &str)] = &[
    (20, "FTP Data"),
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1433, "SQL Server"),
    (1521, "Oracle"),
    (3000, "Dev Server"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (6379, "Redis"),
    (8080, "HTTP Proxy"),
    (8443, "HTTPS Alt"),
    (11434, "Ollama"),
    (27017, "MongoDB"),
];

/// Listening on any of these is flagged.
const DANGEROUS_PORTS: &[u16] = &[23, 21, 445, 3389, 5900];

/// Outbound peer ports considered ordinary.
const COMMON_OUTBOUND_PORTS: &[u16] = &[80, 443, 53, 8080, 8443];

/// Map a port to its well-known service name.
pub fn identify_service(port: u16) -> &'static str {
    KNOWN_SERVICES
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

/// Locality by prefix matching, never DNS resolution.
pub fn is_local_address(address: &str) -> bool {
    if address.is_empty() {
        return true;
    }
    address == "127.0.0.1"
        || address == "::1"
        || address == "localhost"
        || address.starts_with("192.168.")
        || address.starts_with("10.")
        || address.starts_with("172.16.")
        || address == "0.0.0.0"
        || address == "::"
        || address == "*"
}

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Normal,
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    DangerousPort,
    UnusualOutbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Low,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskFinding {
    pub kind: FindingKind,
    pub port: u16,
    pub service: String,
    pub process: String,
    pub severity: FindingSeverity,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningPort {
    pub port: u16,
    pub address: String,
    pub process: String,
    pub pid: Option<u32>,
    pub service: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionBreakdown {
    pub total: usize,
    pub by_state: BTreeMap<String, usize>,
    pub by_protocol: BTreeMap<String, usize>,
    pub listening: Vec<ListeningPort>,
    pub established_count: usize,
    pub external_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityAnalysis {
    pub risk_level: RiskLevel,
    /// `dangerous_port` findings.
    pub risks: Vec<RiskFinding>,
    /// `unusual_outbound` findings.
    pub warnings: Vec<RiskFinding>,
    pub recommendations: Vec<String>,
    /// Set when the upstream connection snapshot itself failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkReport {
    pub breakdown: ConnectionBreakdown,
    pub security: SecurityAnalysis,
}

// ============================================================================
// ANALYSIS
// ============================================================================

/// Score one connection snapshot.
pub fn analyze(connections: &[ConnectionRecord], sensor_error: Option<String>) -> NetworkReport {
    let mut breakdown = ConnectionBreakdown {
        total: connections.len(),
        ..Default::default()
    };
    let mut risks = Vec::new();
    let mut warnings = Vec::new();

    for conn in connections {
        *breakdown
            .by_state
            .entry(conn.state.as_str().to_string())
            .or_insert(0) += 1;
        *breakdown
            .by_protocol
            .entry(conn.protocol.clone())
            .or_insert(0) += 1;

        match &conn.state {
            ConnState::Listen => {
                breakdown.listening.push(ListeningPort {
                    port: conn.local_port,
                    address: conn.local_address.clone(),
                    process: conn.process.clone(),
                    pid: conn.pid,
                    service: identify_service(conn.local_port).to_string(),
                });

                if DANGEROUS_PORTS.contains(&conn.local_port) {
                    let service = identify_service(conn.local_port);
                    risks.push(RiskFinding {
                        kind: FindingKind::DangerousPort,
                        port: conn.local_port,
                        service: service.to_string(),
                        process: conn.process.clone(),
                        severity: FindingSeverity::High,
                        recommendation: format!(
                            "Port {} ({}) is open. Close it if it is not needed.",
                            conn.local_port, service
                        ),
                    });
                }
            }
            ConnState::Established => {
                breakdown.established_count += 1;

                if !is_local_address(&conn.peer_address) {
                    breakdown.external_count += 1;

                    if conn.peer_port != 0 && !COMMON_OUTBOUND_PORTS.contains(&conn.peer_port) {
                        warnings.push(RiskFinding {
                            kind: FindingKind::UnusualOutbound,
                            port: conn.peer_port,
                            service: identify_service(conn.peer_port).to_string(),
                            process: conn.process.clone(),
                            severity: FindingSeverity::Low,
                            recommendation: format!(
                                "Connection to {} on non-standard port {}",
                                conn.peer_address, conn.peer_port
                            ),
                        });
                    }
                }
            }
            ConnState::Other(_) => {}
        }
    }

    let risk_level = if risks.is_empty() {
        RiskLevel::Normal
    } else {
        RiskLevel::Elevated
    };
    let recommendations = build_recommendations(&risks);

    NetworkReport {
        breakdown,
        security: SecurityAnalysis {
            risk_level,
            risks,
            warnings,
            recommendations,
            error: sensor_error,
        },
    }
}

/// One fixed recommendation per flagged port family.
fn build_recommendations(risks: &[RiskFinding]) -> Vec<String> {
    let mut recommendations = Vec::new();
    let has_port = |port: u16| risks.iter().any(|r| r.port == port);

    if has_port(23) {
        recommendations.push("Disable Telnet and use SSH for remote access".to_string());
    }
    if has_port(21) {
        recommendations.push("Prefer SFTP or FTPS over unencrypted FTP".to_string());
    }
    if has_port(3389) {
        recommendations
            .push("Protect RDP behind a VPN or Network Level Authentication".to_string());
    }
    if has_port(445) {
        recommendations.push("Keep SMB firewalled from untrusted networks".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push("No significant network risk detected".to_string());
    }

    recommendations
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn listen(port: u16) -> ConnectionRecord {
        ConnectionRecord {
            protocol: "tcp".to_string(),
            local_address: "0.0.0.0".to_string(),
            local_port: port,
            peer_address: String::new(),
            peer_port: 0,
            state: ConnState::Listen,
            process: "testd".to_string(),
            pid: Some(321),
        }
    }

    fn established(peer_address: &str, peer_port: u16) -> ConnectionRecord {
        ConnectionRecord {
            protocol: "tcp".to_string(),
            local_address: "192.168.1.10".to_string(),
            local_port: 51000,
            peer_address: peer_address.to_string(),
            peer_port,
            state: ConnState::Established,
            process: "client".to_string(),
            pid: Some(654),
        }
    }

    #[test]
    fn test_service_table() {
        assert_eq!(identify_service(22), "SSH");
        assert_eq!(identify_service(443), "HTTPS");
        assert_eq!(identify_service(3389), "RDP");
        assert_eq!(identify_service(49999), "Unknown");
    }

    #[test]
    fn test_locality_prefixes() {
        assert!(is_local_address("127.0.0.1"));
        assert!(is_local_address("192.168.1.1"));
        assert!(is_local_address("10.20.30.40"));
        assert!(is_local_address("172.16.5.5"));
        assert!(is_local_address(""));
        assert!(!is_local_address("8.8.8.8"));
        assert!(!is_local_address("172.200.0.1"));
    }

    #[test]
    fn test_telnet_listener_elevates_risk() {
        let report = analyze(&[listen(23)], None);

        assert_eq!(report.security.risk_level, RiskLevel::Elevated);
        assert_eq!(report.security.risks.len(), 1);

        let finding = &report.security.risks[0];
        assert_eq!(finding.kind, FindingKind::DangerousPort);
        assert_eq!(finding.port, 23);
        assert_eq!(finding.service, "Telnet");
        assert!(report
            .security
            .recommendations
            .iter()
            .any(|r| r.contains("Telnet")));
    }

    #[test]
    fn test_unusual_outbound_warning() {
        let report = analyze(&[established("8.8.8.8", 4444)], None);

        assert_eq!(report.security.risk_level, RiskLevel::Normal);
        assert_eq!(report.security.warnings.len(), 1);

        let warning = &report.security.warnings[0];
        assert_eq!(warning.kind, FindingKind::UnusualOutbound);
        assert_eq!(warning.port, 4444);
    }

    #[test]
    fn test_private_peer_produces_no_warning() {
        let report = analyze(&[established("192.168.1.1", 9999)], None);
        assert!(report.security.warnings.is_empty());
    }

    #[test]
    fn test_common_outbound_port_is_quiet() {
        let report = analyze(&[established("8.8.8.8", 443)], None);
        assert!(report.security.warnings.is_empty());
        assert_eq!(report.breakdown.external_count, 1);
    }

    #[test]
    fn test_safe_listener_counted_but_not_flagged() {
        let report = analyze(&[listen(22), listen(8080)], None);

        assert_eq!(report.breakdown.listening.len(), 2);
        assert!(report.security.risks.is_empty());
        assert_eq!(report.security.risk_level, RiskLevel::Normal);
        assert_eq!(
            report.security.recommendations,
            vec!["No significant network risk detected".to_string()]
        );
    }

    #[test]
    fn test_breakdown_counts() {
        let conns = vec![
            listen(22),
            established("8.8.8.8", 443),
            established("192.168.1.4", 443),
            ConnectionRecord {
                state: ConnState::Other("CLOSE_WAIT".to_string()),
                ..established("1.1.1.1", 443)
            },
        ];
        let report = analyze(&conns, None);

        assert_eq!(report.breakdown.total, 4);
        assert_eq!(report.breakdown.by_state.get("LISTEN"), Some(&1));
        assert_eq!(report.breakdown.by_state.get("ESTABLISHED"), Some(&2));
        assert_eq!(report.breakdown.by_state.get("CLOSE_WAIT"), Some(&1));
        assert_eq!(report.breakdown.by_protocol.get("tcp"), Some(&4));
        assert_eq!(report.breakdown.established_count, 2);
        assert_eq!(report.breakdown.external_count, 1);
    }

    #[test]
    fn test_sensor_error_is_surfaced() {
        let report = analyze(&[], Some("lsof not found".to_string()));
        assert_eq!(report.security.error.as_deref(), Some("lsof not found"));
        assert_eq!(report.security.risk_level, RiskLevel::Normal);
    }
}
