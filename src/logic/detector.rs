//! Misconfiguration Detector
//!
//! Rule evaluation over the host facts: undersized hardware, saturated
//! memory, slow storage. Findings are hints for the report, not faults.

use serde::Serialize;

use super::snapshot::types::SystemFacts;

const GIB: u64 = 1024 * 1024 * 1024;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigFinding {
    pub severity: Severity,
    pub area: &'static str,
    pub issue: String,
    pub description: String,
    pub recommendation: String,
}

// ============================================================================
// DETECTION
// ============================================================================

/// Evaluate every rule against the facts.
pub fn detect(facts: &SystemFacts) -> Vec<ConfigFinding> {
    let mut findings = Vec::new();
    detect_cpu(facts, &mut findings);
    detect_memory(facts, &mut findings);
    detect_storage(facts, &mut findings);
    detect_os(facts, &mut findings);
    findings
}

fn detect_cpu(facts: &SystemFacts, findings: &mut Vec<ConfigFinding>) {
    let cpu = &facts.cpu;

    if cpu.frequency_mhz > 0 && cpu.frequency_mhz < 2000 {
        findings.push(ConfigFinding {
            severity: Severity::Warning,
            area: "CPU",
            issue: "Low clock speed".to_string(),
            description: format!(
                "CPU speed is {:.1}GHz, which may be insufficient for modern applications",
                cpu.frequency_mhz as f64 / 1000.0
            ),
            recommendation: "Consider a CPU with a higher clock speed for better performance"
                .to_string(),
        });
    }

    if cpu.logical_cores > 0 && cpu.logical_cores < 4 {
        findings.push(ConfigFinding {
            severity: Severity::Warning,
            area: "CPU",
            issue: "Limited core count".to_string(),
            description: format!(
                "Only {} cores detected, multitasking may be limited",
                cpu.logical_cores
            ),
            recommendation: "For better multitasking, consider a CPU with at least 4-6 cores"
                .to_string(),
        });
    }
}

fn detect_memory(facts: &SystemFacts, findings: &mut Vec<ConfigFinding>) {
    let memory = &facts.memory;
    if memory.total_bytes == 0 {
        return;
    }

    let total_gib = memory.total_bytes / GIB;
    if total_gib < 8 {
        findings.push(ConfigFinding {
            severity: Severity::Critical,
            area: "Memory",
            issue: "Insufficient RAM".to_string(),
            description: format!("Only {}GB RAM detected, below modern requirements", total_gib),
            recommendation: "Upgrade to at least 16GB RAM for better performance".to_string(),
        });
    } else if total_gib < 16 {
        findings.push(ConfigFinding {
            severity: Severity::Warning,
            area: "Memory",
            issue: "Limited RAM".to_string(),
            description: format!("{}GB RAM may be insufficient for heavy workloads", total_gib),
            recommendation: "Consider 16GB or more for heavy workloads".to_string(),
        });
    }

    let usage = memory.usage_percent();
    if usage > 90.0 {
        findings.push(ConfigFinding {
            severity: Severity::Critical,
            area: "Memory",
            issue: "High memory usage".to_string(),
            description: format!("{:.1}% of RAM is currently in use", usage),
            recommendation: "Close unnecessary applications or upgrade RAM".to_string(),
        });
    } else if usage > 75.0 {
        findings.push(ConfigFinding {
            severity: Severity::Warning,
            area: "Memory",
            issue: "Elevated memory usage".to_string(),
            description: format!("{:.1}% of RAM is currently in use", usage),
            recommendation: "Monitor memory usage and close unused applications".to_string(),
        });
    }
}

fn detect_storage(facts: &SystemFacts, findings: &mut Vec<ConfigFinding>) {
    if facts.disks.is_empty() {
        findings.push(ConfigFinding {
            severity: Severity::Critical,
            area: "Storage",
            issue: "No storage devices found".to_string(),
            description: "No disk drives detected".to_string(),
            recommendation: "Check storage connections and firmware settings".to_string(),
        });
        return;
    }

    for disk in &facts.disks {
        let size_gb = disk.total_bytes / GIB;

        if disk.kind == "HDD" {
            findings.push(ConfigFinding {
                severity: Severity::Warning,
                area: "Storage",
                issue: "Using traditional HDD".to_string(),
                description: format!("Disk {} is an HDD, slower than SSD", disk.name),
                recommendation: "Consider upgrading to SSD for better performance".to_string(),
            });
        }

        if disk.kind == "SSD" && size_gb < 256 {
            findings.push(ConfigFinding {
                severity: Severity::Warning,
                area: "Storage",
                issue: "Small SSD capacity".to_string(),
                description: format!("SSD {} is only {}GB", disk.name, size_gb),
                recommendation: "Consider a larger SSD (500GB+) for adequate storage".to_string(),
            });
        }
    }
}

fn detect_os(facts: &SystemFacts, findings: &mut Vec<ConfigFinding>) {
    let arch = facts.os.arch.to_lowercase();
    if arch == "x86" || arch == "i686" || arch == "ia32" {
        findings.push(ConfigFinding {
            severity: Severity::Info,
            area: "OS",
            issue: "32-bit architecture".to_string(),
            description: "Running a 32-bit OS limits usable memory".to_string(),
            recommendation: "Consider a 64-bit OS for better performance".to_string(),
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::snapshot::types::{CpuFacts, DiskFacts, MemoryFacts, OsFacts};

    fn healthy_facts() -> SystemFacts {
        SystemFacts {
            cpu: CpuFacts {
                brand: "TestCPU".to_string(),
                frequency_mhz: 3600,
                logical_cores: 16,
                physical_cores: Some(8),
            },
            memory: MemoryFacts {
                total_bytes: 32 * GIB,
                used_bytes: 8 * GIB,
                available_bytes: 24 * GIB,
                free_bytes: 20 * GIB,
            },
            disks: vec![DiskFacts {
                name: "nvme0n1".to_string(),
                kind: "SSD".to_string(),
                total_bytes: 1000 * GIB,
                available_bytes: 500 * GIB,
            }],
            os: OsFacts {
                name: "Linux".to_string(),
                version: "6.8".to_string(),
                kernel_version: "6.8.0".to_string(),
                arch: "x86_64".to_string(),
            },
        }
    }

    #[test]
    fn test_healthy_system_has_no_findings() {
        assert!(detect(&healthy_facts()).is_empty());
    }

    #[test]
    fn test_low_ram_is_critical() {
        let mut facts = healthy_facts();
        facts.memory.total_bytes = 4 * GIB;
        facts.memory.used_bytes = GIB;

        let findings = detect(&facts);
        assert!(findings
            .iter()
            .any(|f| f.severity == Severity::Critical && f.issue == "Insufficient RAM"));
    }

    #[test]
    fn test_memory_pressure_thresholds() {
        let mut facts = healthy_facts();
        facts.memory.used_bytes = facts.memory.total_bytes * 95 / 100;
        assert!(detect(&facts)
            .iter()
            .any(|f| f.issue == "High memory usage" && f.severity == Severity::Critical));

        facts.memory.used_bytes = facts.memory.total_bytes * 80 / 100;
        assert!(detect(&facts)
            .iter()
            .any(|f| f.issue == "Elevated memory usage" && f.severity == Severity::Warning));
    }

    #[test]
    fn test_hdd_and_small_ssd_warn() {
        let mut facts = healthy_facts();
        facts.disks = vec![
            DiskFacts {
                name: "sda".to_string(),
                kind: "HDD".to_string(),
                total_bytes: 2000 * GIB,
                available_bytes: 100 * GIB,
            },
            DiskFacts {
                name: "sdb".to_string(),
                kind: "SSD".to_string(),
                total_bytes: 120 * GIB,
                available_bytes: 10 * GIB,
            },
        ];

        let findings = detect(&facts);
        assert!(findings.iter().any(|f| f.issue == "Using traditional HDD"));
        assert!(findings.iter().any(|f| f.issue == "Small SSD capacity"));
    }

    #[test]
    fn test_no_disks_is_critical() {
        let mut facts = healthy_facts();
        facts.disks.clear();
        assert!(detect(&facts)
            .iter()
            .any(|f| f.severity == Severity::Critical && f.area == "Storage"));
    }

    #[test]
    fn test_slow_small_cpu_warns() {
        let mut facts = healthy_facts();
        facts.cpu.frequency_mhz = 1500;
        facts.cpu.logical_cores = 2;

        let findings = detect(&facts);
        assert!(findings.iter().any(|f| f.issue == "Low clock speed"));
        assert!(findings.iter().any(|f| f.issue == "Limited core count"));
    }
}
