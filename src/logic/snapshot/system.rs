//! Host Facts Sensor
//!
//! CPU, memory, disk and OS identity, gathered once per run. Every field
//! tolerates absent data; this sensor cannot fail the run.

use sysinfo::{DiskKind, Disks, System};

use super::types::{CpuFacts, DiskFacts, MemoryFacts, OsFacts, SystemFacts};

pub fn collect_system_facts() -> SystemFacts {
    let mut sys = System::new_all();
    sys.refresh_all();

    let cpu = CpuFacts {
        brand: sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_default(),
        frequency_mhz: sys.cpus().first().map(|c| c.frequency()).unwrap_or(0),
        logical_cores: sys.cpus().len(),
        physical_cores: sys.physical_core_count(),
    };

    let memory = MemoryFacts {
        total_bytes: sys.total_memory(),
        used_bytes: sys.used_memory(),
        available_bytes: sys.available_memory(),
        free_bytes: sys.free_memory(),
    };

    let disks = Disks::new_with_refreshed_list()
        .iter()
        .map(|disk| DiskFacts {
            name: disk.name().to_string_lossy().to_string(),
            kind: match disk.kind() {
                DiskKind::HDD => "HDD".to_string(),
                DiskKind::SSD => "SSD".to_string(),
                DiskKind::Unknown(_) => "Unknown".to_string(),
            },
            total_bytes: disk.total_space(),
            available_bytes: disk.available_space(),
        })
        .collect();

    let os = OsFacts {
        name: System::name().unwrap_or_default(),
        version: System::os_version().unwrap_or_default(),
        kernel_version: System::kernel_version().unwrap_or_default(),
        arch: System::cpu_arch().unwrap_or_default(),
    };

    SystemFacts {
        cpu,
        memory,
        disks,
        os,
    }
}
