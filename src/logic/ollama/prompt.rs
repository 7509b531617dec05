//! Forensic Prompt Composition
//!
//! Derives per-process forensic hints locally (no service calls) and embeds
//! them, together with the run's category taxonomy, into the single
//! structured prompt a batch categorization sends.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::logic::classify::CategoryTaxonomy;
use crate::logic::snapshot::types::ProcessRecord;

/// Command-line excerpt length embedded per candidate.
const COMMAND_EXCERPT_LEN: usize = 150;

// ============================================================================
// PATH FORENSICS
// ============================================================================

/// Where on disk an executable lives, as a trust hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    SystemTrusted,
    InstalledApp,
    UserApp,
    SuspiciousTemp,
    SuspiciousRoot,
    UnknownLocation,
    Unknown,
}

impl PathClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathClass::SystemTrusted => "system_trusted",
            PathClass::InstalledApp => "installed_app",
            PathClass::UserApp => "user_app",
            PathClass::SuspiciousTemp => "suspicious_temp",
            PathClass::SuspiciousRoot => "suspicious_root",
            PathClass::UnknownLocation => "unknown_location",
            PathClass::Unknown => "unknown",
        }
    }
}

// Bare executable sitting at a drive root, e.g. C:\evil.exe
static DRIVE_ROOT_EXE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]:\\[^\\]+\.exe$").expect("valid drive-root pattern"));

/// Classify an executable path into a trust bucket.
pub fn classify_path(path: &str) -> PathClass {
    if path.is_empty() || path == "N/A" {
        return PathClass::Unknown;
    }
    let lower = path.to_lowercase();

    if lower.contains("windows\\system32")
        || lower.contains("windows\\syswow64")
        || lower.starts_with("/usr/bin")
        || lower.starts_with("/usr/sbin")
        || lower.starts_with("/usr/lib")
        || lower.starts_with("/bin")
        || lower.starts_with("/sbin")
        || lower.starts_with("/system")
    {
        return PathClass::SystemTrusted;
    }
    if lower.contains("program files")
        || lower.starts_with("/opt")
        || lower.starts_with("/applications")
        || lower.starts_with("/usr/local")
    {
        return PathClass::InstalledApp;
    }
    if lower.contains("appdata\\local")
        || lower.contains("appdata\\roaming")
        || lower.contains("/.local/")
        || lower.contains("/.cargo/")
        || (lower.starts_with("/home/") || lower.starts_with("/users/"))
    {
        return PathClass::UserApp;
    }
    if lower.contains("temp") || lower.contains("tmp") {
        return PathClass::SuspiciousTemp;
    }
    if DRIVE_ROOT_EXE.is_match(&lower) {
        return PathClass::SuspiciousRoot;
    }

    PathClass::UnknownLocation
}

// ============================================================================
// USER FORENSICS
// ============================================================================

/// Which privilege context a process runs under, as a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserClass {
    SystemService,
    LimitedService,
    UserProcess,
    NoUserInfo,
}

impl UserClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserClass::SystemService => "system_service",
            UserClass::LimitedService => "limited_service",
            UserClass::UserProcess => "user_process",
            UserClass::NoUserInfo => "no_user_info",
        }
    }
}

/// Classify the owning user of a process.
pub fn classify_user(user: &str) -> UserClass {
    if user.is_empty() || user == "N/A" {
        return UserClass::NoUserInfo;
    }
    let upper = user.to_uppercase();

    if upper.contains("SYSTEM") || upper.contains("NT AUTHORITY") || upper == "ROOT" {
        return UserClass::SystemService;
    }
    if upper.contains("LOCAL SERVICE") || upper.contains("NETWORK SERVICE") {
        return UserClass::LimitedService;
    }

    UserClass::UserProcess
}

// ============================================================================
// PROMPT COMPOSITION
// ============================================================================

fn forensic_summary(process: &ProcessRecord) -> serde_json::Value {
    let command_excerpt: String = process.command.chars().take(COMMAND_EXCERPT_LEN).collect();
    let path = if process.path.is_empty() { "N/A" } else { process.path.as_str() };
    let user = if process.user.is_empty() { "N/A" } else { process.user.as_str() };

    json!({
        "name": process.name,
        "path": path,
        "pathAnalysis": classify_path(&process.path).as_str(),
        "parentPid": process.parent_pid,
        "commandLine": command_excerpt,
        "cpu": format!("{:.2}%", process.cpu_percent),
        "memory": format!("{:.2}%", process.mem_percent),
        "memoryPhysical": format!("{:.1}MB", process.mem_rss_bytes as f64 / 1024.0 / 1024.0),
        "memoryVirtual": format!("{:.1}MB", process.mem_vsz_bytes as f64 / 1024.0 / 1024.0),
        "user": user,
        "userType": classify_user(&process.user).as_str(),
        "priority": process.priority,
        "state": if process.state.is_empty() { "running" } else { process.state.as_str() },
    })
}

/// Compose the single batch prompt for a set of candidates.
pub fn build_batch_prompt(candidates: &[&ProcessRecord], taxonomy: &CategoryTaxonomy) -> String {
    let details: Vec<serde_json::Value> =
        candidates.iter().map(|p| forensic_summary(p)).collect();
    let details_json =
        serde_json::to_string_pretty(&details).unwrap_or_else(|_| "[]".to_string());

    let mut categories = taxonomy.category_names().join(", ");
    categories.push_str(", other");

    format!(
        r#"You are a process forensics expert. Analyze these processes deeply using forensic methodology:

PROCESS FORENSIC DATA:
{details_json}

FORENSIC ANALYSIS GUIDELINES:

1. PATH ANALYSIS:
   - System processes MUST live in the OS system directories
   - Suspicious: AppData\Local, Temp folders, random names
   - Safe: Program Files, /opt, /Applications

2. USER CONTEXT:
   - SYSTEM / NT AUTHORITY / root = OS components
   - Named user = user applications
   - Empty user on high CPU = potential malware

3. COMMAND LINE:
   - Look for suspicious flags: --hidden, -nowindow, base64 strings
   - Check for injection attempts or obfuscation

4. RESOURCE PATTERNS:
   - High CPU + network activity = mining or data exfiltration
   - Growing memory + no display = background task/service
   - Multiple threads + user context = legitimate application

5. BEHAVIORAL INDICATORS:
   - Antivirus: high I/O, SYSTEM user, vendor path
   - Updaters: periodic activity, company name in path
   - Malware: typosquatting names, unusual locations, no user

Available categories: {categories}

Respond with ONLY valid JSON:
{{
  "categorizations": [
    {{
      "process": "processname",
      "category": "security",
      "confidence": 95,
      "reason": "Why this classification fits the forensic evidence",
      "threat_level": "safe|suspicious|unknown"
    }}
  ]
}}"#
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_classes_windows() {
        assert_eq!(
            classify_path("C:\\Windows\\System32\\svchost.exe"),
            PathClass::SystemTrusted
        );
        assert_eq!(
            classify_path("C:\\Program Files\\App\\app.exe"),
            PathClass::InstalledApp
        );
        assert_eq!(
            classify_path("C:\\Users\\bob\\AppData\\Local\\Tool\\tool.exe"),
            PathClass::UserApp
        );
        assert_eq!(
            classify_path("C:\\Users\\bob\\Temp\\dropper.exe"),
            PathClass::SuspiciousTemp
        );
        assert_eq!(classify_path("C:\\evil.exe"), PathClass::SuspiciousRoot);
        assert_eq!(classify_path(""), PathClass::Unknown);
        assert_eq!(classify_path("D:\\data\\thing.bin"), PathClass::UnknownLocation);
    }

    #[test]
    fn test_path_classes_unix() {
        assert_eq!(classify_path("/usr/bin/sshd"), PathClass::SystemTrusted);
        assert_eq!(classify_path("/opt/myapp/bin/myapp"), PathClass::InstalledApp);
        assert_eq!(classify_path("/home/bob/.local/bin/tool"), PathClass::UserApp);
        assert_eq!(classify_path("/tmp/miner"), PathClass::SuspiciousTemp);
    }

    #[test]
    fn test_user_classes() {
        assert_eq!(classify_user("NT AUTHORITY\\SYSTEM"), UserClass::SystemService);
        assert_eq!(classify_user("root"), UserClass::SystemService);
        assert_eq!(classify_user("LOCAL SERVICE"), UserClass::LimitedService);
        assert_eq!(classify_user("alice"), UserClass::UserProcess);
        assert_eq!(classify_user(""), UserClass::NoUserInfo);
    }

    #[test]
    fn test_prompt_embeds_candidates_and_categories() {
        let process = ProcessRecord {
            pid: 7,
            name: "mystery-daemon".to_string(),
            cpu_percent: 12.5,
            mem_percent: 3.0,
            mem_rss_bytes: 50 * 1024 * 1024,
            mem_vsz_bytes: 200 * 1024 * 1024,
            path: "/tmp/mystery-daemon".to_string(),
            command: "mystery-daemon --serve".to_string(),
            parent_pid: Some(1),
            user: "bob".to_string(),
            priority: None,
            state: "running".to_string(),
            start_time_secs: 0,
        };
        let taxonomy = CategoryTaxonomy::builtin();
        let prompt = build_batch_prompt(&[&process], &taxonomy);

        assert!(prompt.contains("mystery-daemon"));
        assert!(prompt.contains("suspicious_temp"));
        assert!(prompt.contains("user_process"));
        assert!(prompt.contains("development, gaming"));
        assert!(prompt.contains(", other"));
        assert!(prompt.contains("\"categorizations\""));
    }
}
