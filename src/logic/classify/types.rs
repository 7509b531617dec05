//! Classification Types
//!
//! Core types for process classification. No logic - data structures only.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY
// ============================================================================

/// Functional category of a process.
///
/// The variant order is the evaluation order of the keyword classifier:
/// the first category whose keyword set matches wins, so reordering
/// variants changes classification behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Development,
    Gaming,
    Office,
    Browsers,
    Media,
    Communication,
    Database,
    Networking,
    Security,
    Virtualization,
    CloudStorage,
    Ai,
    Streaming,
    System,
}

impl Category {
    /// All categories in evaluation order.
    pub const ALL: [Category; 14] = [
        Category::Development,
        Category::Gaming,
        Category::Office,
        Category::Browsers,
        Category::Media,
        Category::Communication,
        Category::Database,
        Category::Networking,
        Category::Security,
        Category::Virtualization,
        Category::CloudStorage,
        Category::Ai,
        Category::Streaming,
        Category::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Development => "development",
            Category::Gaming => "gaming",
            Category::Office => "office",
            Category::Browsers => "browsers",
            Category::Media => "media",
            Category::Communication => "communication",
            Category::Database => "database",
            Category::Networking => "networking",
            Category::Security => "security",
            Category::Virtualization => "virtualization",
            Category::CloudStorage => "cloudStorage",
            Category::Ai => "ai",
            Category::Streaming => "streaming",
            Category::System => "system",
        }
    }

    /// Parse a category name, case-insensitively.
    pub fn parse(name: &str) -> Option<Category> {
        let lower = name.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().to_lowercase() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT LEVEL
// ============================================================================

/// Heuristic threat assessment attached to a classification.
/// A hint, not a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Safe,
    Suspicious,
    Unknown,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Safe => "safe",
            ThreatLevel::Suspicious => "suspicious",
            ThreatLevel::Unknown => "unknown",
        }
    }

    /// Parse a threat level from service output; anything unrecognized
    /// degrades to `Unknown`.
    pub fn parse(value: &str) -> ThreatLevel {
        match value.trim().to_lowercase().as_str() {
            "safe" => ThreatLevel::Safe,
            "suspicious" => ThreatLevel::Suspicious,
            _ => ThreatLevel::Unknown,
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CLASSIFICATION METHOD
// ============================================================================

/// How a classification was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifyMethod {
    /// Keyword signature match. Terminal for the process within a run.
    Keyword,
    /// Inference-service categorization.
    Inference,
    /// No method produced a result.
    Unresolved,
}

impl ClassifyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifyMethod::Keyword => "keyword",
            ClassifyMethod::Inference => "inference",
            ClassifyMethod::Unresolved => "unresolved",
        }
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// The single classification a process carries within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// 0-100.
    pub confidence: u8,
    pub reason: String,
    pub threat_level: ThreatLevel,
    pub method: ClassifyMethod,
}

impl ClassificationResult {
    /// Result for a keyword signature match.
    pub fn keyword(category: Category, keyword: &str) -> Self {
        Self {
            category,
            confidence: 95,
            reason: format!("Matched known {} software signature '{}'", category, keyword),
            threat_level: ThreatLevel::Safe,
            method: ClassifyMethod::Keyword,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_fixed() {
        assert_eq!(Category::ALL[0], Category::Development);
        assert_eq!(Category::ALL[13], Category::System);
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for cat in Category::ALL {
            assert_eq!(Category::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(Category::parse("CLOUDSTORAGE"), Some(Category::CloudStorage));
        assert_eq!(Category::parse("no-such-category"), None);
    }

    #[test]
    fn test_threat_level_parse_degrades_to_unknown() {
        assert_eq!(ThreatLevel::parse("safe"), ThreatLevel::Safe);
        assert_eq!(ThreatLevel::parse("Suspicious"), ThreatLevel::Suspicious);
        assert_eq!(ThreatLevel::parse("???"), ThreatLevel::Unknown);
    }

    #[test]
    fn test_result_serde_roundtrip() {
        let result = ClassificationResult::keyword(Category::Browsers, "firefox.exe");
        let json = serde_json::to_string(&result).unwrap();
        let back: ClassificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
