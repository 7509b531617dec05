//! Process Fingerprint
//!
//! Stable identity hash used as the result-cache key. Derived only from the
//! normalized name, path and a bounded command-line prefix, so the same
//! program yields the same fingerprint across runs and pids.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::logic::snapshot::types::ProcessRecord;

/// Command-line prefix length included in the fingerprint.
const COMMAND_PREFIX_LEN: usize = 100;

/// Hex Sha256 over a process's normalized identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint(String);

/// Normalized key material; serialized deterministically before hashing.
#[derive(Serialize)]
struct KeyData<'a> {
    name: String,
    path: String,
    command: &'a str,
}

impl Fingerprint {
    pub fn of(process: &ProcessRecord) -> Self {
        let command_lower = process.command.to_lowercase();
        let prefix_end = command_lower
            .char_indices()
            .nth(COMMAND_PREFIX_LEN)
            .map(|(i, _)| i)
            .unwrap_or(command_lower.len());

        let key = KeyData {
            name: process.name.to_lowercase(),
            path: process.path.to_lowercase(),
            command: &command_lower[..prefix_end],
        };

        // Struct field order makes the serialized form deterministic.
        let encoded = serde_json::to_vec(&key).unwrap_or_default();
        let digest = Sha256::digest(&encoded);
        Fingerprint(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
