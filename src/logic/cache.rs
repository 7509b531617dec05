//! Result Cache
//!
//! Persists classification results keyed by process fingerprint, one JSON
//! file per fingerprint, with TTL expiry. The cache is an optimization and
//! never a source of truth: unreadable or corrupt state is a miss, failed
//! writes are logged and swallowed, and a disabled cache turns every
//! operation into a no-op.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::classify::{ClassificationResult, Fingerprint};

// ============================================================================
// ON-DISK FORMAT
// ============================================================================

/// One persisted entry. The file name is the fingerprint plus `.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Write time, epoch milliseconds.
    pub timestamp: i64,
    pub process_name: String,
    pub data: ClassificationResult,
}

// ============================================================================
// STATS & BATCH TYPES
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub entry_count: usize,
    pub total_bytes: u64,
    /// Epoch milliseconds of the oldest/newest entry, when any exist.
    pub oldest_timestamp: Option<i64>,
    pub newest_timestamp: Option<i64>,
}

/// Result of partitioning a fingerprint batch in one pass.
#[derive(Debug, Default)]
pub struct BatchLookup {
    pub hits: HashMap<Fingerprint, ClassificationResult>,
    pub misses: Vec<Fingerprint>,
}

// ============================================================================
// CACHE
// ============================================================================

pub struct ResultCache {
    enabled: bool,
    dir: PathBuf,
    ttl_ms: i64,
}

impl ResultCache {
    pub fn new(enabled: bool, dir: PathBuf, ttl_hours: u64) -> Self {
        Self {
            enabled,
            dir,
            ttl_ms: ttl_hours as i64 * 3_600_000,
        }
    }

    /// A cache that ignores every operation.
    pub fn disabled() -> Self {
        Self::new(false, PathBuf::new(), 0)
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.json", fingerprint))
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        Self::now_ms() - entry.timestamp > self.ttl_ms
    }

    /// Look up one fingerprint. Expired entries are evicted as a side
    /// effect and reported as a miss.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<ClassificationResult> {
        if !self.enabled {
            return None;
        }

        let path = self.entry_path(fingerprint);
        let content = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Corrupt cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if self.is_expired(&entry) {
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(entry.data)
    }

    /// Persist one result. Best-effort: a failed write must never abort
    /// classification, so errors are logged and dropped.
    pub fn put(&self, fingerprint: &Fingerprint, process_name: &str, result: &ClassificationResult) {
        if !self.enabled {
            return;
        }

        if let Err(e) = fs::create_dir_all(&self.dir) {
            log::warn!("Cannot create cache dir {}: {}", self.dir.display(), e);
            return;
        }

        let entry = CacheEntry {
            timestamp: Self::now_ms(),
            process_name: process_name.to_string(),
            data: result.clone(),
        };

        let path = self.entry_path(fingerprint);
        match serde_json::to_vec_pretty(&entry) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    log::warn!("Cache write failed for {}: {}", path.display(), e);
                }
            }
            Err(e) => log::warn!("Cache encode failed for {}: {}", process_name, e),
        }
    }

    /// Partition a batch into hits and misses in one pass.
    pub fn get_batch(&self, fingerprints: &[Fingerprint]) -> BatchLookup {
        let mut lookup = BatchLookup::default();

        for fingerprint in fingerprints {
            match self.get(fingerprint) {
                Some(result) => {
                    lookup.hits.insert(fingerprint.clone(), result);
                }
                None => lookup.misses.push(fingerprint.clone()),
            }
        }

        lookup
    }

    /// Remove every entry older than the TTL. Idempotent; concurrent
    /// readers see a just-deleted entry as a plain miss.
    pub fn sweep_expired(&self) -> usize {
        if !self.enabled {
            return 0;
        }

        let mut removed = 0;
        for path in self.entry_files() {
            let expired = fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<CacheEntry>(&content).ok())
                .map(|entry| self.is_expired(&entry))
                // Unparseable entries can only ever produce misses; sweep them too.
                .unwrap_or(true);

            if expired && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        removed
    }

    /// Remove every entry. Returns the number removed.
    pub fn clear(&self) -> usize {
        if !self.enabled {
            return 0;
        }

        let mut removed = 0;
        for path in self.entry_files() {
            if fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            enabled: self.enabled,
            ..Default::default()
        };

        if !self.enabled {
            return stats;
        }

        for path in self.entry_files() {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let Ok(entry) = serde_json::from_str::<CacheEntry>(&content) else {
                continue;
            };

            stats.entry_count += 1;
            stats.total_bytes += content.len() as u64;
            stats.oldest_timestamp = Some(match stats.oldest_timestamp {
                Some(oldest) => oldest.min(entry.timestamp),
                None => entry.timestamp,
            });
            stats.newest_timestamp = Some(match stats.newest_timestamp {
                Some(newest) => newest.max(entry.timestamp),
                None => entry.timestamp,
            });
        }

        stats
    }

    /// Entry files currently on disk. A missing directory is an empty cache.
    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(dir) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        dir.filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect()
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::classify::{Category, ClassificationResult};
    use crate::logic::snapshot::types::ProcessRecord;

    fn record(name: &str) -> ProcessRecord {
        ProcessRecord {
            pid: 1,
            name: name.to_string(),
            cpu_percent: 0.0,
            mem_percent: 0.0,
            mem_rss_bytes: 0,
            mem_vsz_bytes: 0,
            path: String::new(),
            command: String::new(),
            parent_pid: None,
            user: String::new(),
            priority: None,
            state: String::new(),
            start_time_secs: 0,
        }
    }

    fn cache_in(dir: &Path) -> ResultCache {
        ResultCache::new(true, dir.to_path_buf(), 24)
    }

    fn sample_result() -> ClassificationResult {
        ClassificationResult::keyword(Category::Database, "postgres")
    }

    #[test]
    fn test_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());
        let fp = Fingerprint::of(&record("postgres"));
        let result = sample_result();

        cache.put(&fp, "postgres", &result);
        assert_eq!(cache.get(&fp), Some(result));
    }

    #[test]
    fn test_missing_entry_is_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());
        assert_eq!(cache.get(&Fingerprint::of(&record("ghost"))), None);
    }

    #[test]
    fn test_expired_entry_is_evicted_and_uncounted() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());
        let fp = Fingerprint::of(&record("stale"));

        // Age the entry past the TTL by writing it directly.
        let entry = CacheEntry {
            timestamp: chrono::Utc::now().timestamp_millis() - 25 * 3_600_000,
            process_name: "stale".to_string(),
            data: sample_result(),
        };
        fs::create_dir_all(tmp.path()).unwrap();
        fs::write(
            tmp.path().join(format!("{}.json", fp)),
            serde_json::to_vec(&entry).unwrap(),
        )
        .unwrap();

        assert_eq!(cache.get(&fp), None);
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_corrupt_entry_is_miss_not_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());
        let fp = Fingerprint::of(&record("broken"));

        fs::write(tmp.path().join(format!("{}.json", fp)), b"not json at all").unwrap();
        assert_eq!(cache.get(&fp), None);
    }

    #[test]
    fn test_get_batch_partitions() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());
        let hit_fp = Fingerprint::of(&record("known"));
        let miss_fp = Fingerprint::of(&record("unknown"));

        cache.put(&hit_fp, "known", &sample_result());

        let lookup = cache.get_batch(&[hit_fp.clone(), miss_fp.clone()]);
        assert!(lookup.hits.contains_key(&hit_fp));
        assert_eq!(lookup.misses, vec![miss_fp]);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());

        let fresh_fp = Fingerprint::of(&record("fresh"));
        cache.put(&fresh_fp, "fresh", &sample_result());

        let stale_fp = Fingerprint::of(&record("stale"));
        let entry = CacheEntry {
            timestamp: chrono::Utc::now().timestamp_millis() - 48 * 3_600_000,
            process_name: "stale".to_string(),
            data: sample_result(),
        };
        fs::write(
            tmp.path().join(format!("{}.json", stale_fp)),
            serde_json::to_vec(&entry).unwrap(),
        )
        .unwrap();

        assert_eq!(cache.sweep_expired(), 1);
        assert!(cache.get(&fresh_fp).is_some());
        // Second sweep finds nothing: idempotent.
        assert_eq!(cache.sweep_expired(), 0);
    }

    #[test]
    fn test_clear_and_stats() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path());

        for name in ["a", "b", "c"] {
            cache.put(&Fingerprint::of(&record(name)), name, &sample_result());
        }

        let stats = cache.stats();
        assert_eq!(stats.entry_count, 3);
        assert!(stats.total_bytes > 0);
        assert!(stats.oldest_timestamp.is_some());
        assert!(stats.oldest_timestamp <= stats.newest_timestamp);

        assert_eq!(cache.clear(), 3);
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_disabled_cache_is_inert() {
        let cache = ResultCache::disabled();
        let fp = Fingerprint::of(&record("anything"));

        cache.put(&fp, "anything", &sample_result());
        assert_eq!(cache.get(&fp), None);
        assert_eq!(cache.sweep_expired(), 0);
        assert_eq!(cache.clear(), 0);
        assert!(!cache.stats().enabled);

        let lookup = cache.get_batch(&[fp.clone()]);
        assert!(lookup.hits.is_empty());
        assert_eq!(lookup.misses, vec![fp]);
    }
}
