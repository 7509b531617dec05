//! Logic Module - Engines
//!
//! The classification and scoring engines plus their collaborators:
//! - `snapshot/` - point-in-time sensors (process table, connections, facts)
//! - `classify/` - taxonomy, keyword classifier, fingerprint
//! - `cache` - persistent classification result cache
//! - `ollama/` - inference client contract
//! - `convergence` - bounded classification loop
//! - `netrisk` - network connection risk scorer
//! - `detector`, `summary`, `report/` - findings and rendering

pub mod cache;
pub mod classify;
pub mod config;
pub mod convergence;
pub mod detector;
pub mod netrisk;
pub mod ollama;
pub mod report;
pub mod snapshot;
pub mod summary;
