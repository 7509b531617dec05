//! Classification - taxonomy, keyword matching, process identity
//!
//! The deterministic half of the classification engine: a fixed category
//! taxonomy, a pure keyword classifier evaluated before any inference, and
//! the fingerprint that keys the result cache.

pub mod fingerprint;
pub mod keyword;
pub mod taxonomy;
pub mod types;

pub use fingerprint::Fingerprint;
pub use taxonomy::CategoryTaxonomy;
pub use types::{Category, ClassificationResult, ClassifyMethod, ThreatLevel};
