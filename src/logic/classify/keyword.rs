//! Keyword Classifier
//!
//! Pure first-match-wins classification of a process against the taxonomy.
//! No I/O, no state: identical input yields identical output on every call,
//! which the cache keying and the convergence engine both rely on.

use crate::logic::snapshot::types::ProcessRecord;

use super::taxonomy::CategoryTaxonomy;
use super::types::Category;

/// Classify a process by keyword signature.
///
/// The haystack is the lower-cased concatenation of name, command line and
/// executable path. Categories are scanned in their declared order; the
/// first category containing a substring match wins. Ties are impossible
/// because the evaluation order is fixed.
pub fn classify(process: &ProcessRecord, taxonomy: &CategoryTaxonomy) -> Option<Category> {
    classify_with_keyword(process, taxonomy).map(|(category, _)| category)
}

/// Like [`classify`], but also reports which keyword matched.
pub fn classify_with_keyword<'t>(
    process: &ProcessRecord,
    taxonomy: &'t CategoryTaxonomy,
) -> Option<(Category, &'t str)> {
    let haystack = signature_text(process);

    for (category, keywords) in taxonomy.entries() {
        if let Some(keyword) = keywords.iter().find(|k| haystack.contains(k.as_str())) {
            return Some((category, keyword.as_str()));
        }
    }

    None
}

/// The textual signature the classifier scans.
pub fn signature_text(process: &ProcessRecord) -> String {
    format!("{} {} {}", process.name, process.command, process.path).to_lowercase()
}

// ============================================================================
// TESTS
// ============================================================================
