// 🏷️ Canonical Resolver - One representative plate per equivalence class
// The representative is the most frequently transcribed member

use crate::record::{CanonicalEntry, LogEntry};
use log::debug;
use std::collections::BTreeMap;

// ============================================================================
// CANONICAL INDEX
// ============================================================================

/// Map from canonical plate to its annotated entries, offset-sorted.
/// Built once after matching; read-only afterwards.
pub type CanonicalIndex = BTreeMap<String, Vec<CanonicalEntry>>;

/// Build the canonical plate index from equivalence classes.
///
/// For each class, the member with the highest raw entry count becomes
/// the canonical plate for every entry in the class; ties break to the
/// lexicographically smallest member so runs are reproducible. Singleton
/// classes are canonicalized to themselves.
///
/// Entry lists in the returned index are sorted by offset; entries on the
/// same day keep their ingestion order.
pub fn build_canonical_index(
    classes: &[Vec<String>],
    entries_by_plate: &BTreeMap<String, Vec<LogEntry>>,
) -> CanonicalIndex {
    let mut index = CanonicalIndex::new();

    for class in classes {
        let canonical = select_canonical_plate(class, entries_by_plate);

        let mut annotated: Vec<CanonicalEntry> = Vec::new();
        for plate in class {
            if let Some(entries) = entries_by_plate.get(plate) {
                annotated.extend(
                    entries
                        .iter()
                        .map(|e| CanonicalEntry::new(canonical.clone(), e.clone())),
                );
            }
        }
        if annotated.is_empty() {
            continue;
        }
        annotated.sort_by_key(|e| e.offset());

        if class.len() > 1 {
            debug!(
                "canonical plate {} chosen for class {:?} ({} entries)",
                canonical,
                class,
                annotated.len()
            );
        }
        index.insert(canonical, annotated);
    }

    index
}

/// The class member occurring most frequently across all entries.
/// Ties resolve to the lexicographically smallest member.
fn select_canonical_plate(
    class: &[String],
    entries_by_plate: &BTreeMap<String, Vec<LogEntry>>,
) -> String {
    let mut members: Vec<&String> = class.iter().collect();
    members.sort_unstable();

    let mut best: Option<(&String, usize)> = None;
    for plate in members {
        let count = entries_by_plate.get(plate).map_or(0, Vec::len);
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((plate, count)),
        }
    }

    best.map(|(plate, _)| plate.clone())
        .unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================
