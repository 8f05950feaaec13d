// 🧹 Duplicate Resolver - One surviving entry per plate per day
// Attribute-frequency voting: keep the entry whose make/model/color are
// most typical for the plate's whole history

use crate::grouping::DayRecordSet;
use crate::record::CanonicalEntry;
use log::debug;
use std::collections::HashMap;

// ============================================================================
// DUPLICATE RESOLVER
// ============================================================================

/// DuplicateResolver - Scores same-day duplicates by how typical their
/// descriptive attributes are.
///
/// Re-transcription produces near-identical rows for one day: same plate,
/// same date, "CIVIC" in one and "CIVZC" in the other. Picking the entry
/// whose attributes occur most often across the plate's entire history
/// keeps the transcription that is probably right, rather than an
/// arbitrary first-seen row.
pub struct DuplicateResolver {
    /// Relative weight of the model attribute (default: 3)
    pub model_weight: f64,

    /// Relative weight of the make attribute (default: 2)
    pub make_weight: f64,

    /// Relative weight of the color attribute (default: 1)
    pub color_weight: f64,
}

/// Frequency tables across one plate's full history
struct AttributeStats {
    make: HashMap<String, usize>,
    model: HashMap<String, usize>,
    color: HashMap<String, usize>,
    total_entries: usize,
}

impl DuplicateResolver {
    /// Create a resolver with default weights (model > make > color)
    pub fn new() -> Self {
        DuplicateResolver {
            model_weight: 3.0,
            make_weight: 2.0,
            color_weight: 1.0,
        }
    }

    /// Trim every multi-entry day set down to its best-scoring entry.
    ///
    /// `sets` is one canonical plate's offset-sorted day sets; frequency
    /// tables are built over the entire history, not just colliding days.
    /// Classification flags were derived before trimming and are left
    /// alone. Returns the number of entries discarded.
    pub fn dedupe(&self, sets: &mut [DayRecordSet]) -> usize {
        let stats = Self::collect_stats(sets);
        let mut discarded = 0;

        for set in sets.iter_mut() {
            if set.entries.len() < 2 {
                continue;
            }

            let mut best_index = 0;
            let mut best_score = f64::MIN;
            for (index, entry) in set.entries.iter().enumerate() {
                let score = self.score(entry, &stats);
                // First encountered wins ties
                if score > best_score {
                    best_score = score;
                    best_index = index;
                }
            }

            debug!(
                "plate {} day {}: keeping 1 of {} duplicate entries (score {:.3})",
                set.canonical_plate,
                set.date,
                set.entries.len(),
                best_score
            );

            discarded += set.entries.len() - 1;
            let winner = set.entries.swap_remove(best_index);
            set.entries.clear();
            set.entries.push(winner);
        }

        discarded
    }

    /// Weighted sum of attribute frequencies relative to history size
    fn score(&self, entry: &CanonicalEntry, stats: &AttributeStats) -> f64 {
        let total = stats.total_entries as f64;
        let freq = |table: &HashMap<String, usize>, value: &str| {
            table.get(value).copied().unwrap_or(0) as f64
        };

        (self.make_weight * freq(&stats.make, &entry.entry.make)
            + self.model_weight * freq(&stats.model, &entry.entry.model)
            + self.color_weight * freq(&stats.color, &entry.entry.color))
            / total
    }

    fn collect_stats(sets: &[DayRecordSet]) -> AttributeStats {
        let mut stats = AttributeStats {
            make: HashMap::new(),
            model: HashMap::new(),
            color: HashMap::new(),
            total_entries: 0,
        };

        for set in sets {
            for entry in &set.entries {
                *stats.make.entry(entry.entry.make.clone()).or_default() += 1;
                *stats.model.entry(entry.entry.model.clone()).or_default() += 1;
                *stats.color.entry(entry.entry.color.clone()).or_default() += 1;
                stats.total_entries += 1;
            }
        }

        stats
    }
}

impl Default for DuplicateResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
