// 📊 Window Aggregator - Rolling five-day and fixed 30/60/90-day totals
// Operates on one plate's deduplicated, offset-sorted day record sets

use crate::grouping::DayRecordSet;
use serde::{Deserialize, Serialize};

// ============================================================================
// WINDOWS
// ============================================================================

/// The base block length for summarizing guest-parking visits
pub const WINDOW_DAYS: i64 = 30;

/// A five-day total at or above this marks a visit burst
pub const FIVE_DAY_BURST_THRESHOLD: u32 = 3;

/// Fixed reporting windows: short/medium/long = 30/60/90 days
const WINDOW_SIZES: [(&str, i64); 3] = [
    ("short", WINDOW_DAYS),
    ("medium", WINDOW_DAYS * 2),
    ("long", WINDOW_DAYS * 3),
];

/// WindowTotal - One key/value pair for the dashboard
/// (`log1-*` = single visits, `log5-*` = five-day bursts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowTotal {
    pub key: String,
    pub value: u32,
}

// ============================================================================
// FIVE-DAY TOTALS
// ============================================================================

/// Populate `five_day_total` on every guest-parking set.
///
/// Two-pointer scan: for the set at `b`, the trailing pointer `a`
/// advances while `offset[b] - 5 >= offset[a]`, so `[a, b]` covers the
/// trailing five days. The total is the count of guest-parking sets in
/// that span; non-guest sets are skipped and keep zero.
pub fn compute_five_day_totals(sets: &mut [DayRecordSet]) {
    let mut a = 0;
    for b in 0..sets.len() {
        while sets[b].offset - 5 >= sets[a].offset {
            a += 1;
        }

        if !sets[b].classification.guest_parking {
            continue;
        }

        sets[b].five_day_total = sets[a..=b]
            .iter()
            .filter(|s| s.classification.guest_parking)
            .count() as u32;
    }
}

// ============================================================================
// WINDOW TOTALS
// ============================================================================

/// The 30/60/90-day guest-parking totals for one plate, anchored at the
/// run's resolved end offset.
///
/// Each guest set inside a window bumps that window's `log1` counter;
/// sets sitting in a five-day burst (`five_day_total >= 3`) also bump
/// `log5`. Output order is fixed: log1 short/medium/long, then log5.
pub fn guest_window_totals(sets: &[DayRecordSet], end_offset: i64) -> Vec<WindowTotal> {
    let mut single = [0u32; 3];
    let mut burst = [0u32; 3];

    for set in sets {
        if !set.classification.guest_parking {
            continue;
        }
        let days_since = end_offset - set.offset;

        for (slot, (_, window_size)) in WINDOW_SIZES.iter().enumerate() {
            if days_since <= *window_size {
                single[slot] += 1;
                if set.five_day_total >= FIVE_DAY_BURST_THRESHOLD {
                    burst[slot] += 1;
                }
            }
        }
    }

    let mut totals = Vec::with_capacity(6);
    for (slot, (label, _)) in WINDOW_SIZES.iter().enumerate() {
        totals.push(WindowTotal {
            key: format!("log1-{}", label),
            value: single[slot],
        });
    }
    for (slot, (label, _)) in WINDOW_SIZES.iter().enumerate() {
        totals.push(WindowTotal {
            key: format!("log5-{}", label),
            value: burst[slot],
        });
    }
    totals
}

// ============================================================================
// TESTS
// ============================================================================
