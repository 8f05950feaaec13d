// 🚦 Pipeline - Raw rows in, dashboard data out
// Detect layout, extract, match plates, canonicalize, group, dedupe,
// aggregate

use crate::aggregate::{self, WindowTotal};
use crate::canonical;
use crate::columns::{ColumnMap, RecordType};
use crate::dedupe::DuplicateResolver;
use crate::error::{PipelineError, Result};
use crate::extract::{RecordExtractor, RunStats};
use crate::grouping::{self, Classification};
use crate::matcher::PlateMatcher;
use crate::record::LogEntry;
use crate::window::WindowSpec;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// DASHBOARD DATA
// ============================================================================

/// DateRange - First and last accepted record dates for the run.
/// None throughout when no record was accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub first_date: Option<String>,
    pub first_offset: Option<i64>,
    pub last_date: Option<String>,
    pub last_offset: Option<i64>,
}

/// OutputRecord - One surviving day record for one canonical plate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Raw plate as transcribed (may differ from the canonical plate)
    pub plate: String,

    pub canonical_plate: String,

    /// Display date, `YYYY-MM-DD`
    pub date: String,

    pub record_type: RecordType,
    pub make: String,
    pub model: String,
    pub color: String,
    pub location: String,
    pub offset: i64,
    pub classification: Classification,
    pub five_day_total: u32,
}

/// PlateReport - Everything the dashboard shows for one vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateReport {
    pub canonical_plate: String,

    /// One record per day, offset-sorted
    pub records: Vec<OutputRecord>,

    /// 30/60/90-day guest-parking totals, fixed key order
    pub window_totals: Vec<WindowTotal>,
}

/// DashboardData - The full run output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub date_range: DateRange,

    /// Reports keyed by canonical plate, lexicographic order
    pub records_by_plate: BTreeMap<String, PlateReport>,

    pub stats: RunStats,
}

// ============================================================================
// PROCESSING
// ============================================================================

/// Run the full resolution pipeline over normalized spreadsheet rows.
///
/// Row 0 must be a recognized log header; `source_id` is the log's
/// identifier (typically its filename). Fails with `StructureError` when
/// the input is empty or the header matches no supported layout.
pub fn process(rows: &[Vec<String>], spec: &WindowSpec, source_id: &str) -> Result<DashboardData> {
    let header = rows.first().ok_or_else(|| {
        PipelineError::Structure("input contains no rows".to_string())
    })?;
    let columns = ColumnMap::detect(header).ok_or_else(|| {
        PipelineError::Structure(
            "first row does not match any supported log header".to_string(),
        )
    })?;
    info!("log version detected: {}", columns.version.code());

    let bounds = crate::window::WindowBounds::resolve(spec)?;

    let mut extractor = RecordExtractor::new(columns, bounds, source_id);
    extractor.extract(rows)?;

    let mut entries_by_plate: BTreeMap<String, Vec<LogEntry>> = BTreeMap::new();
    for entry in extractor.entries() {
        entries_by_plate
            .entry(entry.plate.clone())
            .or_default()
            .push(entry.clone());
    }

    let plates = extractor.distinct_plates();
    info!("distinct plates accepted: {}", plates.len());

    let classes = PlateMatcher::new().find_equivalence_classes(&plates);
    let index = canonical::build_canonical_index(&classes, &entries_by_plate);

    // Totals are anchored at the resolved end offset. An unbounded run
    // keeps the sentinel end, which puts every record outside the
    // 30/60/90-day windows and zeroes the totals.
    let anchor = extractor.bounds().end;
    debug!("window totals anchored at offset {}", anchor);

    let resolver = DuplicateResolver::new();
    let mut records_by_plate = BTreeMap::new();
    for (canonical_plate, entries) in index {
        let mut sets = grouping::group_by_day(entries)?;
        let discarded = resolver.dedupe(&mut sets);
        if discarded > 0 {
            debug!("plate {}: {} duplicate entries removed", canonical_plate, discarded);
        }
        aggregate::compute_five_day_totals(&mut sets);

        let window_totals = aggregate::guest_window_totals(&sets, anchor);

        let records = sets
            .into_iter()
            .map(|set| {
                let survivor = &set.entries[0];
                OutputRecord {
                    plate: survivor.entry.plate.clone(),
                    canonical_plate: set.canonical_plate,
                    date: set.date,
                    record_type: survivor.entry.record_type,
                    make: survivor.entry.make.clone(),
                    model: survivor.entry.model.clone(),
                    color: survivor.entry.color.clone(),
                    location: survivor.entry.location.clone(),
                    offset: set.offset,
                    classification: set.classification,
                    five_day_total: set.five_day_total,
                }
            })
            .collect();

        records_by_plate.insert(
            canonical_plate.clone(),
            PlateReport {
                canonical_plate,
                records,
                window_totals,
            },
        );
    }

    Ok(DashboardData {
        date_range: DateRange {
            first_date: extractor
                .stats
                .first_accepted_offset
                .map(crate::dates::offset_to_date),
            first_offset: extractor.stats.first_accepted_offset,
            last_date: extractor
                .stats
                .last_accepted_offset
                .map(crate::dates::offset_to_date),
            last_offset: extractor.stats.last_accepted_offset,
        },
        records_by_plate,
        stats: extractor.stats.clone(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::LogVersion;

    const SOURCE_ID: &str = "ParkingLog.20190601.xlsx";

    fn header() -> Vec<String> {
        LogVersion::Csvpl16_1
            .header_row()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// CSVPL16.1 data row: five descriptive cells then guest 1-3, guest
    /// tow, street 1, street tow date cells
    fn row(plate: &str, model: &str, dates: [&str; 6]) -> Vec<String> {
        let mut cells = vec![
            "HOND".to_string(),
            model.to_string(),
            "BLK".to_string(),
            plate.to_string(),
            "V21".to_string(),
        ];
        cells.extend(dates.iter().map(|d| d.to_string()));
        cells
    }

    #[test]
    fn test_empty_input_is_structure_error() {
        let result = process(&[], &WindowSpec::default(), SOURCE_ID);
        assert!(matches!(result, Err(PipelineError::Structure(_))));
    }

    #[test]
    fn test_unrecognized_header_is_structure_error() {
        let rows = vec![vec!["A".to_string(), "B".to_string()]];
        let result = process(&rows, &WindowSpec::default(), SOURCE_ID);
        assert!(matches!(result, Err(PipelineError::Structure(_))));
    }

    #[test]
    fn test_end_to_end_single_plate() {
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "1.4.19", "", "", "", ""]),
        ];
        let data = process(&rows, &WindowSpec::default(), SOURCE_ID).unwrap();

        assert_eq!(data.records_by_plate.len(), 1);
        let report = &data.records_by_plate["7ABC123"];
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].date, "2019-01-02");
        assert_eq!(report.records[0].five_day_total, 1);
        assert_eq!(report.records[1].five_day_total, 2);
        assert!(report.records[0].classification.guest_parking);
        assert_eq!(data.stats.entries_accepted, 2);
    }

    #[test]
    fn test_fuzzy_plates_merge_into_one_report() {
        // "7ABC12B" is a transcription slip of "7ABC123"
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "", "", "", "", ""]),
            row("7ABC123", "CIVIC", ["1.4.19", "", "", "", "", ""]),
            row("7ABC12B", "CIVIC", ["1.6.19", "", "", "", "", ""]),
        ];
        let data = process(&rows, &WindowSpec::default(), SOURCE_ID).unwrap();

        assert_eq!(data.records_by_plate.len(), 1);
        let report = &data.records_by_plate["7ABC123"];
        assert_eq!(report.records.len(), 3);
        // The slip's raw plate survives on its own record
        assert_eq!(report.records[2].plate, "7ABC12B");
    }

    #[test]
    fn test_same_day_duplicate_resolved_by_typical_model() {
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "", "", "", "", ""]),
            row("7ABC123", "CIVIC", ["1.4.19", "", "", "", "", ""]),
            row("7ABC123", "CIVZC", ["1.6.19", "", "", "", "", ""]),
            row("7ABC123", "CIVIC", ["1.6.19", "", "", "", "", ""]),
        ];
        let data = process(&rows, &WindowSpec::default(), SOURCE_ID).unwrap();

        let report = &data.records_by_plate["7ABC123"];
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[2].model, "CIVIC");
    }

    #[test]
    fn test_deferred_day_count_window() {
        // Day count only: the window pins to the latest valid date found
        let spec = WindowSpec {
            start_date: None,
            end_date: None,
            days: Some(6),
        };
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "", "", "", "", ""]),
            row("7ABC123", "CIVIC", ["1.20.19", "", "", "", "", ""]),
            row("5XYZ987", "COROLLA", ["1.22.19", "", "", "", "", ""]),
        ];
        let data = process(&rows, &spec, SOURCE_ID).unwrap();

        assert_eq!(data.stats.entries_accepted, 2);
        assert_eq!(data.stats.entries_out_of_window, 1);
        assert_eq!(data.date_range.first_date.as_deref(), Some("2019-01-20"));
        assert_eq!(data.date_range.last_date.as_deref(), Some("2019-01-22"));
        assert_eq!(data.records_by_plate["7ABC123"].records.len(), 1);
    }

    #[test]
    fn test_date_range_is_record_extremes_not_window_bounds() {
        // Records sit strictly inside the explicit window; the reported
        // range follows the records, not the bounds
        let spec = WindowSpec {
            start_date: Some("2019-01-01".to_string()),
            end_date: Some("2019-02-01".to_string()),
            days: None,
        };
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "1.6.19", "", "", "", ""]),
        ];
        let data = process(&rows, &spec, SOURCE_ID).unwrap();

        assert_eq!(data.date_range.first_date.as_deref(), Some("2019-01-02"));
        assert_eq!(data.date_range.last_date.as_deref(), Some("2019-01-06"));
        assert_eq!(data.date_range.first_offset, data.stats.first_accepted_offset);
        assert_eq!(data.date_range.last_offset, data.stats.last_accepted_offset);
    }

    #[test]
    fn test_date_range_unbounded_run() {
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "", "", "", "", ""]),
        ];
        let data = process(&rows, &WindowSpec::default(), SOURCE_ID).unwrap();

        assert_eq!(data.date_range.first_date.as_deref(), Some("2019-01-02"));
        assert_eq!(data.date_range.last_date.as_deref(), Some("2019-01-02"));
    }

    #[test]
    fn test_date_range_empty_without_records() {
        let data = process(&[header()], &WindowSpec::default(), SOURCE_ID).unwrap();

        assert!(data.records_by_plate.is_empty());
        assert_eq!(data.date_range.first_date, None);
        assert_eq!(data.date_range.first_offset, None);
        assert_eq!(data.date_range.last_date, None);
        assert_eq!(data.date_range.last_offset, None);
    }

    #[test]
    fn test_unbounded_run_zeroes_window_totals() {
        // Without an end bound the sentinel end offset anchors the
        // windows, so no record can fall within 90 days of it
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "1.4.19", "1.6.19", "", "", ""]),
        ];
        let data = process(&rows, &WindowSpec::default(), SOURCE_ID).unwrap();

        let report = &data.records_by_plate["7ABC123"];
        assert!(report.window_totals.iter().all(|t| t.value == 0));
        // Five-day totals are record-relative and unaffected
        assert_eq!(report.records[2].five_day_total, 3);
    }

    #[test]
    fn test_window_totals_anchor_on_bounded_end() {
        let spec = WindowSpec {
            start_date: Some("2019-01-01".to_string()),
            end_date: Some("2019-02-01".to_string()),
            days: None,
        };
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "1.4.19", "1.6.19", "", "", ""]),
        ];
        let data = process(&rows, &spec, SOURCE_ID).unwrap();

        let totals = &data.records_by_plate["7ABC123"].window_totals;
        let value = |key: &str| {
            totals
                .iter()
                .find(|t| t.key == key)
                .map(|t| t.value)
                .unwrap()
        };
        // All three visits fall within 30 days of the window end; the
        // third caps a five-day burst
        assert_eq!(value("log1-short"), 3);
        assert_eq!(value("log1-long"), 3);
        assert_eq!(value("log5-short"), 1);
    }

    #[test]
    fn test_tow_day_keeps_both_marks() {
        let rows = vec![
            header(),
            row("7ABC123", "CIVIC", ["1.2.19", "", "", "1.2.19", "", ""]),
        ];
        let data = process(&rows, &WindowSpec::default(), SOURCE_ID).unwrap();

        let record = &data.records_by_plate["7ABC123"].records[0];
        assert!(record.classification.guest_parking);
        assert!(record.classification.tow);
        // Duplicate resolution trimmed the day to one entry
        assert_eq!(data.records_by_plate["7ABC123"].records.len(), 1);
    }

    #[test]
    fn test_reports_keyed_lexicographically() {
        let rows = vec![
            header(),
            row("ZZZ999", "CIVIC", ["1.2.19", "", "", "", "", ""]),
            row("AAA111", "COROLLA", ["1.2.19", "", "", "", "", ""]),
        ];
        let data = process(&rows, &WindowSpec::default(), SOURCE_ID).unwrap();

        let keys: Vec<&String> = data.records_by_plate.keys().collect();
        assert_eq!(keys, vec!["AAA111", "ZZZ999"]);
    }
}
