// 📥 Record Extractor - Normalized rows in, log entries + statistics out
// One entry per populated date-bearing field, gated by the window bounds

use crate::columns::ColumnMap;
use crate::dates;
use crate::error::Result;
use crate::record::LogEntry;
use crate::window::WindowBounds;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// RUN STATISTICS
// ============================================================================

/// RunStats - Everything tracked while walking the input rows.
///
/// Out-of-window entries and suspect dates are not errors; they land here
/// and are excluded from accepted output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Rows examined, header row included
    pub rows_seen: usize,

    /// Recurring header lookalikes skipped mid-sheet
    pub header_rows_skipped: usize,

    /// Rows that yielded at least one entry
    pub rows_with_entries: usize,

    /// Entries accepted inside the window bounds
    pub entries_accepted: usize,

    /// Entries whose offset fell outside the window bounds
    pub entries_out_of_window: usize,

    /// Offset extremes over everything seen, in-window or not
    pub min_offset_seen: Option<i64>,
    pub max_offset_seen: Option<i64>,

    /// First/last offset among *accepted* entries
    pub first_accepted_offset: Option<i64>,
    pub first_accepted_date: Option<String>,
    pub last_accepted_offset: Option<i64>,
    pub last_accepted_date: Option<String>,

    /// Latest offset at or below the validity ceiling.
    /// Suspect dates (past the ceiling) never land here, so a typo years
    /// in the future cannot drag a dynamically computed window with it.
    pub latest_valid_offset_found: i64,
    pub latest_valid_date_found: Option<String>,
}

impl RunStats {
    fn note_seen(&mut self, offset: i64) {
        self.min_offset_seen = Some(self.min_offset_seen.map_or(offset, |m| m.min(offset)));
        self.max_offset_seen = Some(self.max_offset_seen.map_or(offset, |m| m.max(offset)));
    }

    fn note_accepted(&mut self, entry: &LogEntry) {
        if self
            .first_accepted_offset
            .map_or(true, |first| entry.offset < first)
        {
            self.first_accepted_offset = Some(entry.offset);
            self.first_accepted_date = Some(entry.date.clone());
        }
        if self
            .last_accepted_offset
            .map_or(true, |last| entry.offset > last)
        {
            self.last_accepted_offset = Some(entry.offset);
            self.last_accepted_date = Some(entry.date.clone());
        }
        self.entries_accepted += 1;
    }
}

// ============================================================================
// RECORD EXTRACTOR
// ============================================================================

/// RecordExtractor - Walks normalized rows and collects accepted entries.
///
/// Owns the window bounds for the run: entries are filtered on ingestion,
/// and when the bounds were deferred (day count only) the accepted set is
/// re-filtered once the full pass has found the latest valid offset.
pub struct RecordExtractor {
    columns: ColumnMap,
    bounds: WindowBounds,

    /// Offsets past this are suspect (assumed transcription typos)
    validity_ceiling: i64,

    pub stats: RunStats,

    entries: Vec<LogEntry>,
    plate_index: BTreeMap<String, Vec<usize>>,
}

impl RecordExtractor {
    /// `source_id` is the log's identifier (typically its filename); a
    /// date token embedded in it sets the validity ceiling, otherwise the
    /// current processing date does.
    pub fn new(columns: ColumnMap, bounds: WindowBounds, source_id: &str) -> Self {
        let validity_ceiling = dates::latest_valid_offset_for_source(source_id);
        RecordExtractor {
            columns,
            bounds,
            validity_ceiling,
            stats: RunStats::default(),
            entries: Vec::new(),
            plate_index: BTreeMap::new(),
        }
    }

    /// Walk every row, emitting one entry per populated date column.
    /// The sheet header and recurring header lookalikes are skipped.
    pub fn extract(&mut self, rows: &[Vec<String>]) -> Result<()> {
        for (row_num, row) in rows.iter().enumerate() {
            self.stats.rows_seen += 1;

            let plate_cell = cell(row, self.columns.plate);
            if plate_cell.is_empty() {
                continue;
            }

            if crate::columns::is_header_row(row, Some(self.columns.version)) {
                self.stats.header_rows_skipped += 1;
                continue;
            }

            // Numeric plates and models come through spreadsheet export as
            // floats ("1234.0"); strip the spillover.
            let plate = normalize_numeric_cell(plate_cell);
            let model = normalize_numeric_cell(cell(row, self.columns.model));
            let make = cell(row, self.columns.make).to_string();
            let color = cell(row, self.columns.color).to_string();
            let location = cell(row, self.columns.location).to_string();

            let mut emitted = false;
            // Indexed access: `ingest` needs the extractor mutably
            for field in 0..self.columns.record_type_columns.len() {
                let (column, record_type) = self.columns.record_type_columns[field];
                let date_value = cell(row, column);
                if date_value.is_empty() {
                    continue;
                }

                let entry = LogEntry::new(
                    plate.clone(),
                    date_value.to_string(),
                    record_type,
                    make.clone(),
                    model.clone(),
                    color.clone(),
                    location.clone(),
                )?;
                emitted = true;
                self.ingest(row_num, entry);
            }
            if emitted {
                self.stats.rows_with_entries += 1;
            }
        }

        self.log_statistics();

        if self.bounds.is_deferred() {
            self.prune_to_dynamic_bounds();
            self.log_statistics();
        }

        Ok(())
    }

    /// Assess one entry against the validity ceiling and window bounds
    fn ingest(&mut self, row_num: usize, entry: LogEntry) {
        if entry.offset > self.validity_ceiling {
            warn!(
                "row {}: offset {} exceeds limit {}, date was {}",
                row_num, entry.offset, self.validity_ceiling, entry.date
            );
        } else if entry.offset > self.stats.latest_valid_offset_found {
            self.stats.latest_valid_offset_found = entry.offset;
            self.stats.latest_valid_date_found = Some(entry.date.clone());
        }

        self.stats.note_seen(entry.offset);

        if !self.bounds.contains(entry.offset) {
            self.stats.entries_out_of_window += 1;
            return;
        }

        self.stats.note_accepted(&entry);
        self.plate_index
            .entry(entry.plate.clone())
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    /// Discard accepted entries outside bounds that were only computable
    /// after the full pass (day count with no explicit dates). Recomputes
    /// the accepted-bounds statistics and rebuilds the plate index from
    /// scratch.
    fn prune_to_dynamic_bounds(&mut self) {
        info!("pruning to dynamic date bounds...");

        self.bounds.finalize(self.stats.latest_valid_offset_found);

        self.stats.first_accepted_offset = None;
        self.stats.first_accepted_date = None;
        self.stats.last_accepted_offset = None;
        self.stats.last_accepted_date = None;
        self.stats.entries_accepted = 0;
        self.plate_index.clear();

        let bounds = self.bounds.clone();
        let mut retained = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if bounds.contains(entry.offset) {
                retained.push(entry);
            } else {
                self.stats.entries_out_of_window += 1;
            }
        }
        self.entries = retained;

        for (index, entry) in self.entries.iter().enumerate() {
            self.stats.note_accepted(entry);
            self.plate_index
                .entry(entry.plate.clone())
                .or_default()
                .push(index);
        }
        // note_accepted re-counted every retained entry
        self.stats.entries_accepted = self.entries.len();

        debug!(
            "first record offset set to: {:?}",
            self.stats.first_accepted_offset
        );
        debug!(
            "last record offset set to: {:?}",
            self.stats.last_accepted_offset
        );
    }

    fn log_statistics(&self) {
        debug!("rows seen: {}", self.stats.rows_seen);
        debug!("header rows skipped: {}", self.stats.header_rows_skipped);
        debug!("rows with entries: {}", self.stats.rows_with_entries);
        debug!("earliest offset seen: {:?}", self.stats.min_offset_seen);
        debug!("latest offset seen: {:?}", self.stats.max_offset_seen);
        debug!(
            "latest valid offset found: {}",
            self.stats.latest_valid_offset_found
        );
        debug!(
            "latest valid date found: {:?}",
            self.stats.latest_valid_date_found
        );
        debug!("entries accepted: {}", self.stats.entries_accepted);
        debug!(
            "out of window entries skipped: {}",
            self.stats.entries_out_of_window
        );
    }

    /// Accepted entries, in ingestion order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Accepted entries for one raw plate
    pub fn entries_for_plate(&self, plate: &str) -> Vec<&LogEntry> {
        self.plate_index
            .get(plate)
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Distinct raw plates among accepted entries, lexicographic order
    pub fn distinct_plates(&self) -> Vec<String> {
        self.plate_index.keys().cloned().collect()
    }

    /// The run's window bounds (final once `extract` returns)
    pub fn bounds(&self) -> &WindowBounds {
        &self.bounds
    }

    pub fn validity_ceiling(&self) -> i64 {
        self.validity_ceiling
    }
}

/// Padded, trimmed cell access; short rows read as empty cells
fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or("")
}

/// Collapse float spillover on numeric cells: "1234.0" → "1234".
/// Non-numeric values pass through untouched.
fn normalize_numeric_cell(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => (f.trunc() as i64).to_string(),
        _ => value.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
