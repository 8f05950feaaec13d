// 🚗 Log Records - One vehicle sighting per date-bearing field
// Immutable once constructed; canonical identity is a separate annotation

use crate::columns::RecordType;
use crate::dates;
use crate::error::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// LOG ENTRY
// ============================================================================

/// LogEntry - One instance of a vehicle being logged.
///
/// A single spreadsheet row can yield several entries, one per populated
/// date-bearing column. The day offset is computed from the raw date at
/// construction and the entry is immutable afterwards; canonical plate
/// assignment happens in a separate annotation step (see `CanonicalEntry`)
/// so already-published entries are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Raw plate string as transcribed
    pub plate: String,

    /// Original date value, kept for display
    pub date: String,

    /// Which date column produced this entry
    pub record_type: RecordType,

    pub make: String,
    pub model: String,
    pub color: String,
    pub location: String,

    /// Days since the reference epoch; pure function of `date`
    pub offset: i64,
}

impl LogEntry {
    /// Build an entry, converting the raw date to a day offset.
    /// Fails with `FormatError` when the date value matches neither
    /// supported representation.
    pub fn new(
        plate: String,
        date: String,
        record_type: RecordType,
        make: String,
        model: String,
        color: String,
        location: String,
    ) -> Result<Self> {
        let offset = dates::log_date_to_offset(&date)?;
        Ok(LogEntry {
            plate,
            date,
            record_type,
            make,
            model,
            color,
            location,
            offset,
        })
    }
}

// ============================================================================
// CANONICAL ENTRY
// ============================================================================

/// CanonicalEntry - A log entry annotated with its resolved vehicle
/// identity. Produced once by the canonical resolver; the wrapped entry
/// is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    pub canonical_plate: String,
    pub entry: LogEntry,
}

impl CanonicalEntry {
    pub fn new(canonical_plate: String, entry: LogEntry) -> Self {
        CanonicalEntry {
            canonical_plate,
            entry,
        }
    }

    pub fn offset(&self) -> i64 {
        self.entry.offset
    }
}

// ============================================================================
// TESTS
// ============================================================================
