// 🗂️ Column Manager - Log version detection and column role mapping
// Maps spreadsheet columns to field roles for each supported log layout

use serde::{Deserialize, Serialize};

// ============================================================================
// RECORD TYPES & CLASSES
// ============================================================================

/// RecordType - The kind of log event, derived from the column a date
/// was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "guest_1")]
    Guest1,
    #[serde(rename = "guest_2")]
    Guest2,
    #[serde(rename = "guest_3")]
    Guest3,
    #[serde(rename = "street_1")]
    Street1,
    #[serde(rename = "warning")]
    Warning,
    #[serde(rename = "guest_tow")]
    GuestTow,
    #[serde(rename = "street_tow")]
    StreetTow,
}

impl RecordType {
    /// Short code for display and logging
    pub fn code(&self) -> &str {
        match self {
            RecordType::Guest1 => "guest_1",
            RecordType::Guest2 => "guest_2",
            RecordType::Guest3 => "guest_3",
            RecordType::Street1 => "street_1",
            RecordType::Warning => "warning",
            RecordType::GuestTow => "guest_tow",
            RecordType::StreetTow => "street_tow",
        }
    }

    /// The general category of record, used for dashboard indicators
    pub fn class(&self) -> RecordClass {
        match self {
            RecordType::Guest1 | RecordType::Guest2 | RecordType::Guest3 => {
                RecordClass::GuestParking
            }
            RecordType::Street1 => RecordClass::StreetParking,
            RecordType::Warning => RecordClass::Warning,
            RecordType::GuestTow | RecordType::StreetTow => RecordClass::Tow,
        }
    }
}

/// RecordClass - Dashboard-level grouping of record types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    GuestParking,
    StreetParking,
    Tow,
    Warning,
}

// ============================================================================
// LOG VERSIONS
// ============================================================================

/// LogVersion - Supported parking log layouts.
/// "<Year implemented>.<subversion>" naming, matching the header row the
/// transcribers were given that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogVersion {
    Csvpl16_1,
    Csvpl17_1,
}

impl LogVersion {
    pub const ALL: [LogVersion; 2] = [LogVersion::Csvpl16_1, LogVersion::Csvpl17_1];

    pub fn code(&self) -> &str {
        match self {
            LogVersion::Csvpl16_1 => "CSVPL16.1",
            LogVersion::Csvpl17_1 => "CSVPL17.1",
        }
    }

    /// The exact header row for this layout
    pub(crate) fn header_row(&self) -> &'static [&'static str] {
        match self {
            LogVersion::Csvpl16_1 => &[
                "MAKE",
                "MODEL",
                "COLOR",
                "LIC#",
                "LOCATION",
                "1ST (96 HR) OPEN PARKING",
                "2nd",
                "3rd",
                "DATE VEHICLE WAS TOWED",
                "1ST (24 HR) STREET PARKING",
                "DATE VEHICLE WAS TOWED",
            ],
            LogVersion::Csvpl17_1 => &[
                "MAKE",
                "MODEL",
                "COLOR",
                "LIC#",
                "LOCATION",
                "1ST (96 HR) OPEN PARKING",
                "2nd",
                "3rd",
                "CONFIRM WARNING TAG DATE:",
                "DATE VEHICLE WAS TOWED",
                "1ST (24 HR) STREET PARKING",
                "DATE VEHICLE WAS TOWED",
            ],
        }
    }
}

// ============================================================================
// COLUMN MAP
// ============================================================================

/// More than this many cells matching a header template marks a row as a
/// recurring header lookalike.
pub const HEADER_ROW_MATCH_THRESHOLD: usize = 2;

/// ColumnMap - Field-role to column-position mapping for one log version
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub version: LogVersion,
    pub make: usize,
    pub model: usize,
    pub color: usize,
    pub plate: usize,
    pub location: usize,

    /// The columns where a date indicates a new log record and tells us
    /// the type, in declared order
    pub record_type_columns: Vec<(usize, RecordType)>,
}

impl ColumnMap {
    /// Build the column map for a known log version
    pub fn for_version(version: LogVersion) -> Self {
        let record_type_columns = match version {
            LogVersion::Csvpl16_1 => vec![
                (5, RecordType::Guest1),
                (6, RecordType::Guest2),
                (7, RecordType::Guest3),
                (8, RecordType::GuestTow),
                (9, RecordType::Street1),
                (10, RecordType::StreetTow),
            ],
            LogVersion::Csvpl17_1 => vec![
                (5, RecordType::Guest1),
                (6, RecordType::Guest2),
                (7, RecordType::Guest3),
                (8, RecordType::Warning),
                (9, RecordType::GuestTow),
                (10, RecordType::Street1),
                (11, RecordType::StreetTow),
            ],
        };

        ColumnMap {
            version,
            make: 0,
            model: 1,
            color: 2,
            plate: 3,
            location: 4,
            record_type_columns,
        }
    }

    /// Examine a header row and build the map for the version it matches,
    /// if any
    pub fn detect(header_row: &[String]) -> Option<Self> {
        determine_version(header_row).map(Self::for_version)
    }
}

// ============================================================================
// HEADER DETECTION
// ============================================================================

/// Examine a row and determine which log version it is the header of.
/// Requires an exact cell-by-cell match.
pub fn determine_version(row: &[String]) -> Option<LogVersion> {
    for version in LogVersion::ALL {
        let template = version.header_row();
        if row.len() != template.len() {
            continue;
        }
        if row
            .iter()
            .zip(template.iter())
            .all(|(cell, expected)| cell.trim() == *expected)
        {
            return Some(version);
        }
    }
    None
}

/// Examine a row and determine if it is a recurring header lookalike.
///
/// The transcribers re-paste the header partway down the sheet, often with
/// small edits, so this is a forgiving match: more than
/// `HEADER_ROW_MATCH_THRESHOLD` cells equal to a version template counts.
pub fn is_header_row(row: &[String], version: Option<LogVersion>) -> bool {
    for candidate in LogVersion::ALL {
        if let Some(v) = version {
            if candidate != v {
                continue;
            }
        }

        let template = candidate.header_row();
        if row.len() != template.len() {
            continue;
        }

        let mut match_count = 0;
        for (cell, expected) in row.iter().zip(template.iter()) {
            if cell.trim() == *expected {
                match_count += 1;
            }
            if match_count > HEADER_ROW_MATCH_THRESHOLD {
                return true;
            }
        }
    }
    false
}

// ============================================================================
// TESTS
// ============================================================================
