// 📆 Day Grouper - All entries for one canonical plate on one day
// Same plate, same day can legitimately repeat: a tow record alongside a
// guest record, or re-transcription noise

use crate::columns::RecordClass;
use crate::dates;
use crate::error::{PipelineError, Result};
use crate::record::CanonicalEntry;
use serde::{Deserialize, Serialize};

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classification - Dashboard indicator flags for one day, derived from
/// the record types present before deduplication (so a tow on a guest
/// parking day keeps both marks)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub guest_parking: bool,
    pub street_parking: bool,
    pub tow: bool,
    pub warning: bool,
}

impl Classification {
    fn mark(&mut self, class: RecordClass) {
        match class {
            RecordClass::GuestParking => self.guest_parking = true,
            RecordClass::StreetParking => self.street_parking = true,
            RecordClass::Tow => self.tow = true,
            RecordClass::Warning => self.warning = true,
        }
    }
}

// ============================================================================
// DAY RECORD SET
// ============================================================================

/// DayRecordSet - The entries for one canonical plate on one day offset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecordSet {
    pub canonical_plate: String,
    pub offset: i64,

    /// `YYYY-MM-DD` display form of the offset
    pub date: String,

    /// Ordered entries; the duplicate resolver trims this to one
    pub entries: Vec<CanonicalEntry>,

    pub classification: Classification,

    /// Guest-parking visits within the trailing five days.
    /// Populated by the aggregator once all sets for the plate exist.
    pub five_day_total: u32,
}

impl DayRecordSet {
    /// Build a set from one equal-offset run of entries.
    ///
    /// Fails with `ContentError` unless every entry shares exactly one
    /// canonical plate and one offset.
    pub fn new(entries: Vec<CanonicalEntry>) -> Result<Self> {
        let first = entries.first().ok_or_else(|| {
            PipelineError::Content("day record set requires at least one entry".to_string())
        })?;

        let canonical_plate = first.canonical_plate.clone();
        let offset = first.offset();

        for entry in &entries {
            if entry.canonical_plate != canonical_plate {
                return Err(PipelineError::Content(format!(
                    "multiple canonical plates in one day record set: {} and {}",
                    canonical_plate, entry.canonical_plate
                )));
            }
            if entry.offset() != offset {
                return Err(PipelineError::Content(format!(
                    "multiple offsets in one day record set: {} and {}",
                    offset,
                    entry.offset()
                )));
            }
        }

        let mut classification = Classification::default();
        for entry in &entries {
            classification.mark(entry.entry.record_type.class());
        }

        Ok(DayRecordSet {
            canonical_plate,
            offset,
            date: dates::offset_to_date(offset),
            entries,
            classification,
            five_day_total: 0,
        })
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// Partition one canonical plate's offset-sorted entries into maximal
/// equal-offset runs, one `DayRecordSet` per run.
pub fn group_by_day(entries: Vec<CanonicalEntry>) -> Result<Vec<DayRecordSet>> {
    let mut sets = Vec::new();
    let mut run: Vec<CanonicalEntry> = Vec::new();

    for entry in entries {
        if let Some(current) = run.first() {
            if entry.offset() != current.offset() {
                sets.push(DayRecordSet::new(std::mem::take(&mut run))?);
            }
        }
        run.push(entry);
    }
    if !run.is_empty() {
        sets.push(DayRecordSet::new(run)?);
    }

    Ok(sets)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::RecordType;
    use crate::record::{CanonicalEntry, LogEntry};

    fn entry(canonical: &str, date: &str, record_type: RecordType) -> CanonicalEntry {
        CanonicalEntry::new(
            canonical.to_string(),
            LogEntry::new(
                canonical.to_string(),
                date.to_string(),
                record_type,
                "HOND".to_string(),
                "CIVIC".to_string(),
                "BLK".to_string(),
                "V21".to_string(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_groups_are_maximal_runs() {
        let sets = group_by_day(vec![
            entry("7ABC123", "1.2.19", RecordType::Guest1),
            entry("7ABC123", "1.2.19", RecordType::GuestTow),
            entry("7ABC123", "1.4.19", RecordType::Guest2),
        ])
        .unwrap();

        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].entries.len(), 2);
        assert_eq!(sets[1].entries.len(), 1);
        assert_eq!(sets[0].date, "2019-01-02");
    }

    #[test]
    fn test_classification_from_types_present() {
        let sets = group_by_day(vec![
            entry("7ABC123", "1.2.19", RecordType::Guest1),
            entry("7ABC123", "1.2.19", RecordType::GuestTow),
        ])
        .unwrap();

        let class = sets[0].classification;
        assert!(class.guest_parking);
        assert!(class.tow);
        assert!(!class.street_parking);
        assert!(!class.warning);
    }

    #[test]
    fn test_mixed_canonical_plates_is_content_error() {
        let result = DayRecordSet::new(vec![
            entry("7ABC123", "1.2.19", RecordType::Guest1),
            entry("5XYZ987", "1.2.19", RecordType::Guest1),
        ]);
        assert!(matches!(result, Err(PipelineError::Content(_))));
    }

    #[test]
    fn test_mixed_offsets_is_content_error() {
        let result = DayRecordSet::new(vec![
            entry("7ABC123", "1.2.19", RecordType::Guest1),
            entry("7ABC123", "1.3.19", RecordType::Guest1),
        ]);
        assert!(matches!(result, Err(PipelineError::Content(_))));
    }

    #[test]
    fn test_empty_set_is_content_error() {
        assert!(matches!(
            DayRecordSet::new(Vec::new()),
            Err(PipelineError::Content(_))
        ));
    }

    #[test]
    fn test_empty_history_groups_to_nothing() {
        assert!(group_by_day(Vec::new()).unwrap().is_empty());
    }
}
