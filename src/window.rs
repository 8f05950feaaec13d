// 🪟 Window Resolver - The day-offset interval entries are retained in
// Start-inclusive, end-exclusive throughout

use crate::dates;
use crate::error::{PipelineError, Result};
use log::debug;
use serde::{Deserialize, Serialize};

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_START_OFFSET: i64 = 0;

/// ~180 years past the epoch; effectively unbounded
pub const DEFAULT_END_OFFSET: i64 = 1 << 16;

// ============================================================================
// WINDOW SPEC
// ============================================================================

/// WindowSpec - Caller-supplied bounds, 0-2 explicit dates plus an
/// optional day count
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Earliest date to include, `YYYY-MM-DD`
    pub start_date: Option<String>,

    /// Day *after* the last date to include, `YYYY-MM-DD`
    pub end_date: Option<String>,

    /// Maximum number of days of records to retain
    pub days: Option<i64>,
}

// ============================================================================
// WINDOW BOUNDS
// ============================================================================

/// WindowBounds - The resolved `[start, end)` offset interval.
///
/// When only a day count is supplied, resolution is deferred: the window
/// stays unbounded during ingestion and `finalize()` pins it to the latest
/// valid offset discovered by the full pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: i64,
    pub end: i64,
    days: Option<i64>,
    deferred: bool,
}

impl WindowBounds {
    /// Resolve caller bounds into an offset interval.
    ///
    /// Fails with `ConfigError` when start, end and days are all supplied
    /// (over-constrained: at most two are necessary), and with
    /// `FormatError` when an explicit bound is not a `YYYY-MM-DD` date.
    pub fn resolve(spec: &WindowSpec) -> Result<Self> {
        if spec.start_date.is_some() && spec.end_date.is_some() && spec.days.is_some() {
            return Err(PipelineError::Config(format!(
                "no more than two of start_date ({:?}), end_date ({:?}) and days ({:?}) can be defined",
                spec.start_date, spec.end_date, spec.days
            )));
        }

        let mut start = DEFAULT_START_OFFSET;
        let mut end = DEFAULT_END_OFFSET;

        if let Some(date) = &spec.start_date {
            start = dates::parse_standard_date(date)?;
        }
        if let Some(date) = &spec.end_date {
            end = dates::parse_standard_date(date)?;
        }

        let mut deferred = false;
        if let Some(days) = spec.days {
            if spec.start_date.is_some() {
                end = start + days;
            } else if spec.end_date.is_some() {
                start = end - days;
            } else {
                // Bounds depend on the latest valid offset, which is only
                // known after a full pass over the input.
                deferred = true;
            }
        }

        debug!("starting offset: {}", start);
        debug!("ending offset: {}", end);

        Ok(WindowBounds {
            start,
            end,
            days: spec.days,
            deferred,
        })
    }

    /// Whether final bounds still depend on the ingestion pass
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Whether an entry at `offset` falls inside the window.
    /// Lower bound included, upper excluded.
    pub fn contains(&self, offset: i64) -> bool {
        offset >= self.start && offset < self.end
    }

    /// True when the end bound is a real date rather than the sentinel
    pub fn has_bounded_end(&self) -> bool {
        self.end != DEFAULT_END_OFFSET
    }

    /// Pin deferred bounds to the latest valid offset found.
    ///
    /// We want `days` worth of records and the last record retained falls
    /// on the day before `end`, so `end` is one past the latest valid
    /// offset.
    pub fn finalize(&mut self, latest_valid_offset: i64) {
        debug_assert!(self.deferred);
        let days = self.days.unwrap_or(0);

        self.end = latest_valid_offset + 1;
        self.start = self.end - days;
        self.deferred = false;

        debug!("starting offset set to: {}", self.start);
        debug!("ending offset set to: {}", self.end);
    }

    /// Display date for the window start
    pub fn start_date(&self) -> String {
        dates::offset_to_date(self.start)
    }

    /// Display date for the window end (exclusive)
    pub fn end_date(&self) -> String {
        dates::offset_to_date(self.end)
    }
}

// ============================================================================
// TESTS
// ============================================================================
