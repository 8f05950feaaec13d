// Parking Ledger - Core Library
// Exposes all pipeline stages for use in the CLI and tests

pub mod aggregate;
pub mod canonical;
pub mod columns;
pub mod dates;
pub mod dedupe;
pub mod error;
pub mod extract;
pub mod grouping;
pub mod matcher;
pub mod pipeline;
pub mod record;
pub mod window;

// Re-export commonly used types
pub use aggregate::{WindowTotal, FIVE_DAY_BURST_THRESHOLD, WINDOW_DAYS};
pub use canonical::{build_canonical_index, CanonicalIndex};
pub use columns::{ColumnMap, LogVersion, RecordClass, RecordType};
pub use dedupe::DuplicateResolver;
pub use error::{PipelineError, Result};
pub use extract::{RecordExtractor, RunStats};
pub use grouping::{group_by_day, Classification, DayRecordSet};
pub use matcher::PlateMatcher;
pub use pipeline::{process, DashboardData, DateRange, OutputRecord, PlateReport};
pub use record::{CanonicalEntry, LogEntry};
pub use window::{WindowBounds, WindowSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
