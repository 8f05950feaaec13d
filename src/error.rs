// ⚠️ Error Taxonomy - Fatal pipeline errors
// Four categories: Structure, Format, Config, Content

use std::fmt;

// ============================================================================
// PIPELINE ERROR
// ============================================================================

/// PipelineError - All fatal error categories for one pipeline run
///
/// Every variant aborts the run with no partial output. Out-of-window
/// entries and suspect dates are NOT errors; they are tracked in run
/// statistics and excluded from accepted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No recognizable header/version in the input
    Structure(String),

    /// A date token matches neither supported representation
    Format(String),

    /// Over-constrained window bounds (start, end and days all supplied)
    Config(String),

    /// Grouping invariant violated (mixed canonical plates or offsets
    /// inside one day record set)
    Content(String),
}

impl PipelineError {
    /// Process exit code for the CLI, matching the error category
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Content(_) => 3,
            PipelineError::Format(_) => 4,
            PipelineError::Structure(_) => 5,
            PipelineError::Config(_) => 6,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Structure(msg) => write!(f, "structure error: {}", msg),
            PipelineError::Format(msg) => write!(f, "format error: {}", msg),
            PipelineError::Config(msg) => write!(f, "config error: {}", msg),
            PipelineError::Content(msg) => write!(f, "content error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Shorthand result type used throughout the library
pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================================
// TESTS
// ============================================================================
