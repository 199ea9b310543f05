use celestial_core::AstroError;
use thiserror::Error;

pub type ClockResult<T> = Result<T, ClockError>;

/// Failures of registry loading, table parsing, chain resolution and evaluation.
///
/// All inputs are static, so no variant is transient. Each carries the
/// observatory, table, line or epoch needed to act on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClockError {
    #[error("Duplicate observatory identity '{name}' (already registered by '{existing}')")]
    DuplicateIdentity { name: String, existing: String },

    #[error("Unknown observatory '{name}'")]
    UnknownObservatory { name: String },

    #[error("Clock source '{source_name}' required by observatory '{observatory}' not found")]
    MissingClockSource {
        observatory: String,
        source_name: String,
    },

    #[error("Malformed entry in clock table '{table}' line {line}: {message}")]
    MalformedEntry {
        table: String,
        line: usize,
        message: String,
    },

    #[error(
        "Clock table '{table}' line {line}: MJD {epoch} does not follow previous MJD {previous}"
    )]
    NonMonotonicTable {
        table: String,
        line: usize,
        epoch: f64,
        previous: f64,
    },

    #[error("MJD {epoch} outside clock table '{table}' valid range [{start}, {end}]")]
    OutOfRangeCorrection {
        table: String,
        epoch: f64,
        start: f64,
        end: f64,
    },

    #[error("Clock table '{table}' has no usable samples: {message}")]
    UnusableClockTable { table: String, message: String },

    #[error("Invalid observatory record '{observatory}': {message}")]
    InvalidRecord {
        observatory: String,
        message: String,
    },

    #[error("Unknown clock file format '{name}' (expected 'tempo' or 'tempo2')")]
    UnknownFormat { name: String },

    #[error("Invalid query epoch: MJD {epoch}")]
    InvalidEpoch { epoch: f64 },

    /// The external text provider failed for a reason other than absence.
    #[error("Clock source '{source_name}' could not be read: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("Core calculation failed: {0}")]
    Core(#[from] AstroError),
}

impl ClockError {
    pub fn duplicate_identity(name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            name: name.into(),
            existing: existing.into(),
        }
    }

    pub fn unknown_observatory(name: impl Into<String>) -> Self {
        Self::UnknownObservatory { name: name.into() }
    }

    pub fn missing_clock_source(
        observatory: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self::MissingClockSource {
            observatory: observatory.into(),
            source_name: source_name.into(),
        }
    }

    pub fn malformed_entry(table: &str, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedEntry {
            table: table.to_string(),
            line,
            message: message.into(),
        }
    }

    pub fn non_monotonic(table: &str, line: usize, epoch: f64, previous: f64) -> Self {
        Self::NonMonotonicTable {
            table: table.to_string(),
            line,
            epoch,
            previous,
        }
    }

    pub fn out_of_range(table: &str, epoch: f64, (start, end): (f64, f64)) -> Self {
        Self::OutOfRangeCorrection {
            table: table.to_string(),
            epoch,
            start,
            end,
        }
    }

    pub fn unusable_table(table: &str, message: impl Into<String>) -> Self {
        Self::UnusableClockTable {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub fn unknown_format(name: impl Into<String>) -> Self {
        Self::UnknownFormat { name: name.into() }
    }

    pub fn invalid_record(observatory: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            observatory: observatory.into(),
            message: message.into(),
        }
    }

    pub fn source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Returns `true` when the caller can succeed by changing its own input
    /// (a different site name or epoch) rather than fixing configuration.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownObservatory { .. }
                | Self::OutOfRangeCorrection { .. }
                | Self::InvalidEpoch { .. }
        )
    }
}
