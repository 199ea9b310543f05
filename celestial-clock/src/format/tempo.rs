//! Format A: Tempo `time_*.dat` columnar clock files.
//!
//! ```text
//!    MJD       EECO-REF    NIST-REF NS      DATE    COMMENTS
//! =========    ========    ======== ==    ========  ========
//!  50000.00       0.000       1.234 3
//! ```
//!
//! | Columns | Field |
//! |---------|-------|
//! | `[0, 9)` | MJD |
//! | `[9, 21)` | first clock offset, µs (blank reads as zero) |
//! | `[21, 33)` | second clock offset, µs |
//! | `34` | one-character site code |
//!
//! The correction is `second - first`. Lines starting with `#` are comments,
//! lines starting with `MJD` or `=` are column headers. The format has no way
//! to declare validity beyond the last sample.

use celestial_core::constants::MICROSECONDS_PER_SECOND_F64;
use tracing::debug;

use super::{parse_number, ClockFormat};
use crate::table::{ClockTable, SampleAccumulator};
use crate::{ClockError, ClockResult};

const MJD_COLUMNS: (usize, usize) = (0, 9);
const FIRST_OFFSET_COLUMNS: (usize, usize) = (9, 21);
const SECOND_OFFSET_COLUMNS: (usize, usize) = (21, 33);
const SITE_COLUMN: usize = 34;

pub fn parse_tempo(name: &str, content: &str, site: Option<char>) -> ClockResult<ClockTable> {
    let mut acc = SampleAccumulator::new(name);
    let mut comments = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            comments.push(comment.trim().to_string());
            continue;
        }
        if is_header_line(trimmed) {
            continue;
        }
        if let Some(code) = site {
            if !site_matches(line, code) {
                continue;
            }
        }

        let (mjd, correction) = parse_tempo_line(name, line_no, line)?;
        acc.push(line_no, mjd, correction)?;
    }

    let samples = acc.finish();
    debug!(
        table = name,
        samples = samples.len(),
        ?site,
        "parsed tempo clock file"
    );
    Ok(ClockTable::from_parts(name.to_string(), Some(ClockFormat::Tempo), samples)
        .with_comments(comments))
}

/// Parses one data line into `(mjd, correction_seconds)`.
pub fn parse_tempo_line(table: &str, line_no: usize, line: &str) -> ClockResult<(f64, f64)> {
    let mjd_field = column(table, line_no, line, MJD_COLUMNS)?;
    if mjd_field.is_empty() {
        return Err(ClockError::malformed_entry(table, line_no, "missing MJD"));
    }
    let mjd = parse_number(table, line_no, "MJD", mjd_field)?;

    let first_field = column(table, line_no, line, FIRST_OFFSET_COLUMNS)?;
    let first = if first_field.is_empty() {
        0.0
    } else {
        parse_number(table, line_no, "clock offset", first_field)?
    };

    let second_field = column(table, line_no, line, SECOND_OFFSET_COLUMNS)?;
    if second_field.is_empty() {
        return Err(ClockError::malformed_entry(
            table,
            line_no,
            "missing clock offset",
        ));
    }
    let second = parse_number(table, line_no, "clock offset", second_field)?;

    Ok((mjd, (second - first) / MICROSECONDS_PER_SECOND_F64))
}

fn is_header_line(trimmed: &str) -> bool {
    trimmed.starts_with("MJD") || trimmed.starts_with('=')
}

fn site_matches(line: &str, code: char) -> bool {
    line.as_bytes()
        .get(SITE_COLUMN)
        .is_some_and(|&b| (b as char).eq_ignore_ascii_case(&code))
}

/// Byte-column slice clamped to the line length, trimmed.
fn column<'a>(
    table: &str,
    line_no: usize,
    line: &'a str,
    (start, end): (usize, usize),
) -> ClockResult<&'a str> {
    let start = start.min(line.len());
    let end = end.min(line.len());
    line.get(start..end)
        .map(str::trim)
        .ok_or_else(|| ClockError::malformed_entry(table, line_no, "non-ASCII column data"))
}
