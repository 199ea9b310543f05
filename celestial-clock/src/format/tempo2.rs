//! Format B: Tempo2 `*.clk` clock files.
//!
//! ```text
//! # UTC(PKS) UTC(GPS)
//! # VALID_UNTIL 60400
//! 50000.0  1.2e-06
//! 50010.0  1.4e-06  0.1e-06
//! ```
//!
//! The first non-blank line is a `#` header naming the two clock scales.
//! Later `#` lines are comments, except the `VALID_UNTIL` directive which
//! extends the table's validity past its last sample. Data lines hold an MJD
//! and a correction in seconds; further columns are ignored.

use tracing::debug;

use super::{parse_number, ClockFormat};
use crate::table::{ClockTable, SampleAccumulator};
use crate::{ClockError, ClockResult};

const VALID_UNTIL_DIRECTIVE: &str = "VALID_UNTIL";
const DEFAULT_HEADER: &str = "UNKNOWN UNKNOWN";

pub fn parse_tempo2(name: &str, content: &str) -> ClockResult<ClockTable> {
    let mut acc = SampleAccumulator::new(name);
    let mut header: Option<String> = None;
    let mut comments = Vec::new();
    let mut valid_until: Option<(usize, f64)> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(comment) = trimmed.strip_prefix('#').map(str::trim) else {
            if header.is_none() {
                return Err(ClockError::malformed_entry(
                    name,
                    line_no,
                    "expected '#' header naming the clock scales",
                ));
            }
            let (mjd, correction) = parse_data_line(name, line_no, trimmed)?;
            acc.push(line_no, mjd, correction)?;
            continue;
        };

        if header.is_none() {
            header = Some(comment.to_string());
        } else if let Some(rest) = comment.strip_prefix(VALID_UNTIL_DIRECTIVE) {
            if valid_until.is_some() {
                return Err(ClockError::malformed_entry(
                    name,
                    line_no,
                    "repeated VALID_UNTIL directive",
                ));
            }
            let mjd = parse_number(name, line_no, "VALID_UNTIL MJD", rest.trim())?;
            valid_until = Some((line_no, mjd));
        } else {
            comments.push(comment.to_string());
        }
    }

    if header.is_none() {
        return Err(ClockError::malformed_entry(name, 0, "empty clock file"));
    }

    let last = acc.last_mjd();
    let samples = acc.finish();
    debug!(
        table = name,
        samples = samples.len(),
        valid_until = valid_until.map(|(_, mjd)| mjd),
        "parsed tempo2 clock file"
    );

    let table = ClockTable::from_parts(name.to_string(), Some(ClockFormat::Tempo2), samples)
        .with_header(header)
        .with_comments(comments);

    match valid_until {
        None => Ok(table),
        Some((line_no, mjd)) => match last {
            Some(last) if mjd.is_finite() && mjd >= last => table.with_valid_until(mjd),
            _ => Err(ClockError::malformed_entry(
                name,
                line_no,
                format!("VALID_UNTIL {} precedes the last sample", mjd),
            )),
        },
    }
}

fn parse_data_line(table: &str, line_no: usize, line: &str) -> ClockResult<(f64, f64)> {
    let mut fields = line.split_whitespace();
    let (Some(mjd), Some(correction)) = (fields.next(), fields.next()) else {
        return Err(ClockError::malformed_entry(
            table,
            line_no,
            "expected MJD and correction columns",
        ));
    };
    Ok((
        parse_number(table, line_no, "MJD", mjd)?,
        parse_number(table, line_no, "correction", correction)?,
    ))
}

/// Serialises `table` in Tempo2 layout.
///
/// Floats use Rust's shortest round-trip formatting, so parsing the output
/// reproduces the sample sequence exactly.
pub fn write_tempo2(table: &ClockTable) -> String {
    let header = table
        .header()
        .filter(|h| !h.is_empty())
        .unwrap_or(DEFAULT_HEADER);

    let mut out = format!("# {}\n", header);
    for comment in table.comments() {
        out.push_str(&format!("# {}\n", comment));
    }
    if let Some(mjd) = table.valid_until() {
        out.push_str(&format!("# {} {}\n", VALID_UNTIL_DIRECTIVE, mjd));
    }
    for sample in table.samples() {
        out.push_str(&format!("{} {}\n", sample.mjd, sample.correction));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPS2UTC: &str = "\
# UTC(GPS) UTC
# Derived from BIPM Circular T

50000.0  1.5e-8
50005.0  2.5e-8   3e-9
50010.0 -1.0e-8
";

    #[test]
    fn test_parse_file() {
        let table = parse_tempo2("gps2utc.clk", GPS2UTC).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.header(), Some("UTC(GPS) UTC"));
        assert_eq!(table.comments(), ["Derived from BIPM Circular T"]);
        assert_eq!(table.samples()[1].correction, 2.5e-8);
        assert_eq!(table.samples()[2].correction, -1.0e-8);
        assert_eq!(table.valid_until(), None);
    }

    #[test]
    fn test_valid_until_directive() {
        let content = "# UTC(PKS) UTC(GPS)\n# VALID_UNTIL 50100\n50000 1e-6\n50010 2e-6\n";
        let table = parse_tempo2("pks2gps.clk", content).unwrap();
        assert_eq!(table.declared_bounds(), Some((50000.0, 50010.0)));
        assert_eq!(table.valid_until(), Some(50100.0));
    }

    #[test]
    fn test_valid_until_before_last_sample() {
        let content = "# A B\n# VALID_UNTIL 50005\n50000 1e-6\n50010 2e-6\n";
        let err = parse_tempo2("x.clk", content).unwrap_err();
        assert!(matches!(err, ClockError::MalformedEntry { line: 2, .. }));
    }

    #[test]
    fn test_missing_header() {
        let err = parse_tempo2("x.clk", "50000 1e-6\n").unwrap_err();
        assert!(matches!(err, ClockError::MalformedEntry { line: 1, .. }));
        assert!(parse_tempo2("x.clk", "\n\n").is_err());
    }

    #[test]
    fn test_single_column_line() {
        let err = parse_tempo2("x.clk", "# A B\n50000\n").unwrap_err();
        assert!(matches!(err, ClockError::MalformedEntry { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_epoch() {
        let err = parse_tempo2("x.clk", "# A B\n50000 1e-6\n50000 2e-6\n").unwrap_err();
        assert!(matches!(
            err,
            ClockError::NonMonotonicTable { line: 3, .. }
        ));
    }

    #[test]
    fn test_header_only_is_noop() {
        let table = parse_tempo2("x.clk", "# A B\n").unwrap();
        assert!(table.is_noop());
    }

    #[test]
    fn test_write_then_parse_preserves_samples() {
        let content = "# TT(TAI) TT(BIPM2021)\n# VALID_UNTIL 59000.5\n\
                       50000.123456789 2.7681e-5\n50000.5 0.1\n58999 -3.3333333333333335e-7\n";
        let table = parse_tempo2("tai2tt_bipm2021.clk", content).unwrap();
        let written = write_tempo2(&table);
        let reparsed = parse_tempo2("tai2tt_bipm2021.clk", &written).unwrap();
        assert_eq!(reparsed, table);
    }

    #[test]
    fn test_write_in_memory_table() {
        let table = ClockTable::from_pairs("mem", &[(100.0, 2.0), (200.0, 4.0)]).unwrap();
        let written = write_tempo2(&table);
        assert!(written.starts_with("# UNKNOWN UNKNOWN\n"));
        let reparsed = parse_tempo2("mem", &written).unwrap();
        assert_eq!(reparsed.samples(), table.samples());
    }
}
