//! Clock-file parsers.
//!
//! | Format | Module | Layout | Units | Validity marker |
//! |--------|--------|--------|-------|-----------------|
//! | [`ClockFormat::Tempo`] | [`tempo`] | fixed columns, optional site code | microseconds | no |
//! | [`ClockFormat::Tempo2`] | [`tempo2`] | `#` header, whitespace columns | seconds | `# VALID_UNTIL <mjd>` |
//!
//! The format is fixed per table. A chain may mix formats because every link
//! pins its own parser.

pub mod tempo;
pub mod tempo2;

use std::fmt;
use std::str::FromStr;

use crate::table::ClockTable;
use crate::{ClockError, ClockResult};

pub use tempo::parse_tempo;
pub use tempo2::{parse_tempo2, write_tempo2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClockFormat {
    /// Legacy columnar `time_*.dat` files.
    #[default]
    Tempo,
    /// Tagged `*.clk` files.
    Tempo2,
}

impl ClockFormat {
    /// Parses `content` into a table named `name`.
    ///
    /// `site` filters multi-site Tempo files by their one-character site code
    /// and is ignored by Tempo2.
    pub fn parse(self, name: &str, content: &str, site: Option<char>) -> ClockResult<ClockTable> {
        match self {
            ClockFormat::Tempo => parse_tempo(name, content, site),
            ClockFormat::Tempo2 => parse_tempo2(name, content),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClockFormat::Tempo => "tempo",
            ClockFormat::Tempo2 => "tempo2",
        }
    }
}

impl fmt::Display for ClockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockFormat {
    type Err = ClockError;

    fn from_str(s: &str) -> ClockResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tempo" => Ok(ClockFormat::Tempo),
            "tempo2" => Ok(ClockFormat::Tempo2),
            _ => Err(ClockError::unknown_format(s.trim())),
        }
    }
}

/// Parses a trimmed numeric field, naming it in the error.
pub(crate) fn parse_number(table: &str, line: usize, what: &str, field: &str) -> ClockResult<f64> {
    field.parse::<f64>().map_err(|_| {
        ClockError::malformed_entry(table, line, format!("invalid {} '{}'", what, field))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("tempo".parse::<ClockFormat>().unwrap(), ClockFormat::Tempo);
        assert_eq!(" TEMPO2 ".parse::<ClockFormat>().unwrap(), ClockFormat::Tempo2);
        assert_eq!(
            "fits".parse::<ClockFormat>().unwrap_err(),
            ClockError::unknown_format("fits")
        );
    }

    #[test]
    fn test_display_round_trip() {
        for format in [ClockFormat::Tempo, ClockFormat::Tempo2] {
            assert_eq!(format.to_string().parse::<ClockFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_dispatch() {
        let tempo = ClockFormat::Tempo
            .parse("time_x.dat", " 50000.00       0.000       1.000 x\n", None)
            .unwrap();
        assert_eq!(tempo.format(), Some(ClockFormat::Tempo));

        let tempo2 = ClockFormat::Tempo2
            .parse("x.clk", "# UTC(X) UTC\n50000 1e-6\n", Some('x'))
            .unwrap();
        assert_eq!(tempo2.format(), Some(ClockFormat::Tempo2));
        assert_eq!(tempo.samples()[0].correction, tempo2.samples()[0].correction);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ClockFormat::Tempo2).unwrap();
        assert_eq!(json, "\"tempo2\"");
        let back: ClockFormat = serde_json::from_str("\"tempo\"").unwrap();
        assert_eq!(back, ClockFormat::Tempo);
    }
}
