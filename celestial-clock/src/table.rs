//! Immutable tabulated clock corrections.
//!
//! A [`ClockTable`] is an ordered run of `(MJD, correction)` samples with
//! strictly increasing epochs. Corrections are always stored in seconds,
//! whatever unit the source file used. A table without samples is the no-op
//! table: it contributes zero at every epoch and is never out of range.

use crate::format::ClockFormat;
use crate::{ClockError, ClockResult};

/// One tabulated correction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockSample {
    /// Epoch as MJD in the table's incoming time scale.
    pub mjd: f64,
    /// Correction in seconds.
    pub correction: f64,
}

impl ClockSample {
    pub fn new(mjd: f64, correction: f64) -> Self {
        Self { mjd, correction }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockTable {
    name: String,
    format: Option<ClockFormat>,
    samples: Vec<ClockSample>,
    valid_until: Option<f64>,
    header: Option<String>,
    comments: Vec<String>,
}

impl ClockTable {
    /// Builds a table from in-memory samples.
    ///
    /// # Errors
    ///
    /// [`ClockError::MalformedEntry`] for a non-finite value and
    /// [`ClockError::NonMonotonicTable`] for repeated or decreasing epochs.
    /// Line numbers in these errors are 1-based sample positions.
    pub fn new(name: impl Into<String>, samples: Vec<ClockSample>) -> ClockResult<Self> {
        let name = name.into();
        let mut acc = SampleAccumulator::new(&name);
        for (idx, sample) in samples.into_iter().enumerate() {
            acc.push(idx + 1, sample.mjd, sample.correction)?;
        }
        let samples = acc.finish();
        Ok(Self::from_parts(name, None, samples))
    }

    /// Convenience constructor from `(mjd, seconds)` pairs.
    pub fn from_pairs(name: impl Into<String>, pairs: &[(f64, f64)]) -> ClockResult<Self> {
        let samples = pairs
            .iter()
            .map(|&(mjd, correction)| ClockSample::new(mjd, correction))
            .collect();
        Self::new(name, samples)
    }

    /// The canonical no-op table.
    pub fn noop() -> Self {
        Self::from_parts(String::new(), None, Vec::new())
    }

    pub(crate) fn from_parts(
        name: String,
        format: Option<ClockFormat>,
        samples: Vec<ClockSample>,
    ) -> Self {
        Self {
            name,
            format,
            samples,
            valid_until: None,
            header: None,
            comments: Vec::new(),
        }
    }

    /// Declares the table valid up to `mjd`, beyond its last sample.
    ///
    /// # Errors
    ///
    /// [`ClockError::MalformedEntry`] when `mjd` is not finite or precedes the
    /// last sample.
    pub fn with_valid_until(mut self, mjd: f64) -> ClockResult<Self> {
        let last = self.samples.last().map(|s| s.mjd);
        match last {
            Some(last) if mjd.is_finite() && mjd >= last => {
                self.valid_until = Some(mjd);
                Ok(self)
            }
            _ => Err(ClockError::malformed_entry(
                &self.name,
                0,
                format!(
                    "validity end MJD {} precedes the last sample or the table is empty",
                    mjd
                ),
            )),
        }
    }

    pub(crate) fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    pub(crate) fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parser that produced this table, `None` for in-memory tables.
    pub fn format(&self) -> Option<ClockFormat> {
        self.format
    }

    pub fn samples(&self) -> &[ClockSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.samples.is_empty()
    }

    /// First and last sample epochs as parsed.
    pub fn declared_bounds(&self) -> Option<(f64, f64)> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some((first.mjd, last.mjd)),
            _ => None,
        }
    }

    /// Format-declared end of validity, if any.
    pub fn valid_until(&self) -> Option<f64> {
        self.valid_until
    }

    /// Header line naming the clock scales (Format B only).
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}

/// Collects samples while enforcing finiteness and strictly increasing epochs.
pub(crate) struct SampleAccumulator<'a> {
    table: &'a str,
    samples: Vec<ClockSample>,
}

impl<'a> SampleAccumulator<'a> {
    pub(crate) fn new(table: &'a str) -> Self {
        Self {
            table,
            samples: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, line: usize, mjd: f64, correction: f64) -> ClockResult<()> {
        if !mjd.is_finite() || !correction.is_finite() {
            return Err(ClockError::malformed_entry(
                self.table,
                line,
                format!("non-finite value (MJD {}, correction {})", mjd, correction),
            ));
        }
        if let Some(previous) = self.samples.last() {
            if mjd <= previous.mjd {
                return Err(ClockError::non_monotonic(
                    self.table,
                    line,
                    mjd,
                    previous.mjd,
                ));
            }
        }
        self.samples.push(ClockSample::new(mjd, correction));
        Ok(())
    }

    pub(crate) fn last_mjd(&self) -> Option<f64> {
        self.samples.last().map(|s| s.mjd)
    }

    pub(crate) fn finish(self) -> Vec<ClockSample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_bounds() {
        let table = ClockTable::from_pairs("t", &[(100.0, 2.0), (200.0, 4.0)]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.declared_bounds(), Some((100.0, 200.0)));
        assert!(!table.is_noop());
        assert_eq!(table.format(), None);
    }

    #[test]
    fn test_new_takes_owned_name() {
        let name = String::from("tai2tt.clk");
        let table = ClockTable::new(
            name,
            vec![ClockSample::new(50000.0, 1e-6), ClockSample::new(50010.0, 2e-6)],
        )
        .unwrap();
        assert_eq!(table.name(), "tai2tt.clk");
        assert_eq!(table.samples()[1], ClockSample::new(50010.0, 2e-6));
    }

    #[test]
    fn test_duplicate_epoch_rejected() {
        let err = ClockTable::from_pairs("t", &[(100.0, 2.0), (100.0, 3.0)]).unwrap_err();
        assert_eq!(err, ClockError::non_monotonic("t", 2, 100.0, 100.0));
    }

    #[test]
    fn test_decreasing_epoch_rejected() {
        let err =
            ClockTable::from_pairs("t", &[(100.0, 2.0), (300.0, 3.0), (200.0, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            ClockError::NonMonotonicTable { line: 3, .. }
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = ClockTable::from_pairs("t", &[(100.0, f64::NAN)]).unwrap_err();
        assert!(matches!(err, ClockError::MalformedEntry { line: 1, .. }));
    }

    #[test]
    fn test_noop_table() {
        let table = ClockTable::noop();
        assert!(table.is_noop());
        assert_eq!(table.declared_bounds(), None);
        assert_eq!(table.name(), "");
    }

    #[test]
    fn test_valid_until() {
        let table = ClockTable::from_pairs("t", &[(100.0, 2.0), (200.0, 4.0)])
            .unwrap()
            .with_valid_until(250.0)
            .unwrap();
        assert_eq!(table.valid_until(), Some(250.0));
        assert_eq!(table.declared_bounds(), Some((100.0, 200.0)));

        let early = ClockTable::from_pairs("t", &[(100.0, 2.0), (200.0, 4.0)])
            .unwrap()
            .with_valid_until(150.0);
        assert!(early.is_err());
        assert!(ClockTable::noop().with_valid_until(10.0).is_err());
    }
}
