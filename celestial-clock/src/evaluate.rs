//! Evaluation of resolved clock chains.
//!
//! Each link is evaluated at the query epoch and the contributions are
//! summed. The epoch is not advanced between links: every table is indexed
//! by its own incoming time scale and the chain order already encodes the
//! scale-to-scale progression.
//!
//! # Per-link rules
//!
//! | Epoch position | `valid_beyond_ends = false` | `valid_beyond_ends = true` |
//! |----------------|-----------------------------|----------------------------|
//! | no-op table | 0, quality unchanged | 0, quality unchanged |
//! | inside effective bounds | linear interpolation, `exact` | linear interpolation, `exact` |
//! | after last sample, before declared validity end | last value, `exact` | last value, `exact` |
//! | outside effective bounds | [`OutOfRangeCorrection`](crate::ClockError::OutOfRangeCorrection) | nearest boundary value, `extrapolated` |
//!
//! An out-of-range failure is never degraded into a best-effort value.

use tracing::warn;

use crate::resolver::{ResolvedChain, ResolvedLink};
use crate::{ClockError, ClockResult};

/// Behaviour outside a table's effective bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrapolationPolicy {
    /// Fail with [`ClockError::OutOfRangeCorrection`].
    Reject,
    /// Hold the boundary value and mark the result extrapolated.
    Clamp,
}

impl ExtrapolationPolicy {
    pub fn from_valid_beyond_ends(valid_beyond_ends: bool) -> Self {
        if valid_beyond_ends {
            Self::Clamp
        } else {
            Self::Reject
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CorrectionQuality {
    Exact,
    Extrapolated,
    /// The chain has no links; the site needs no correction.
    NoOp,
}

/// Contribution of one link, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkCorrection {
    pub table: String,
    /// Seconds.
    pub correction: f64,
    pub quality: CorrectionQuality,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectionResult {
    /// Total correction in seconds.
    pub correction: f64,
    pub quality: CorrectionQuality,
    pub links: Vec<LinkCorrection>,
}

impl CorrectionResult {
    pub fn noop() -> Self {
        Self {
            correction: 0.0,
            quality: CorrectionQuality::NoOp,
            links: Vec::new(),
        }
    }

    pub fn is_extrapolated(&self) -> bool {
        self.quality == CorrectionQuality::Extrapolated
    }
}

/// Sums the chain's corrections at `mjd`.
///
/// ```
/// use std::sync::Arc;
/// use celestial_clock::{
///     evaluate, ClockLinkSpec, ClockTable, CorrectionQuality, ResolvedChain, ResolvedLink,
/// };
///
/// let table = ClockTable::from_pairs("t", &[(100.0, 2.0), (200.0, 4.0)])?;
/// let link = ResolvedLink::new(ClockLinkSpec::new("t", Default::default()), Arc::new(table))?;
/// let chain = ResolvedChain::new("site", vec![link]);
///
/// let result = evaluate(&chain, 150.0)?;
/// assert_eq!(result.correction, 3.0);
/// assert_eq!(result.quality, CorrectionQuality::Exact);
/// # Ok::<(), celestial_clock::ClockError>(())
/// ```
pub fn evaluate(chain: &ResolvedChain, mjd: f64) -> ClockResult<CorrectionResult> {
    if !mjd.is_finite() {
        return Err(ClockError::InvalidEpoch { epoch: mjd });
    }
    if chain.is_empty() {
        return Ok(CorrectionResult::noop());
    }

    let mut total = 0.0;
    let mut quality = CorrectionQuality::Exact;
    let mut links = Vec::with_capacity(chain.len());

    for link in chain.links() {
        let contribution = link.correction_at(mjd)?;
        if contribution.quality == CorrectionQuality::Extrapolated {
            warn!(
                observatory = chain.observatory(),
                table = %contribution.table,
                mjd,
                "clock correction extrapolated past table end"
            );
            quality = CorrectionQuality::Extrapolated;
        }
        total += contribution.correction;
        links.push(contribution);
    }

    Ok(CorrectionResult {
        correction: total,
        quality,
        links,
    })
}

impl ResolvedLink {
    /// This link's contribution at `mjd`.
    ///
    /// No-op links report [`CorrectionQuality::NoOp`]; [`evaluate`] leaves the
    /// chain quality unchanged for them.
    pub fn correction_at(&self, mjd: f64) -> ClockResult<LinkCorrection> {
        let table = self.table().name().to_string();
        let samples = self.effective_samples();
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return Ok(LinkCorrection {
                table,
                correction: 0.0,
                quality: CorrectionQuality::NoOp,
            });
        };
        let (start, end) = (first.mjd, self.effective_end().unwrap_or(last.mjd));

        let (correction, quality) = if mjd < start || mjd > end {
            match self.policy() {
                ExtrapolationPolicy::Reject => {
                    return Err(ClockError::out_of_range(&table, mjd, (start, end)));
                }
                ExtrapolationPolicy::Clamp => {
                    let boundary = if mjd < start { first } else { last };
                    (boundary.correction, CorrectionQuality::Extrapolated)
                }
            }
        } else if mjd >= last.mjd {
            (last.correction, CorrectionQuality::Exact)
        } else {
            (interpolate(samples, mjd), CorrectionQuality::Exact)
        };

        Ok(LinkCorrection {
            table,
            correction,
            quality,
        })
    }
}

/// Linear interpolation for `samples[0].mjd <= mjd < samples[last].mjd`.
fn interpolate(samples: &[crate::ClockSample], mjd: f64) -> f64 {
    let idx = samples.partition_point(|s| s.mjd <= mjd);
    let (a, b) = (&samples[idx - 1], &samples[idx]);
    if a.mjd == mjd {
        return a.correction;
    }
    let t = (mjd - a.mjd) / (b.mjd - a.mjd);
    a.correction + t * (b.correction - a.correction)
}
