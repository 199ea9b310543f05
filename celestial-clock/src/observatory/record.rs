use std::fmt;

use super::normalize_name;
use crate::format::ClockFormat;
use crate::{ClockError, ClockResult};

/// One link of a clock chain: which table to read and how to treat its ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockLinkSpec {
    /// Source name passed to the clock text provider. Empty means no-op.
    pub source: String,
    pub format: ClockFormat,
    /// Site-code filter for multi-site Tempo files.
    pub site: Option<char>,
    /// Clamp to the boundary value outside the table instead of failing.
    pub valid_beyond_ends: bool,
    /// The last tabulated sample is a placeholder and must not be used.
    pub bogus_last_correction: bool,
}

impl ClockLinkSpec {
    pub fn new(source: impl Into<String>, format: ClockFormat) -> Self {
        Self {
            source: source.into().trim().to_string(),
            format,
            site: None,
            valid_beyond_ends: false,
            bogus_last_correction: false,
        }
    }

    /// A link that contributes nothing.
    pub fn noop() -> Self {
        Self::new("", ClockFormat::default())
    }

    pub fn with_site(mut self, site: char) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_valid_beyond_ends(mut self, valid: bool) -> Self {
        self.valid_beyond_ends = valid;
        self
    }

    pub fn with_bogus_last_correction(mut self, bogus: bool) -> Self {
        self.bogus_last_correction = bogus;
        self
    }

    pub fn is_noop(&self) -> bool {
        self.source.is_empty()
    }
}

impl fmt::Display for ClockLinkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return write!(f, "<no-op>");
        }
        write!(f, "{} ({})", self.source, self.format)?;
        if let Some(site) = self.site {
            write!(f, " site {}", site)?;
        }
        Ok(())
    }
}

/// Informational short codes. Neither namespace is required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteCodes {
    pub tempo: Option<String>,
    pub itoa: Option<String>,
}

impl SiteCodes {
    pub fn matches(&self, code: &str) -> bool {
        let code = code.trim();
        [&self.tempo, &self.itoa]
            .into_iter()
            .flatten()
            .any(|c| c.eq_ignore_ascii_case(code))
    }
}

/// A recognised observatory. Immutable once built.
///
/// ```
/// use celestial_clock::{ClockFormat, ClockLinkSpec, ObservatoryRecord};
///
/// let gbt = ObservatoryRecord::new("GBT", [882589.65, -4924872.32, 3943729.348])?
///     .with_aliases(["1", "GB"])
///     .with_clock_chain(vec![ClockLinkSpec::new("time_gbt.dat", ClockFormat::Tempo)]);
/// assert_eq!(gbt.canonical_id(), "gbt");
/// assert_eq!(gbt.aliases(), ["1", "gb"]);
/// # Ok::<(), celestial_clock::ClockError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ObservatoryRecord {
    canonical_id: String,
    aliases: Vec<String>,
    codes: SiteCodes,
    position: [f64; 3],
    provenance: String,
    clock_chain: Vec<ClockLinkSpec>,
    include_gps: bool,
    include_bipm: bool,
}

impl ObservatoryRecord {
    /// Creates a record with an ITRF position in meters and an empty chain.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidRecord`] for an empty identity or a non-finite
    /// position component.
    pub fn new(canonical_id: &str, position: [f64; 3]) -> ClockResult<Self> {
        let canonical_id = normalize_name(canonical_id);
        if canonical_id.is_empty() {
            return Err(ClockError::invalid_record(
                canonical_id,
                "empty canonical identity",
            ));
        }
        if position.iter().any(|c| !c.is_finite()) {
            return Err(ClockError::invalid_record(
                canonical_id,
                format!("non-finite position {:?}", position),
            ));
        }

        Ok(Self {
            canonical_id,
            aliases: Vec::new(),
            codes: SiteCodes::default(),
            position,
            provenance: String::new(),
            clock_chain: Vec::new(),
            include_gps: false,
            include_bipm: false,
        })
    }

    /// Adds aliases, case-normalised. Repeats and the record's own identity
    /// are dropped.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for alias in aliases {
            let alias = normalize_name(alias.as_ref());
            if alias.is_empty() || alias == self.canonical_id || self.aliases.contains(&alias) {
                continue;
            }
            self.aliases.push(alias);
        }
        self
    }

    pub fn with_codes(mut self, codes: SiteCodes) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    pub fn with_clock_chain(mut self, chain: Vec<ClockLinkSpec>) -> Self {
        self.clock_chain = chain;
        self
    }

    pub fn with_include_gps(mut self, include: bool) -> Self {
        self.include_gps = include;
        self
    }

    /// Whether the TT(BIPM) realisation applies to this site.
    pub fn with_include_bipm(mut self, include: bool) -> Self {
        self.include_bipm = include;
        self
    }

    pub fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn codes(&self) -> &SiteCodes {
        &self.codes
    }

    /// Geocentric ITRF position in meters.
    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    /// Free-text origin notes. Never interpreted.
    pub fn provenance(&self) -> &str {
        &self.provenance
    }

    pub fn clock_chain(&self) -> &[ClockLinkSpec] {
        &self.clock_chain
    }

    pub fn include_gps(&self) -> bool {
        self.include_gps
    }

    pub fn include_bipm(&self) -> bool {
        self.include_bipm
    }

    /// Canonical identity followed by aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
