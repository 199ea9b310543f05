//! Declarative observatory descriptions as they arrive from configuration.
//!
//! Site lists are hand-maintained and shape-varying: the clock source may be
//! a bare string, a list of strings, or a list mixing strings with flagged
//! entries; provenance may be one string or a list of lines. Each shape is a
//! closed enum here so nothing downstream has to sniff shapes.
//!
//! With the `serde` feature these types deserialize from e.g. JSON:
//!
//! ```text
//! "gbt": {
//!   "aliases": ["gb"], "tempo_code": "1", "itoa_code": "GB",
//!   "itrf_xyz": [882589.289, -4924872.368, 3943729.418],
//!   "clock_file": [{"name": "time_gbt.dat", "bogus_last_correction": true}],
//!   "include_gps": true,
//!   "origin": ["The Robert C. Byrd Green Bank Telescope."]
//! }
//! ```

use celestial_core::Location;

use super::record::{ClockLinkSpec, ObservatoryRecord, SiteCodes};
use crate::format::ClockFormat;
use crate::{ClockError, ClockResult};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObservatoryEntry {
    pub aliases: Vec<String>,
    pub tempo_code: Option<String>,
    pub itoa_code: Option<String>,
    /// Geocentric ITRF position in meters. Exclusive with `location`.
    pub itrf_xyz: Option<[f64; 3]>,
    /// Geodetic position. Exclusive with `itrf_xyz`.
    pub location: Option<GeodeticEntry>,
    pub origin: Option<Provenance>,
    pub clock_file: Option<ClockSourceEntry>,
    /// Parser for links that do not pin their own.
    pub clock_format: ClockFormat,
    pub include_gps: bool,
    pub include_bipm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticEntry {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub height_m: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Provenance {
    Text(String),
    Lines(Vec<String>),
}

impl Provenance {
    pub fn into_text(self) -> String {
        match self {
            Provenance::Text(text) => text,
            Provenance::Lines(lines) => lines.join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ClockSourceEntry {
    /// One table; an empty name means the site needs no correction.
    Single(String),
    Chain(Vec<ClockLinkEntry>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ClockLinkEntry {
    Bare(String),
    Flagged {
        name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        valid_beyond_ends: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        bogus_last_correction: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        format: Option<ClockFormat>,
        #[cfg_attr(feature = "serde", serde(default))]
        site: Option<char>,
    },
}

impl ClockLinkEntry {
    pub fn into_link(self, default_format: ClockFormat) -> ClockLinkSpec {
        match self {
            ClockLinkEntry::Bare(name) => ClockLinkSpec::new(name, default_format),
            ClockLinkEntry::Flagged {
                name,
                valid_beyond_ends,
                bogus_last_correction,
                format,
                site,
            } => {
                let mut link = ClockLinkSpec::new(name, format.unwrap_or(default_format))
                    .with_valid_beyond_ends(valid_beyond_ends)
                    .with_bogus_last_correction(bogus_last_correction);
                link.site = site;
                link
            }
        }
    }
}

impl ClockSourceEntry {
    pub fn into_links(self, default_format: ClockFormat) -> Vec<ClockLinkSpec> {
        match self {
            ClockSourceEntry::Single(name) if name.trim().is_empty() => Vec::new(),
            ClockSourceEntry::Single(name) => vec![ClockLinkSpec::new(name, default_format)],
            ClockSourceEntry::Chain(entries) => entries
                .into_iter()
                .map(|entry| entry.into_link(default_format))
                .collect(),
        }
    }
}

impl ObservatoryEntry {
    /// Builds the immutable record for `canonical_id`.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidRecord`] when the position is missing, given
    /// twice, or not a valid geodetic location.
    pub fn into_record(self, canonical_id: &str) -> ClockResult<ObservatoryRecord> {
        let position = match (self.itrf_xyz, self.location) {
            (Some(xyz), None) => xyz,
            (None, Some(geo)) => {
                Location::from_degrees(geo.latitude_deg, geo.longitude_deg, geo.height_m)
                    .and_then(|loc| loc.to_itrf_xyz())
                    .map_err(|e| ClockError::invalid_record(canonical_id, e.to_string()))?
            }
            (Some(_), Some(_)) => {
                return Err(ClockError::invalid_record(
                    canonical_id,
                    "both itrf_xyz and location given",
                ))
            }
            (None, None) => {
                return Err(ClockError::invalid_record(
                    canonical_id,
                    "no position (itrf_xyz or location) given",
                ))
            }
        };

        let chain = self
            .clock_file
            .map(|source| source.into_links(self.clock_format))
            .unwrap_or_default();

        Ok(ObservatoryRecord::new(canonical_id, position)?
            .with_aliases(self.aliases)
            .with_codes(SiteCodes {
                tempo: self.tempo_code,
                itoa: self.itoa_code,
            })
            .with_provenance(self.origin.map(Provenance::into_text).unwrap_or_default())
            .with_clock_chain(chain)
            .with_include_gps(self.include_gps)
            .with_include_bipm(self.include_bipm))
    }
}
