//! Observatory registry and clock-correction chains.
//!
//! Converts an observatory's local clock readings into a common reference
//! time scale. Each observatory names an ordered chain of tabulated clock
//! files; the correction at an epoch is the sum of each table's interpolated
//! value at that epoch.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`observatory`] | Records, declarative entries, name and alias resolution |
//! | [`table`] | Validated, immutable [`ClockTable`] samples |
//! | [`format`] | Tempo and Tempo2 clock-file parsers and the Tempo2 writer |
//! | [`resolver`] | Text sources, the shared table cache, [`ResolvedChain`] |
//! | [`evaluate`] | Interpolation, validity ranges, extrapolation policy |
//! | [`corrector`] | [`ClockCorrector`]: name and epoch in, correction out |
//! | [`errors`] | [`ClockError`] and the [`ClockResult`] alias |
//!
//! Epochs are MJD as `f64`; corrections are seconds.

pub mod corrector;
pub mod errors;
pub mod evaluate;
pub mod format;
pub mod observatory;
pub mod resolver;
pub mod table;

pub use corrector::ClockCorrector;
pub use errors::{ClockError, ClockResult};
pub use evaluate::{
    evaluate, CorrectionQuality, CorrectionResult, ExtrapolationPolicy, LinkCorrection,
};
pub use format::{parse_tempo, parse_tempo2, write_tempo2, ClockFormat};
pub use observatory::{
    ClockLinkEntry, ClockLinkSpec, ClockSourceEntry, GeodeticEntry, ObservatoryEntry,
    ObservatoryRecord, ObservatoryRegistry, Provenance, SiteCodes,
};
pub use resolver::{
    ChainResolver, ClockTextSource, DirectoryClockSource, InMemoryClockSource, ReferenceLinks,
    ResolvedChain, ResolvedLink, TableKey,
};
pub use table::{ClockSample, ClockTable};
