//! Shared building blocks for the celestial crates.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Angle and unit conversions, WGS84 ellipsoid parameters |
//! | [`errors`] | [`AstroError`] and the [`AstroResult`] alias |
//! | [`location`] | Geodetic [`Location`] and its conversion to ITRF Cartesian coordinates |

pub mod constants;
pub mod errors;
pub mod location;

pub use errors::{AstroError, AstroResult, MathErrorKind};
pub use location::Location;
