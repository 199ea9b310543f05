//! Observer location on Earth in WGS84 geodetic coordinates.
//!
//! Sites are usually published either as geocentric ITRF Cartesian coordinates
//! or as geodetic latitude, longitude and ellipsoidal height. [`Location`]
//! holds the latter and [`Location::to_itrf_xyz`] converts it to the former.
//!
//! # Coordinate conventions
//!
//! - **Latitude**: North positive, stored in radians, range [-π/2, π/2]
//! - **Longitude**: East positive, stored in radians, range [-π, π]
//! - **Height**: Meters above the WGS84 ellipsoid (not sea level)

mod geodesy;

use crate::constants::{DEG_TO_RAD, HALF_PI, PI, RAD_TO_DEG};
use crate::errors::{AstroError, AstroResult, MathErrorKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A geographic location on Earth in WGS84 geodetic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Geodetic latitude in radians. North is positive.
    pub latitude: f64,
    /// Geodetic longitude in radians. East is positive.
    pub longitude: f64,
    /// Height above WGS84 ellipsoid in meters.
    pub height: f64,
}

impl Location {
    /// Creates a location from coordinates in radians.
    ///
    /// # Errors
    ///
    /// Returns a math error if any coordinate is non-finite or the angles are
    /// outside their valid ranges.
    pub fn new(latitude: f64, longitude: f64, height: f64) -> AstroResult<Self> {
        for (name, value) in [
            ("latitude", latitude),
            ("longitude", longitude),
            ("height", height),
        ] {
            if !value.is_finite() {
                return Err(AstroError::math_error(
                    "location_validation",
                    MathErrorKind::NotFinite,
                    &format!("{} must be finite, got {}", name, value),
                ));
            }
        }

        if latitude.abs() > HALF_PI {
            return Err(AstroError::math_error(
                "location_validation",
                MathErrorKind::OutOfRange,
                "Latitude outside valid range [-π/2, π/2]",
            ));
        }
        if longitude.abs() > PI {
            return Err(AstroError::math_error(
                "location_validation",
                MathErrorKind::OutOfRange,
                "Longitude outside valid range [-π, π]",
            ));
        }

        Ok(Self {
            latitude,
            longitude,
            height,
        })
    }

    /// Creates a location from latitude and longitude in degrees.
    ///
    /// Longitudes in (180, 360] are accepted and wrapped to the western
    /// hemisphere, since observatory lists mix both conventions.
    ///
    /// ```
    /// use celestial_core::Location;
    ///
    /// let parkes = Location::from_degrees(-32.99984, 148.26352, 414.8)?;
    /// assert!((parkes.latitude_degrees() + 32.99984).abs() < 1e-10);
    /// # Ok::<(), celestial_core::AstroError>(())
    /// ```
    pub fn from_degrees(lat_deg: f64, lon_deg: f64, height_m: f64) -> AstroResult<Self> {
        let lon_deg = if lon_deg > 180.0 && lon_deg <= 360.0 {
            lon_deg - 360.0
        } else {
            lon_deg
        };
        Self::new(lat_deg * DEG_TO_RAD, lon_deg * DEG_TO_RAD, height_m)
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude * RAD_TO_DEG
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude * RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_degrees_round_trip() {
        let loc = Location::from_degrees(38.43312, -79.83983, 824.0).unwrap();
        assert!((loc.latitude_degrees() - 38.43312).abs() < 1e-12);
        assert!((loc.longitude_degrees() + 79.83983).abs() < 1e-12);
        assert_eq!(loc.height, 824.0);
    }

    #[test]
    fn test_east_longitude_wraps() {
        let loc = Location::from_degrees(0.0, 270.0, 0.0).unwrap();
        assert!((loc.longitude_degrees() + 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_latitude() {
        let err = Location::from_degrees(91.0, 0.0, 0.0).unwrap_err();
        assert_eq!(err.math_kind(), MathErrorKind::OutOfRange);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_location_serde_round_trip() {
        let cases = [
            Location::from_degrees(38.43312, -79.83983, 824.0).unwrap(),
            Location::from_degrees(-32.99984, 148.26352, 414.8).unwrap(),
            Location::new(0.0, 0.0, 0.0).unwrap(),
        ];

        for original in cases {
            let json = serde_json::to_string(&original).unwrap();
            let deserialized: Location = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, original);
        }
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = Location::new(0.0, f64::NAN, 0.0).unwrap_err();
        assert_eq!(err.math_kind(), MathErrorKind::NotFinite);
        assert!(err.to_string().contains("longitude"));
    }
}
