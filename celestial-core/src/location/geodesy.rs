//! Geodetic to geocentric conversion on the WGS84 ellipsoid.
//!
//! The prime-vertical radius of curvature at geodetic latitude φ is
//!
//! ```text
//! N = a / sqrt(1 - e² sin²φ)
//! ```
//!
//! and the Earth-fixed Cartesian position follows as
//!
//! ```text
//! x = (N + h) cos φ cos λ
//! y = (N + h) cos φ sin λ
//! z = (N (1 - e²) + h) sin φ
//! ```

use crate::constants::{WGS84_ECCENTRICITY_SQUARED, WGS84_SEMI_MAJOR_AXIS};
use crate::errors::{AstroError, AstroResult, MathErrorKind};

use super::Location;

impl Location {
    /// Cylindrical geocentric components `(u, v)` in meters.
    ///
    /// `u` is the distance from the rotation axis, `v` the distance from the
    /// equatorial plane (positive north).
    pub fn to_geocentric_meters(&self) -> AstroResult<(f64, f64)> {
        let (sin_lat, cos_lat) = self.latitude.sin_cos();

        let denominator = 1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat;
        if denominator <= f64::EPSILON {
            return Err(AstroError::math_error(
                "geocentric_conversion",
                MathErrorKind::DivisionByZero,
                "degenerate prime-vertical radius",
            ));
        }

        let n = WGS84_SEMI_MAJOR_AXIS / denominator.sqrt();
        let u = (n + self.height) * cos_lat;
        let v = (n * (1.0 - WGS84_ECCENTRICITY_SQUARED) + self.height) * sin_lat;

        Ok((u, v))
    }

    /// Earth-fixed (ITRF) Cartesian position `[x, y, z]` in meters.
    ///
    /// ```
    /// use celestial_core::Location;
    ///
    /// let origin = Location::from_degrees(0.0, 0.0, 0.0)?;
    /// let [x, y, z] = origin.to_itrf_xyz()?;
    /// assert!((x - 6_378_137.0).abs() < 1e-6);
    /// assert!(y.abs() < 1e-9 && z.abs() < 1e-9);
    /// # Ok::<(), celestial_core::AstroError>(())
    /// ```
    pub fn to_itrf_xyz(&self) -> AstroResult<[f64; 3]> {
        let (u, v) = self.to_geocentric_meters()?;
        let (sin_lon, cos_lon) = self.longitude.sin_cos();
        Ok([u * cos_lon, u * sin_lon, v])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WGS84_FLATTENING;

    #[test]
    fn test_equator_prime_meridian() {
        let loc = Location::from_degrees(0.0, 0.0, 0.0).unwrap();
        let [x, y, z] = loc.to_itrf_xyz().unwrap();
        assert!((x - WGS84_SEMI_MAJOR_AXIS).abs() < 1e-6);
        assert!(y.abs() < 1e-9);
        assert!(z.abs() < 1e-9);
    }

    #[test]
    fn test_equator_ninety_east() {
        let loc = Location::from_degrees(0.0, 90.0, 0.0).unwrap();
        let [x, y, _] = loc.to_itrf_xyz().unwrap();
        assert!(x.abs() < 1e-6);
        assert!((y - WGS84_SEMI_MAJOR_AXIS).abs() < 1e-6);
    }

    #[test]
    fn test_north_pole_is_polar_radius() {
        let loc = Location::from_degrees(90.0, 0.0, 0.0).unwrap();
        let (u, v) = loc.to_geocentric_meters().unwrap();
        let polar_radius = WGS84_SEMI_MAJOR_AXIS * (1.0 - WGS84_FLATTENING);
        assert!(u.abs() < 1e-6, "u = {}", u);
        assert!((v - polar_radius).abs() < 1e-6, "v = {}", v);
    }

    #[test]
    fn test_height_adds_along_normal() {
        let low = Location::from_degrees(0.0, 0.0, 0.0).unwrap();
        let high = Location::from_degrees(0.0, 0.0, 1000.0).unwrap();
        let (u1, _) = low.to_geocentric_meters().unwrap();
        let (u2, _) = high.to_geocentric_meters().unwrap();
        assert!((u2 - u1 - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_known_site_radius() {
        // Green Bank: geocentric radius should sit between polar and equatorial radii.
        let gbt = Location::from_degrees(38.43312, -79.83983, 824.0).unwrap();
        let [x, y, z] = gbt.to_itrf_xyz().unwrap();
        let r = (x * x + y * y + z * z).sqrt();
        assert!(r > 6_357_000.0 && r < 6_380_000.0, "r = {}", r);
        assert!(x > 0.0 && y < 0.0 && z > 0.0);
    }

    #[test]
    fn test_southern_hemisphere() {
        let loc = Location::from_degrees(-45.0, 0.0, 0.0).unwrap();
        let (u, v) = loc.to_geocentric_meters().unwrap();
        assert!(u > 0.0);
        assert!(v < 0.0);
    }
}
