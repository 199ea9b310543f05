/// Tempo-style clock files tabulate corrections in microseconds.
pub const MICROSECONDS_PER_SECOND_F64: f64 = 1_000_000.0;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

/// WGS84 semi-major axis in meters.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 flattening, 1/298.257223563.
pub const WGS84_FLATTENING: f64 = 0.0033528106647474805;

/// WGS84 first eccentricity squared: e² = f(2 - f).
pub const WGS84_ECCENTRICITY_SQUARED: f64 = 6.6943799901413165e-3;
