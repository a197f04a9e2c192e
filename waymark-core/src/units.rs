//! Display unit conversions.
//!
//! The engine computes in SI units throughout; these helpers exist for
//! presentation only and convert in one direction.

/// Feet per metre.
pub const FEET_PER_METER: f64 = 3.28084;

/// Convert metres to kilometres.
#[must_use]
pub fn meters_to_kilometers(meters: f64) -> f64 {
    meters / 1_000.0
}

/// Convert metres to feet.
#[must_use]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}
