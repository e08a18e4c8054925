//! Transit geometry from Kepler's third law.
//!
//! - `a = ((G * M * P^2) / (4π^2))^(1/3)`
//! - `b = sqrt((1 + Rp/R*)^2 - (π * a * T / (P * R*))^2)`
//!
//! Units follow the training data: `G` is expressed in solar masses and days,
//! so `a` comes out in AU for `M` in solar masses and `P` in days.
//!
//! Numerical notes:
//! - The cube root uses `powf(1/3)`, so a negative argument yields NaN rather
//!   than a negative real root. Callers decide whether NaN is acceptable.
//! - `impact_radicand` is exposed separately so callers can tell a negative
//!   radicand apart from other sources of NaN.

use std::f64::consts::PI;

/// Gravitational parameter in AU^3 / (solar mass * day^2).
pub const G: f64 = 2.959122082855911e-4;

/// Semi-major axis from stellar mass and orbital period.
pub fn semi_major_axis(stellar_mass: f64, period: f64) -> f64 {
    ((G * stellar_mass * period * period) / (4.0 * PI * PI)).powf(1.0 / 3.0)
}

/// The expression under the square root of the impact parameter.
pub fn impact_radicand(planet_radius: f64, stellar_radius: f64, a: f64, duration: f64, period: f64) -> f64 {
    let size = 1.0 + planet_radius / stellar_radius;
    let chord = PI * a * duration / (period * stellar_radius);
    size * size - chord * chord
}

/// Impact parameter proxy; NaN when the radicand is negative.
pub fn impact_parameter(planet_radius: f64, stellar_radius: f64, a: f64, duration: f64, period: f64) -> f64 {
    impact_radicand(planet_radius, stellar_radius, a, duration, period).sqrt()
}
