//! Random draws used by the step engine.
//!
//! Everything takes the generator explicitly; there is no ambient stream.

use rand::Rng;
use std::f64::consts::PI;

/// Standard normal via the Box–Muller transform (cosine branch).
pub fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random();
    let u2: f64 = rng.random();
    let u1 = if u1 > 0.0 { u1 } else { 1e-30 };
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// `+1.0` or `-1.0` with equal probability.
pub fn random_sign<R: Rng>(rng: &mut R) -> f64 {
    if rng.random_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

/// Uniform draw from the open interval `(0, upper)`.
pub fn uniform_open<R: Rng>(rng: &mut R, upper: f64) -> f64 {
    loop {
        let u: f64 = rng.random();
        if u > 0.0 {
            return u * upper;
        }
    }
}
