//! Analytic frequency-response sampling for visualization
//!
//! The magnitude curve is computed from the same coefficient values the
//! audio path runs, by evaluating each stage's transfer function on the unit
//! circle. No samples are simulated and the chain is never mutated, so a
//! shadow chain owned by the UI side can be sampled freely.

use crate::domain::filter::{BiquadCoeffs, MonoChain};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Lower bound of the visualized frequency axis
pub const RESPONSE_MIN_HZ: f64 = 20.0;
/// Upper bound of the visualized frequency axis
pub const RESPONSE_MAX_HZ: f64 = 20_000.0;

/// Magnitude of one biquad's transfer function at a frequency
///
/// Evaluates H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2) at
/// z = e^(j 2 pi f / fs).
pub fn magnitude_for_frequency(coeffs: &BiquadCoeffs, freq_hz: f64, sample_rate_hz: f64) -> f64 {
    let w = 2.0 * PI * freq_hz / sample_rate_hz;
    let z1 = Complex64::from_polar(1.0, -w);
    let z2 = z1 * z1;

    let num = Complex64::new(coeffs.b0 as f64, 0.0)
        + coeffs.b1 as f64 * z1
        + coeffs.b2 as f64 * z2;
    let den = Complex64::new(1.0, 0.0) + coeffs.a1 as f64 * z1 + coeffs.a2 as f64 * z2;

    (num / den).norm()
}

/// Combined chain magnitude in dB at one frequency
///
/// The product of the magnitudes of every non-bypassed stage, in the chain's
/// processing order.
pub fn chain_magnitude_db(chain: &MonoChain, freq_hz: f64, sample_rate_hz: f64) -> f64 {
    let mut mag = 1.0f64;

    for stage in chain.low_cut().iter() {
        if !stage.is_bypassed() {
            mag *= magnitude_for_frequency(stage.coefficients(), freq_hz, sample_rate_hz);
        }
    }
    if !chain.peak().is_bypassed() {
        mag *= magnitude_for_frequency(chain.peak().coefficients(), freq_hz, sample_rate_hz);
    }
    for stage in chain.high_cut().iter() {
        if !stage.is_bypassed() {
            mag *= magnitude_for_frequency(stage.coefficients(), freq_hz, sample_rate_hz);
        }
    }

    20.0 * mag.log10()
}

/// Logarithmically spaced frequency axis from 20 Hz to 20 kHz
pub fn response_frequencies(num_points: usize) -> Vec<f64> {
    match num_points {
        0 => Vec::new(),
        1 => vec![RESPONSE_MIN_HZ],
        n => (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                RESPONSE_MIN_HZ * (RESPONSE_MAX_HZ / RESPONSE_MIN_HZ).powf(t)
            })
            .collect(),
    }
}

/// Sample the chain's magnitude response across the audible band
///
/// Returns `num_points` values in dB on the axis of
/// [`response_frequencies`]. Read-only with respect to the chain.
pub fn sample_response_db(chain: &MonoChain, sample_rate_hz: f64, num_points: usize) -> Vec<f64> {
    response_frequencies(num_points)
        .into_iter()
        .map(|freq| chain_magnitude_db(chain, freq, sample_rate_hz))
        .collect()
}
