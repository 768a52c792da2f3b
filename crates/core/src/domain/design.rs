//! Coefficient design for the peak and cut filters
//!
//! Pure functions from (frequency, sample rate, gain, quality, order) to
//! normalized biquad coefficients. Design happens on the control thread; the
//! audio thread only ever consumes the results. Every function here is
//! deterministic, so the visualization path reuses exactly the coefficients
//! the audio path runs.
//!
//! The peak filter follows the RBJ Audio-EQ-Cookbook peaking formula. The cut
//! filters decompose an even-order Butterworth prototype into second-order
//! sections: pole pair k of an order-N prototype sits at angle
//! theta = pi*(2k+1)/(2N) off the imaginary axis, giving the section
//! Q = 1/(2*cos(theta)). Each section is then realized as a cookbook
//! high-pass or low-pass biquad at the cutoff with that Q.

use crate::domain::filter::{BiquadCoeffs, CUT_STAGES};
use std::f64::consts::PI;
use thiserror::Error;

/// Errors raised by the coefficient designer
///
/// All of these are control-context validation failures; none can occur on
/// the audio path, which only reads already-designed coefficients.
#[derive(Debug, Error, PartialEq)]
pub enum DesignError {
    /// Cutoff or center frequency at or above the Nyquist limit
    #[error("frequency {cutoff_hz} Hz violates Nyquist for sample rate {sample_rate_hz} Hz")]
    NyquistViolation { cutoff_hz: f32, sample_rate_hz: f32 },

    /// Requested filter order is not an even order in 2..=8
    #[error("unsupported filter order {0}, expected one of 2, 4, 6, 8")]
    OrderMismatch(usize),

    /// A parameter escaped the parameter layer outside its documented domain
    #[error("parameter out of range: {0}")]
    InvalidParameterRange(String),
}

/// Which side of the spectrum a cut cascade removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Low-cut: attenuates below the cutoff
    HighPass,
    /// High-cut: attenuates above the cutoff
    LowPass,
}

/// Ordered second-order sections realizing one Butterworth cut filter
///
/// Section 0 is always valid; truncating to fewer sections yields a stable
/// lower-order cascade, which is what lets the chain apply slots
/// independently of the order the cascade was designed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutCascade {
    sections: [BiquadCoeffs; CUT_STAGES],
    len: usize,
}

impl CutCascade {
    /// The designed sections, lowest-Q first
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections[..self.len]
    }

    /// Filter order realized by the full cascade
    pub fn order(&self) -> usize {
        self.len * 2
    }
}

fn check_nyquist(freq_hz: f32, sample_rate_hz: f32) -> Result<(), DesignError> {
    if !(freq_hz > 0.0) || freq_hz >= sample_rate_hz / 2.0 {
        return Err(DesignError::NyquistViolation {
            cutoff_hz: freq_hz,
            sample_rate_hz,
        });
    }
    Ok(())
}

/// Design a peaking (bell) filter
///
/// RBJ cookbook peaking EQ: the gain is split into A and 1/A between the
/// numerator and denominator so that boost and cut are exact mirrors.
pub fn design_peak(
    freq_hz: f32,
    sample_rate_hz: f32,
    q: f32,
    gain_db: f32,
) -> Result<BiquadCoeffs, DesignError> {
    check_nyquist(freq_hz, sample_rate_hz)?;
    debug_assert!(q > 0.0, "peak Q must be positive");

    let a = 10f64.powf(gain_db as f64 / 40.0);
    let w0 = 2.0 * PI * freq_hz as f64 / sample_rate_hz as f64;
    let cos_w0 = w0.cos();
    let sin_w0 = w0.sin();
    let alpha = sin_w0 / (2.0 * q as f64);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_w0;
    let b2 = 1.0 - alpha * a;

    let a0 = 1.0 + alpha / a;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha / a;

    Ok(BiquadCoeffs {
        b0: (b0 / a0) as f32,
        b1: (b1 / a0) as f32,
        b2: (b2 / a0) as f32,
        a1: (a1 / a0) as f32,
        a2: (a2 / a0) as f32,
    })
}

/// One cookbook high-pass or low-pass section at the given Q
fn design_cut_section(kind: FilterKind, freq_hz: f64, sample_rate_hz: f64, q: f64) -> BiquadCoeffs {
    let w0 = 2.0 * PI * freq_hz / sample_rate_hz;
    let cos_w0 = w0.cos();
    let sin_w0 = w0.sin();
    let alpha = sin_w0 / (2.0 * q);

    let (b0, b1, b2) = match kind {
        FilterKind::HighPass => (
            (1.0 + cos_w0) / 2.0,
            -(1.0 + cos_w0),
            (1.0 + cos_w0) / 2.0,
        ),
        FilterKind::LowPass => (
            (1.0 - cos_w0) / 2.0,
            1.0 - cos_w0,
            (1.0 - cos_w0) / 2.0,
        ),
    };

    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha;

    BiquadCoeffs {
        b0: (b0 / a0) as f32,
        b1: (b1 / a0) as f32,
        b2: (b2 / a0) as f32,
        a1: (a1 / a0) as f32,
        a2: (a2 / a0) as f32,
    }
}

/// Design an even-order Butterworth cut filter as cascaded biquad sections
///
/// Returns `order / 2` sections ordered by ascending Q. The combined
/// magnitude at the cutoff is exactly -3 dB for every supported order.
pub fn design_butterworth_cascade(
    cutoff_hz: f32,
    sample_rate_hz: f32,
    order: usize,
    kind: FilterKind,
) -> Result<CutCascade, DesignError> {
    if order == 0 || order % 2 != 0 || order / 2 > CUT_STAGES {
        return Err(DesignError::OrderMismatch(order));
    }
    check_nyquist(cutoff_hz, sample_rate_hz)?;

    let mut sections = [BiquadCoeffs::default(); CUT_STAGES];
    let len = order / 2;

    for (k, section) in sections.iter_mut().take(len).enumerate() {
        let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
        let q = 1.0 / (2.0 * theta.cos());
        *section = design_cut_section(kind, cutoff_hz as f64, sample_rate_hz as f64, q);
    }

    Ok(CutCascade { sections, len })
}
