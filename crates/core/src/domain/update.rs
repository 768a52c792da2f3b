//! Parameter snapshot to filter chain application
//!
//! `design_update` runs the coefficient designer exactly once per snapshot;
//! the resulting `ChainUpdate` is a plain value that can be applied to any
//! number of chains (left, right, the UI shadow chain) and shipped across
//! threads as one indivisible unit. Applying it is cheap and branch-light;
//! designing it is not, and must stay off the audio thread.

use crate::domain::design::{
    design_butterworth_cascade, design_peak, CutCascade, DesignError, FilterKind,
};
use crate::domain::filter::{BiquadCoeffs, MonoChain};
use crate::domain::params::EqParams;
use tracing::trace;

/// One complete, self-consistent set of designed coefficients
///
/// Carries everything a chain needs for one logical update: peak
/// coefficients plus both cut cascades with their orders. A chain that
/// applies it ends up with coefficients and bypass flags from the same
/// parameter snapshot, never a mix of two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainUpdate {
    pub peak: BiquadCoeffs,
    pub low_cut: CutCascade,
    pub high_cut: CutCascade,
}

/// Design all coefficients for one parameter snapshot
///
/// Validates the snapshot, then runs the designer once for the peak filter
/// and once per cut cascade.
pub fn design_update(params: &EqParams, sample_rate_hz: f32) -> Result<ChainUpdate, DesignError> {
    params.validate()?;

    let peak = design_peak(
        params.peak_freq,
        sample_rate_hz,
        params.peak_q,
        params.peak_gain_db,
    )?;
    let low_cut = design_butterworth_cascade(
        params.low_cut_freq,
        sample_rate_hz,
        params.low_cut_slope.order(),
        FilterKind::HighPass,
    )?;
    let high_cut = design_butterworth_cascade(
        params.high_cut_freq,
        sample_rate_hz,
        params.high_cut_slope.order(),
        FilterKind::LowPass,
    )?;

    trace!(
        low_cut_hz = params.low_cut_freq,
        low_cut_order = low_cut.order(),
        peak_hz = params.peak_freq,
        peak_gain_db = params.peak_gain_db,
        high_cut_hz = params.high_cut_freq,
        high_cut_order = high_cut.order(),
        "designed chain update"
    );

    Ok(ChainUpdate {
        peak,
        low_cut,
        high_cut,
    })
}

impl MonoChain {
    /// Install a designed update into this chain
    ///
    /// Configures both cut cascades (coefficients and bypass flags together)
    /// and swaps the peak coefficients. Delay state is untouched, so audio
    /// continues without a discontinuity.
    pub fn apply_update(&mut self, update: &ChainUpdate) {
        self.low_cut_mut().configure(&update.low_cut);
        self.peak_mut().set_coefficients(update.peak);
        self.high_cut_mut().configure(&update.high_cut);
    }
}

/// Design once and apply to every given chain
pub fn update_chains<'a>(
    params: &EqParams,
    sample_rate_hz: f32,
    chains: impl IntoIterator<Item = &'a mut MonoChain>,
) -> Result<ChainUpdate, DesignError> {
    let update = design_update(params, sample_rate_hz)?;
    for chain in chains {
        chain.apply_update(&update);
    }
    Ok(update)
}
