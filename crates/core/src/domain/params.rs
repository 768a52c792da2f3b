//! Equalizer parameters
//!
//! `EqParams` is the snapshot of user-facing controls read by the chain
//! updater. It is owned and mutated by the parameter layer on the control
//! thread; the audio thread never sees it, only the coefficients designed
//! from it.

use crate::domain::design::DesignError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameter constraints for the equalizer
///
/// A conforming parameter layer never produces values outside these ranges;
/// `EqParams::validate` is the boundary check.
pub mod ranges {
    /// Audible band covered by every frequency control
    pub const MIN_FREQ_HZ: f32 = 20.0;
    pub const MAX_FREQ_HZ: f32 = 20_000.0;

    /// Peak band gain range
    pub const MIN_GAIN_DB: f32 = -24.0;
    pub const MAX_GAIN_DB: f32 = 24.0;

    /// Peak band quality (bandwidth) range
    pub const MIN_Q: f32 = 0.1;
    pub const MAX_Q: f32 = 10.0;
}

/// Cut-filter slope selector
///
/// Each step adds a second-order section to the cut cascade, so the filter
/// order is twice the steepness index plus two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slope {
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Butterworth filter order realized by this slope
    pub fn order(&self) -> usize {
        match self {
            Slope::Db12 => 2,
            Slope::Db24 => 4,
            Slope::Db36 => 6,
            Slope::Db48 => 8,
        }
    }

    /// Asymptotic roll-off steepness
    pub fn db_per_octave(&self) -> u32 {
        self.order() as u32 * 6
    }

    /// Selector index as presented by the parameter layer
    pub fn index(&self) -> usize {
        match self {
            Slope::Db12 => 0,
            Slope::Db24 => 1,
            Slope::Db36 => 2,
            Slope::Db48 => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Slope> {
        Self::ALL.get(index).copied()
    }
}

impl Default for Slope {
    fn default() -> Self {
        Slope::Db24
    }
}

impl fmt::Display for Slope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dB/oct", self.db_per_octave())
    }
}

/// Snapshot of every user-facing equalizer control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqParams {
    /// Low-cut (high-pass) corner frequency in Hz
    pub low_cut_freq: f32,
    pub low_cut_slope: Slope,

    /// Peak band center frequency in Hz
    pub peak_freq: f32,
    /// Peak band boost or cut in dB
    pub peak_gain_db: f32,
    /// Peak band quality factor
    pub peak_q: f32,

    /// High-cut (low-pass) corner frequency in Hz
    pub high_cut_freq: f32,
    pub high_cut_slope: Slope,
}

impl Default for EqParams {
    fn default() -> Self {
        Self {
            low_cut_freq: ranges::MIN_FREQ_HZ,
            low_cut_slope: Slope::default(),
            peak_freq: 3_000.0,
            peak_gain_db: 0.0,
            peak_q: 1.0,
            high_cut_freq: ranges::MAX_FREQ_HZ,
            high_cut_slope: Slope::default(),
        }
    }
}

impl EqParams {
    /// Check every field against its documented domain
    pub fn validate(&self) -> Result<(), DesignError> {
        let freq_ok = |f: f32| (ranges::MIN_FREQ_HZ..=ranges::MAX_FREQ_HZ).contains(&f);

        if !freq_ok(self.low_cut_freq) {
            return Err(DesignError::InvalidParameterRange(format!(
                "low-cut frequency {} Hz outside [{}, {}]",
                self.low_cut_freq,
                ranges::MIN_FREQ_HZ,
                ranges::MAX_FREQ_HZ
            )));
        }
        if !freq_ok(self.peak_freq) {
            return Err(DesignError::InvalidParameterRange(format!(
                "peak frequency {} Hz outside [{}, {}]",
                self.peak_freq,
                ranges::MIN_FREQ_HZ,
                ranges::MAX_FREQ_HZ
            )));
        }
        if !freq_ok(self.high_cut_freq) {
            return Err(DesignError::InvalidParameterRange(format!(
                "high-cut frequency {} Hz outside [{}, {}]",
                self.high_cut_freq,
                ranges::MIN_FREQ_HZ,
                ranges::MAX_FREQ_HZ
            )));
        }
        if !(ranges::MIN_GAIN_DB..=ranges::MAX_GAIN_DB).contains(&self.peak_gain_db) {
            return Err(DesignError::InvalidParameterRange(format!(
                "peak gain {} dB outside [{}, {}]",
                self.peak_gain_db,
                ranges::MIN_GAIN_DB,
                ranges::MAX_GAIN_DB
            )));
        }
        if !(ranges::MIN_Q..=ranges::MAX_Q).contains(&self.peak_q) {
            return Err(DesignError::InvalidParameterRange(format!(
                "peak Q {} outside [{}, {}]",
                self.peak_q,
                ranges::MIN_Q,
                ranges::MAX_Q
            )));
        }

        Ok(())
    }

    /// Copy with every field clamped into its valid range
    pub fn clamped(&self) -> EqParams {
        EqParams {
            low_cut_freq: self.low_cut_freq.clamp(ranges::MIN_FREQ_HZ, ranges::MAX_FREQ_HZ),
            low_cut_slope: self.low_cut_slope,
            peak_freq: self.peak_freq.clamp(ranges::MIN_FREQ_HZ, ranges::MAX_FREQ_HZ),
            peak_gain_db: self.peak_gain_db.clamp(ranges::MIN_GAIN_DB, ranges::MAX_GAIN_DB),
            peak_q: self.peak_q.clamp(ranges::MIN_Q, ranges::MAX_Q),
            high_cut_freq: self.high_cut_freq.clamp(ranges::MIN_FREQ_HZ, ranges::MAX_FREQ_HZ),
            high_cut_slope: self.high_cut_slope,
        }
    }
}
