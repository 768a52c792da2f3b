//! Audio-side equalizer engine
//!
//! Owns one `MonoChain` per channel and applies pending coefficient updates
//! at block boundaries. `process_block` is the only entry point invoked from
//! the real-time callback and performs no allocation, locking or logging.

use crate::audio::bridge::UpdateReceiver;
use contour_core::domain::audio::SampleRate;
use contour_core::domain::filter::MonoChain;
use tracing::info;

/// Per-channel filter chains plus the update drain
pub struct EqEngine {
    chains: Vec<MonoChain>,
    updates: UpdateReceiver,
    sample_rate: SampleRate,
}

impl EqEngine {
    pub fn new(sample_rate: SampleRate, channels: usize, updates: UpdateReceiver) -> Self {
        info!(
            sample_rate = sample_rate.hz(),
            channels, "Creating equalizer engine"
        );
        Self {
            chains: vec![MonoChain::new(); channels],
            updates,
            sample_rate,
        }
    }

    /// Re-prepare for a new session
    ///
    /// Rebuilds every chain with cleared delay state. The control side must
    /// mark its bridge dirty afterwards so fresh coefficients arrive before
    /// the next block.
    pub fn prepare(&mut self, sample_rate: SampleRate, channels: usize) {
        info!(
            sample_rate = sample_rate.hz(),
            channels, "Re-preparing equalizer engine"
        );
        self.sample_rate = sample_rate;
        self.chains = vec![MonoChain::new(); channels];
    }

    pub fn channels(&self) -> usize {
        self.chains.len()
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Chain for one channel, for inspection from the control side
    pub fn chain(&self, channel: usize) -> Option<&MonoChain> {
        self.chains.get(channel)
    }

    /// Process one interleaved block in-place
    ///
    /// Applies the newest pending update to every chain first, so
    /// coefficients and bypass flags always change together between blocks,
    /// never inside one.
    pub fn process_block(&mut self, interleaved: &mut [f32]) {
        if let Some(update) = self.updates.latest() {
            for chain in &mut self.chains {
                chain.apply_update(&update);
            }
        }

        let channels = self.chains.len();
        if channels == 0 {
            return;
        }

        for frame in interleaved.chunks_mut(channels) {
            for (chain, sample) in self.chains.iter_mut().zip(frame.iter_mut()) {
                *sample = chain.process_sample(*sample);
            }
        }
    }
}
