//! Parameter bridge between the control thread and the audio callback
//!
//! The control side owns the parameter snapshot and a dirty flag; any
//! mutation raises the flag. A periodic `tick` consumes the flag, designs
//! one `ChainUpdate` from the latest snapshot and ships it over a bounded
//! channel. The audio side drains the channel at block boundaries and keeps
//! only the newest update, so a burst of parameter changes collapses into a
//! single coefficient swap and the audio thread never observes a partially
//! applied set.

use contour_core::domain::design::DesignError;
use contour_core::domain::params::EqParams;
use contour_core::domain::update::{design_update, ChainUpdate};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Pending updates the audio side has not drained yet. Small on purpose:
/// only the newest entry matters.
const UPDATE_QUEUE_DEPTH: usize = 4;

struct BridgeShared {
    params: Mutex<EqParams>,
    dirty: AtomicBool,
}

/// Control-thread handle: owns the snapshot, designs updates
///
/// Cloneable so that a preset watcher or UI layer can share it. Never used
/// from the audio callback.
pub struct EqBridge {
    shared: Arc<BridgeShared>,
    tx: Sender<ChainUpdate>,
    sample_rate_hz: f32,
}

/// Audio-thread handle: drains designed updates, newest wins
pub struct UpdateReceiver {
    rx: Receiver<ChainUpdate>,
}

impl EqBridge {
    /// New bridge with default parameters
    ///
    /// Starts dirty so the first `tick` installs the defaults.
    pub fn new(sample_rate_hz: f32) -> (Self, UpdateReceiver) {
        let (tx, rx) = bounded(UPDATE_QUEUE_DEPTH);
        let bridge = Self {
            shared: Arc::new(BridgeShared {
                params: Mutex::new(EqParams::default()),
                dirty: AtomicBool::new(true),
            }),
            tx,
            sample_rate_hz,
        };
        (bridge, UpdateReceiver { rx })
    }

    /// New bridge seeded with a validated snapshot
    pub fn with_params(
        params: EqParams,
        sample_rate_hz: f32,
    ) -> Result<(Self, UpdateReceiver), DesignError> {
        params.validate()?;
        let (bridge, receiver) = Self::new(sample_rate_hz);
        *lock_params(&bridge.shared) = params;
        Ok((bridge, receiver))
    }

    /// Replace the snapshot and raise the dirty flag
    pub fn set_params(&self, params: EqParams) -> Result<(), DesignError> {
        params.validate()?;
        *lock_params(&self.shared) = params;
        self.shared.dirty.store(true, Ordering::Release);
        Ok(())
    }

    /// Current snapshot
    pub fn params(&self) -> EqParams {
        *lock_params(&self.shared)
    }

    /// Raise the dirty flag without changing parameters
    ///
    /// Used after a re-prepare when the chains need the current coefficients
    /// installed again.
    pub fn mark_dirty(&self) {
        self.shared.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }

    /// Consume the dirty flag and, if set, design and ship one update
    ///
    /// Returns the designed update so the caller can apply it to a UI shadow
    /// chain. If the audio side has not drained the queue the flag is
    /// re-raised and the send retried on the next tick; intermediate
    /// snapshots are never replayed.
    pub fn tick(&self) -> Result<Option<ChainUpdate>, DesignError> {
        if !self.shared.dirty.swap(false, Ordering::AcqRel) {
            return Ok(None);
        }

        let snapshot = *lock_params(&self.shared);
        let update = design_update(&snapshot, self.sample_rate_hz)?;

        match self.tx.try_send(update) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.shared.dirty.store(true, Ordering::Release);
                trace!("update queue full, retrying next tick");
            }
            Err(TrySendError::Disconnected(_)) => {
                trace!("audio side disconnected, update kept for shadow chain only");
            }
        }

        Ok(Some(update))
    }

    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate_hz
    }
}

impl Clone for EqBridge {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            tx: self.tx.clone(),
            sample_rate_hz: self.sample_rate_hz,
        }
    }
}

impl UpdateReceiver {
    /// Drain pending updates, returning the newest
    ///
    /// Wait-free for the audio callback: only `try_recv` on a bounded
    /// channel, no allocation.
    #[inline]
    pub fn latest(&self) -> Option<ChainUpdate> {
        let mut latest = None;
        while let Ok(update) = self.rx.try_recv() {
            latest = Some(update);
        }
        latest
    }
}

fn lock_params(shared: &BridgeShared) -> std::sync::MutexGuard<'_, EqParams> {
    match shared.params.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
