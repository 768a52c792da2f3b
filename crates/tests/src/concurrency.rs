//! Cross-thread update protocol stress tests
//!
//! A control thread redesigns coefficients while an audio thread processes
//! blocks. Every configuration the audio thread ever observes must be one of
//! the complete updates the control thread shipped, never a mixture of two.

use contour_core::domain::filter::{BiquadCoeffs, MonoChain};
use contour_core::domain::params::{EqParams, Slope};
use contour_core::domain::update::{design_update, ChainUpdate};
use contour_infra::audio::{EqBridge, EqEngine};
use contour_core::domain::audio::SampleRate;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SAMPLE_RATE: f32 = 48_000.0;

/// What the audio thread can see of a chain between two blocks
#[derive(Debug, Clone, Copy, PartialEq)]
struct Observed {
    peak: BiquadCoeffs,
    low_first: BiquadCoeffs,
    low_enabled: usize,
    high_enabled: usize,
}

fn observe(chain: &MonoChain) -> Observed {
    Observed {
        peak: *chain.peak().coefficients(),
        low_first: *chain.low_cut().stage(0).coefficients(),
        low_enabled: chain.low_cut().enabled_stages(),
        high_enabled: chain.high_cut().enabled_stages(),
    }
}

fn matches_update(observed: &Observed, update: &ChainUpdate) -> bool {
    observed.peak == update.peak
        && observed.low_enabled == update.low_cut.sections().len()
        && observed.high_enabled == update.high_cut.sections().len()
        && observed.low_first == update.low_cut.sections()[0]
}

fn is_initial_state(observed: &Observed) -> bool {
    observed.peak == BiquadCoeffs::default()
        && observed.low_enabled == 0
        && observed.high_enabled == 0
}

fn stress_params(step: usize) -> EqParams {
    let slopes = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];
    EqParams {
        low_cut_freq: 40.0 + (step % 17) as f32 * 10.0,
        low_cut_slope: slopes[step % 4],
        peak_freq: 500.0 + (step % 29) as f32 * 100.0,
        peak_gain_db: 1.0 + (step % 11) as f32,
        peak_q: 0.5 + (step % 7) as f32 * 0.5,
        high_cut_freq: 8_000.0 + (step % 13) as f32 * 500.0,
        high_cut_slope: slopes[(step + 2) % 4],
    }
}

#[test]
fn test_concurrent_updates_are_never_torn() {
    let (bridge, receiver) = EqBridge::new(SAMPLE_RATE);
    let mut engine = EqEngine::new(SampleRate::Hz48000, 2, receiver);

    let shipped: Arc<Mutex<Vec<ChainUpdate>>> = Arc::new(Mutex::new(Vec::new()));

    let control = {
        let bridge = bridge.clone();
        let shipped = Arc::clone(&shipped);
        std::thread::spawn(move || {
            for step in 0..200 {
                let params = stress_params(step);
                // Designs are deterministic, so recording the expected
                // update before the bridge ships it cannot race the audio
                // thread's observation of it.
                let expected = design_update(&params, SAMPLE_RATE).unwrap();
                shipped.lock().unwrap().push(expected);

                bridge.set_params(params).unwrap();
                bridge.tick().unwrap();
                std::thread::sleep(Duration::from_micros(500));
            }
        })
    };

    let audio = std::thread::spawn(move || {
        let mut observations = Vec::new();
        let mut buffer = vec![0.1f32; 128];
        for _ in 0..400 {
            engine.process_block(&mut buffer);
            observations.push((
                observe(engine.chain(0).unwrap()),
                observe(engine.chain(1).unwrap()),
            ));
            std::thread::sleep(Duration::from_micros(300));
        }
        observations
    });

    control.join().unwrap();
    let observations = audio.join().unwrap();
    let shipped = shipped.lock().unwrap();

    assert!(!shipped.is_empty());

    for (left, right) in &observations {
        // Both channels always carry the same logical update.
        assert_eq!(left, right);

        if is_initial_state(left) {
            continue;
        }
        assert!(
            shipped.iter().any(|update| matches_update(left, update)),
            "observed configuration matches no shipped update: {:?}",
            left
        );
    }

    // At least some updates must have reached the audio side.
    assert!(observations.iter().any(|(left, _)| !is_initial_state(left)));
}

#[test]
fn test_audio_side_converges_to_newest_update() {
    let (bridge, receiver) = EqBridge::new(SAMPLE_RATE);
    let mut engine = EqEngine::new(SampleRate::Hz48000, 2, receiver);

    let mut last = None;
    for step in 0..32 {
        bridge.set_params(stress_params(step)).unwrap();
        if let Ok(Some(update)) = bridge.tick() {
            last = Some(update);
        }
        let mut buffer = vec![0.0f32; 64];
        engine.process_block(&mut buffer);
    }

    // Drain anything still queued, then confirm the chains hold exactly the
    // newest designed configuration.
    let mut buffer = vec![0.0f32; 64];
    engine.process_block(&mut buffer);

    let last = last.unwrap();
    let observed = observe(engine.chain(0).unwrap());
    assert!(matches_update(&observed, &last));
}

#[test]
fn test_shadow_chain_tracks_audio_chains() {
    // The control side applies the returned update to its own shadow chain;
    // the audio side applies the shipped copy. Both must end up identical.
    let (bridge, receiver) = EqBridge::new(SAMPLE_RATE);
    let mut engine = EqEngine::new(SampleRate::Hz48000, 1, receiver);
    let mut shadow = MonoChain::new();

    for step in 0..8 {
        bridge.set_params(stress_params(step)).unwrap();
        if let Ok(Some(update)) = bridge.tick() {
            shadow.apply_update(&update);
        }
        let mut buffer = vec![0.0f32; 32];
        engine.process_block(&mut buffer);
    }

    assert_eq!(observe(&shadow), observe(engine.chain(0).unwrap()));
}
