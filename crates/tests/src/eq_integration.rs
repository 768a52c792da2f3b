//! End-to-end scenarios for the full equalizer pipeline
//!
//! These tests exercise design, application and response sampling together,
//! checking the numbers a user would read off the response display.

use contour_core::domain::design::{design_butterworth_cascade, design_peak, FilterKind};
use contour_core::domain::filter::MonoChain;
use contour_core::domain::params::{EqParams, Slope};
use contour_core::domain::response::{
    chain_magnitude_db, response_frequencies, sample_response_db,
};
use contour_core::domain::update::update_chains;

const SAMPLE_RATE: f32 = 48_000.0;

fn generate_sine_wave(frequency: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| 2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate)
        .map(|phase| phase.sin())
        .collect()
}

#[test]
fn test_peak_response_six_db_at_one_kilohertz() {
    // Only the peak stage active: +6 dB at 1 kHz, Q 1.0.
    let mut chain = MonoChain::new();
    let peak = design_peak(1_000.0, SAMPLE_RATE, 1.0, 6.0).unwrap();
    chain.peak_mut().set_coefficients(peak);

    let points = 1001;
    let freqs = response_frequencies(points);
    let response = sample_response_db(&chain, SAMPLE_RATE as f64, points);

    let center = freqs
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - 1_000.0).abs().partial_cmp(&(*b - 1_000.0).abs()).unwrap()
        })
        .map(|(i, _)| i)
        .unwrap();

    assert!(
        (response[center] - 6.0).abs() < 0.1,
        "{} dB at 1 kHz",
        response[center]
    );
    // The peak's influence decays towards the band edges.
    assert!(response[0].abs() < 0.2, "{} dB at 20 Hz", response[0]);
    assert!(
        response[points - 1].abs() < 0.2,
        "{} dB at 20 kHz",
        response[points - 1]
    );
}

#[test]
fn test_low_cut_order_four_rolloff() {
    // Low cut at 100 Hz with the 24 dB/oct slope (order 4).
    let mut chain = MonoChain::new();
    let cascade = design_butterworth_cascade(100.0, SAMPLE_RATE, 4, FilterKind::HighPass).unwrap();
    chain.low_cut_mut().configure(&cascade);

    let at_cutoff = chain_magnitude_db(&chain, 100.0, SAMPLE_RATE as f64);
    let one_octave_down = chain_magnitude_db(&chain, 50.0, SAMPLE_RATE as f64);
    let two_octaves_down = chain_magnitude_db(&chain, 25.0, SAMPLE_RATE as f64);

    assert!((at_cutoff + 3.0).abs() < 0.3, "{} dB at 100 Hz", at_cutoff);
    // 24 dB/oct: one octave below lands on -24 dB, two octaves on -48 dB.
    assert!(
        (one_octave_down + 24.0).abs() < 0.5,
        "{} dB at 50 Hz",
        one_octave_down
    );
    assert!(
        (two_octaves_down + 48.2).abs() < 1.0,
        "{} dB at 25 Hz",
        two_octaves_down
    );
}

#[test]
fn test_full_chain_band_shape() {
    let params = EqParams {
        low_cut_freq: 100.0,
        low_cut_slope: Slope::Db24,
        peak_freq: 1_000.0,
        peak_gain_db: 6.0,
        peak_q: 1.0,
        high_cut_freq: 10_000.0,
        high_cut_slope: Slope::Db24,
    };

    let mut chain = MonoChain::new();
    update_chains(&params, SAMPLE_RATE, [&mut chain]).unwrap();

    assert_eq!(chain.low_cut().enabled_stages(), 2);
    assert_eq!(chain.high_cut().enabled_stages(), 2);

    // The mid band carries the peak boost, both edges are cut away.
    let mid = chain_magnitude_db(&chain, 1_000.0, SAMPLE_RATE as f64);
    let low_edge = chain_magnitude_db(&chain, 30.0, SAMPLE_RATE as f64);
    let high_edge = chain_magnitude_db(&chain, 18_000.0, SAMPLE_RATE as f64);

    assert!((mid - 6.0).abs() < 0.3, "{} dB at 1 kHz", mid);
    assert!(low_edge < -20.0, "{} dB at 30 Hz", low_edge);
    assert!(high_edge < -18.0, "{} dB at 18 kHz", high_edge);
}

#[test]
fn test_processed_sine_matches_sampled_response() {
    // The audio path and the visualization path must agree: a steady-state
    // sine through the chain gains exactly what the response sampler
    // reports at that frequency.
    let params = EqParams {
        peak_freq: 1_000.0,
        peak_gain_db: 6.0,
        peak_q: 1.0,
        ..EqParams::default()
    };

    let mut chain = MonoChain::new();
    update_chains(&params, SAMPLE_RATE, [&mut chain]).unwrap();

    let num_samples = SAMPLE_RATE as usize;
    let input = generate_sine_wave(1_000.0, SAMPLE_RATE, num_samples);

    let mut peak_amplitude = 0.0f32;
    for (i, &x) in input.iter().enumerate() {
        let y = chain.process_sample(x);
        if i > num_samples / 2 {
            peak_amplitude = peak_amplitude.max(y.abs());
        }
    }

    let measured_db = 20.0 * (peak_amplitude as f64).log10();
    let predicted_db = chain_magnitude_db(&chain, 1_000.0, SAMPLE_RATE as f64);

    assert!(
        (measured_db - predicted_db).abs() < 0.05,
        "measured {} dB, response sampler says {} dB",
        measured_db,
        predicted_db
    );
    assert!((measured_db - 6.0).abs() < 0.1, "{} dB through audio path", measured_db);
}

#[test]
fn test_slope_changes_preserve_audio_continuity() {
    // Drive two identical chains, toggle one through a slope change and
    // back between blocks. The stale slots keep their frozen state, so both
    // chains produce identical output once the configuration matches again.
    let full = design_butterworth_cascade(200.0, SAMPLE_RATE, 8, FilterKind::HighPass).unwrap();
    let narrow = design_butterworth_cascade(200.0, SAMPLE_RATE, 2, FilterKind::HighPass).unwrap();

    let mut toggled = MonoChain::new();
    let mut reference = MonoChain::new();
    toggled.low_cut_mut().configure(&full);
    reference.low_cut_mut().configure(&full);

    let input = generate_sine_wave(440.0, SAMPLE_RATE, 96);

    for &x in &input[..32] {
        assert_eq!(
            toggled.process_sample(x).to_bits(),
            reference.process_sample(x).to_bits()
        );
    }

    // Drop to order 2 and immediately back to order 8 without processing in
    // between: slots 1..3 were bypassed and re-enabled with unchanged state.
    toggled.low_cut_mut().configure(&narrow);
    toggled.low_cut_mut().configure(&full);

    for &x in &input[32..] {
        assert_eq!(
            toggled.process_sample(x).to_bits(),
            reference.process_sample(x).to_bits()
        );
    }
}

#[test]
fn test_response_extremes_with_default_params() {
    // Default snapshot: cuts parked at the band edges, peak at unity. The
    // cut filters still shave 3 dB at their own corner frequencies.
    let mut chain = MonoChain::new();
    update_chains(&EqParams::default(), SAMPLE_RATE, [&mut chain]).unwrap();

    let at_low_corner = chain_magnitude_db(&chain, 20.0, SAMPLE_RATE as f64);
    let mid = chain_magnitude_db(&chain, 1_000.0, SAMPLE_RATE as f64);

    assert!((at_low_corner + 3.0).abs() < 0.3, "{} dB at 20 Hz", at_low_corner);
    assert!(mid.abs() < 0.1, "{} dB at 1 kHz", mid);
}
