//! Contour core: the DSP domain of a 3-band real-time parametric equalizer.
//!
//! Everything in this crate is platform-agnostic and free of audio-backend
//! concerns. The `infra` crate wires these types to real audio devices and
//! to the control thread.

pub mod domain;

pub use domain::*;
