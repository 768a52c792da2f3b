//! Contour infra: the threading and host-audio glue around the filter core.
//!
//! Here live the parameter bridge between the control thread and the audio
//! callback, the audio-side engine owning per-channel chains, the cpal
//! duplex stream adapter, and the preset file watcher.

pub mod audio;
