//! Audio-side infrastructure: parameter bridge, engine, cpal streams,
//! preset watching

pub mod bridge;
pub mod engine;
pub mod stream;
pub mod watcher;

pub use bridge::{EqBridge, UpdateReceiver};
pub use engine::EqEngine;
pub use stream::EqStream;
pub use watcher::PresetWatcher;
