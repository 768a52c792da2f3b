//! Preset file watcher for hot-reload
//!
//! Watches a preset file or directory and surfaces TOML modifications on a
//! crossbeam channel. The control loop polls `try_change`, reloads the
//! preset and pushes the new parameters through the bridge, which raises the
//! dirty flag like any other parameter change.

use contour_core::domain::config::{ConfigError, Result};
use crossbeam::channel::{unbounded, Receiver};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// File system watcher emitting changed preset paths
pub struct PresetWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<PathBuf>,
}

impl PresetWatcher {
    /// Watch a preset file or a directory of presets
    ///
    /// For a single file the parent directory is watched, since editors
    /// commonly replace files instead of modifying them in place.
    pub fn watch(path: &Path) -> Result<Self> {
        let watch_root = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };

        let (tx, rx) = unbounded();
        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                if let Ok(event) = res {
                    if matches!(
                        event.kind,
                        notify::EventKind::Create(_) | notify::EventKind::Modify(_)
                    ) {
                        for path in event.paths {
                            if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                                if tx.send(path).is_err() {
                                    error!("Preset watcher channel closed");
                                }
                            }
                        }
                    }
                }
            })
            .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        watcher
            .watch(watch_root, RecursiveMode::Recursive)
            .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        info!(path = %watch_root.display(), "Preset watcher started");

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Newest changed path since the last poll, if any
    pub fn try_change(&self) -> Option<PathBuf> {
        let mut latest = None;
        while let Ok(path) = self.rx.try_recv() {
            latest = Some(path);
        }
        latest
    }
}
