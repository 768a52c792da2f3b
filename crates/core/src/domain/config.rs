//! Configuration and preset management
//!
//! Presets are TOML files carrying the app settings and one `EqParams`
//! snapshot. Loading happens on the control thread; nothing here is touched
//! by audio processing.

use crate::domain::params::EqParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Audio buffer size in frames
    pub buffer_size: u32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Input device name (None = use default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_device: Option<String>,

    /// Output device name (None = use default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            buffer_size: 512,
            sample_rate: 48_000,
            input_device: None,
            output_device: None,
        }
    }
}

/// Complete equalizer configuration: settings plus one parameter snapshot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EqConfig {
    pub app: AppSettings,
    pub eq: EqParams,
}

impl EqConfig {
    /// Load configuration from a TOML file
    #[instrument(skip(path))]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to a TOML file
    #[instrument(skip(self, path))]
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving configuration");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;

        debug!("Configuration saved successfully");
        Ok(())
    }

    /// Check that the parameter snapshot lies within its documented ranges
    pub fn validate(&self) -> Result<()> {
        if self.app.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample rate must be positive".to_string()));
        }
        self.eq
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Preset manager over a directory of TOML files
pub struct PresetManager {
    preset_dir: PathBuf,
}

impl PresetManager {
    pub fn new(preset_dir: PathBuf) -> Self {
        Self { preset_dir }
    }

    /// List all available presets, sorted by name
    #[instrument(skip(self))]
    pub fn list_presets(&self) -> Result<Vec<String>> {
        let mut presets = Vec::new();

        for entry in fs::read_dir(&self.preset_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "toml").unwrap_or(false) {
                if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                    presets.push(name.to_string());
                }
            }
        }

        presets.sort();
        debug!(count = presets.len(), "Listed presets");
        Ok(presets)
    }

    /// Load a preset by name
    #[instrument(skip(self))]
    pub fn load_preset(&self, name: &str) -> Result<EqConfig> {
        let path = self.preset_path(name);

        if !path.exists() {
            return Err(ConfigError::PresetNotFound(name.to_string()));
        }

        EqConfig::load_from_file(&path)
    }

    /// Save a preset by name
    #[instrument(skip(self, config))]
    pub fn save_preset(&self, name: &str, config: &EqConfig) -> Result<()> {
        config.save_to_file(self.preset_path(name))
    }

    /// Delete a preset by name
    #[instrument(skip(self))]
    pub fn delete_preset(&self, name: &str) -> Result<()> {
        let path = self.preset_path(name);

        if !path.exists() {
            return Err(ConfigError::PresetNotFound(name.to_string()));
        }

        fs::remove_file(path)?;
        Ok(())
    }

    fn preset_path(&self, name: &str) -> PathBuf {
        self.preset_dir.join(format!("{}.toml", name))
    }
}
