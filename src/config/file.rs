//! Configuration file management for wavi.
//!
//! Loads and saves application configuration from a TOML file in the user's
//! config directory. A missing file yields defaults; the file is created on
//! first save (or by `wavi config`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio input device. Options:
    /// - "default" for the system default device
    /// - numeric index (0, 1, 2, etc.) from `wavi list-devices`
    /// - device name from `wavi list-devices`
    #[serde(default = "default_device")]
    pub device: String,
}

/// Waveform rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// Waveform pixel density: amplitude values per second of audio.
    #[serde(default = "default_samples_per_sec")]
    pub samples_per_sec: u32,
    /// Fixed normalization ceiling for live capture bars (raw i16 amplitude,
    /// 1..=32767). Live bars never rescale against audio that arrives later;
    /// they are scaled against this value instead.
    #[serde(default = "default_live_ceiling")]
    pub live_ceiling: f32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_samples_per_sec() -> u32 {
    80
}

fn default_live_ceiling() -> f32 {
    8192.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            device: default_device(),
        }
    }
}

impl Default for WaveformConfig {
    fn default() -> Self {
        WaveformConfig {
            samples_per_sec: default_samples_per_sec(),
            live_ceiling: default_live_ceiling(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaviConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub waveform: WaveformConfig,
}

impl WaviConfig {
    /// Loads configuration, falling back to defaults if no file exists.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If an existing file cannot be read or its TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file, using defaults");
            return Ok(WaviConfig::default());
        }
        let content = fs::read_to_string(&config_path)?;
        let config: WaviConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_dir = home.join(".config").join("wavi");
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("wavi.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WaviConfig::default();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.waveform.samples_per_sec, 80);
        assert_eq!(config.waveform.live_ceiling, 8192.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: WaviConfig = toml::from_str("[waveform]\nsamples_per_sec = 40\n").unwrap();
        assert_eq!(config.waveform.samples_per_sec, 40);
        assert_eq!(config.waveform.live_ceiling, 8192.0);
        assert_eq!(config.audio.device, "default");
    }
}
