// Configuration for the emulation core
//
// Everything a host can tune before (or between) runs, serialized as TOML
// so front-ends can persist it wherever they like.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// PCM sample format of the audio stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    /// Unsigned 8-bit, silence at 128
    Unsigned8,
    /// Signed 8-bit, silence at 0
    Signed8,
}

/// Audio output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// PCM sample format
    pub format: AudioFormat,

    /// Samples per buffer; `step` reports when one fills
    pub buffer_size: usize,

    /// Master volume (0.0 mute, 1.0 full)
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            sample_rate: 44_100,
            format: AudioFormat::Unsigned8,
            buffer_size: 512,
            volume: 1.0,
        }
    }
}

/// Video output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Seed for the power-on palette noise; `None` zeroes the palette
    /// instead, which reproducible test runs want
    pub palette_noise_seed: Option<u64>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            palette_noise_seed: Some(0x2C02_C0DE),
        }
    }
}

/// Complete core configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Audio settings
    pub audio: AudioConfig,

    /// Video settings
    pub video: VideoConfig,
}

impl EmulatorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Render the configuration as TOML text
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Load from a TOML file, falling back to defaults on any problem
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => match Self::from_toml_str(&text) {
                Ok(config) => config,
                Err(error) => {
                    log::warn!(
                        "config {} unparseable ({}); using defaults",
                        path.as_ref().display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save as a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        fs::write(path, self.to_toml_string())
    }
}
