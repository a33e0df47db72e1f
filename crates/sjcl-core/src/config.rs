use serde::{Deserialize, Serialize};

use crate::error::{SjclError, SjclResult};
use crate::mode::{KeySize, Mode};
use crate::DEFAULT_ITERATIONS;

/// Top-level configuration (loaded from sjcl.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SjclConfig {
    pub codec: CodecConfig,
    pub log: LogConfig,
}

impl SjclConfig {
    pub fn from_toml_str(s: &str) -> SjclResult<Self> {
        toml::from_str(s).map_err(|e| SjclError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> SjclResult<String> {
        toml::to_string(self).map_err(|e| SjclError::Config(e.to_string()))
    }
}

/// Parameters used when producing new envelopes.
///
/// Decryption never reads these: every parameter it needs travels in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// AES mode for new envelopes (default: ccm)
    pub mode: Mode,
    /// PBKDF2 iteration count (default: 1000)
    pub iterations: u32,
    /// Derived key size in bits, 128 or 256 (default: 128)
    pub key_size: KeySize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Ccm,
            iterations: DEFAULT_ITERATIONS,
            key_size: KeySize::Aes128,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}
