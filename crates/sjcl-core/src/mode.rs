//! AES modes and key sizes understood by the envelope format

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SjclError, SjclResult};

/// Authenticated AES mode named by the envelope `mode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// AES-CCM with a 64-bit tag; the nonce is a truncated IV
    #[default]
    Ccm,
    /// AES-GCM with a 128-bit tag; the IV is the nonce
    Gcm,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Ccm, Mode::Gcm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Ccm => "ccm",
            Mode::Gcm => "gcm",
        }
    }

    /// Authentication tag length in bits written to and required in `ts`.
    pub fn tag_bits(&self) -> u32 {
        match self {
            Mode::Ccm => 64,
            Mode::Gcm => 128,
        }
    }

    pub fn tag_len(&self) -> usize {
        self.tag_bits() as usize / 8
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SjclError;

    fn from_str(s: &str) -> SjclResult<Self> {
        match s {
            "ccm" => Ok(Mode::Ccm),
            "gcm" => Ok(Mode::Gcm),
            other => Err(SjclError::UnsupportedMode(other.to_string())),
        }
    }
}

/// Derived AES key size. Serialized as a bit count, like the envelope `ks` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum KeySize {
    #[default]
    Aes128,
    Aes256,
}

impl KeySize {
    pub fn from_bits(bits: u32) -> SjclResult<Self> {
        match bits {
            128 => Ok(KeySize::Aes128),
            256 => Ok(KeySize::Aes256),
            other => Err(SjclError::InvalidKeyLength(other)),
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            KeySize::Aes128 => 128,
            KeySize::Aes256 => 256,
        }
    }

    pub fn bytes(&self) -> usize {
        self.bits() as usize / 8
    }
}

impl TryFrom<u32> for KeySize {
    type Error = SjclError;

    fn try_from(bits: u32) -> SjclResult<Self> {
        KeySize::from_bits(bits)
    }
}

impl From<KeySize> for u32 {
    fn from(ks: KeySize) -> u32 {
        ks.bits()
    }
}
