//! SJCL envelope: wire record and validation
//!
//! An envelope is the JSON object `sjcl.encrypt` produces:
//! ```json
//! {"iv":"oi51KdYi8av0PysYeCDDiw==","v":1,"iter":10000,"ks":256,"ts":128,
//!  "mode":"gcm","adata":"","cipher":"aes","salt":"C4DRJM5AH+A=",
//!  "ct":"KIINDGEQO63pY2mFIWpOuWgx2RAnfU0rhKU="}
//! ```
//!
//! `ct` is the ciphertext with the authentication tag appended. Validation
//! runs completely before a key is derived; an envelope is never processed in
//! part.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use sjcl_core::{KeySize, Mode, SjclError, SjclResult, CIPHER, SALT_SIZE, VERSION};

use crate::nonce::{ccm_length_of_length, check_iv};

/// An encrypted message with every parameter needed to decrypt it.
///
/// Field order follows SJCL's own JSON output. Unknown fields are ignored on
/// input so envelopes embedded in larger API responses parse as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// IV, base64. For CCM only a prefix is used as the nonce.
    pub iv: String,
    /// Format version, always 1
    pub v: u32,
    /// PBKDF2 iteration count
    pub iter: u32,
    /// Key size in bits
    pub ks: u32,
    /// Tag size in bits
    pub ts: u32,
    /// "ccm" or "gcm"
    pub mode: String,
    /// Associated data, always empty
    pub adata: String,
    /// Always "aes"
    pub cipher: String,
    /// PBKDF2 salt, base64
    pub salt: String,
    /// Ciphertext || tag, base64
    pub ct: String,
}

impl Envelope {
    pub fn from_json(json: &str) -> SjclResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(data: &[u8]) -> SjclResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json(&self) -> SjclResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> SjclResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field and decode the binary ones.
    ///
    /// Order: cipher, mode, adata, v, ks, ts, iter, salt, iv, ct. The first
    /// failing check decides the error.
    pub fn validate(&self) -> SjclResult<ValidatedEnvelope> {
        if self.cipher != CIPHER {
            return Err(SjclError::UnsupportedCipher(self.cipher.clone()));
        }
        let mode: Mode = self.mode.parse()?;
        if !self.adata.is_empty() {
            return Err(SjclError::UnsupportedAssociatedData);
        }
        if self.v != VERSION {
            return Err(SjclError::UnsupportedVersion(self.v));
        }
        let key_size = KeySize::from_bits(self.ks)?;
        if self.ts != mode.tag_bits() {
            return Err(SjclError::TagLengthMismatch {
                mode: mode.as_str(),
                expected: mode.tag_bits(),
                got: self.ts,
            });
        }
        if self.iter == 0 {
            return Err(SjclError::InvalidIterationCount(self.iter));
        }

        let salt_bytes = decode_field("salt", &self.salt)?;
        let salt: [u8; SALT_SIZE] = salt_bytes.as_slice().try_into().map_err(|_| {
            SjclError::InvalidSaltLength {
                expected: SALT_SIZE,
                got: salt_bytes.len(),
            }
        })?;

        let iv = decode_field("iv", &self.iv)?;
        check_iv(mode, iv.len())?;

        let ct = decode_field("ct", &self.ct)?;
        if ct.len() < mode.tag_len() {
            return Err(SjclError::TruncatedCiphertext {
                len: ct.len(),
                tag_len: mode.tag_len(),
            });
        }

        Ok(ValidatedEnvelope {
            mode,
            key_size,
            iterations: self.iter,
            salt,
            iv,
            ct,
        })
    }
}

/// An envelope that passed validation, with its binary fields decoded.
///
/// Only [`Envelope::validate`] builds one, so `ct` always holds at least a
/// full tag and the IV is usable by the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEnvelope {
    mode: Mode,
    key_size: KeySize,
    iterations: u32,
    salt: [u8; SALT_SIZE],
    iv: Vec<u8>,
    /// Ciphertext with the tag still attached
    ct: Vec<u8>,
}

impl ValidatedEnvelope {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Ciphertext with the tag still attached.
    pub fn ct(&self) -> &[u8] {
        &self.ct
    }

    pub fn tag_bits(&self) -> u32 {
        self.mode.tag_bits()
    }

    /// Split `ct` into ciphertext body and trailing tag.
    pub fn split_tag(&self) -> (&[u8], &[u8]) {
        self.ct.split_at(self.ct.len() - self.mode.tag_len())
    }

    /// Plaintext length in bytes.
    pub fn payload_len(&self) -> usize {
        self.ct.len() - self.mode.tag_len()
    }

    /// Bit length of ciphertext with tag, as fed to nonce construction.
    pub fn ct_bits(&self) -> u64 {
        self.ct.len() as u64 * 8
    }

    /// CCM length-of-length this envelope decrypts with; `None` for GCM.
    pub fn ccm_l(&self) -> Option<usize> {
        match self.mode {
            Mode::Ccm => Some(ccm_length_of_length(
                self.iv.len(),
                self.payload_len() as u64,
            )),
            Mode::Gcm => None,
        }
    }
}

/// Pad a base64 string with `=` up to the next multiple of 4 characters.
///
/// Input that is already padded comes back borrowed and unchanged.
pub fn repair_padding(s: &str) -> Cow<'_, str> {
    match s.len() % 4 {
        0 => Cow::Borrowed(s),
        rem => {
            let mut padded = String::with_capacity(s.len() + 4 - rem);
            padded.push_str(s);
            padded.extend(std::iter::repeat('=').take(4 - rem));
            Cow::Owned(padded)
        }
    }
}

/// Tolerant decode: padding is repaired first, anything else must be valid standard base64.
pub fn decode_field(field: &'static str, s: &str) -> SjclResult<Vec<u8>> {
    STANDARD
        .decode(repair_padding(s).as_bytes())
        .map_err(|e| SjclError::MalformedEncoding {
            field,
            reason: e.to_string(),
        })
}

/// Strict encode: standard alphabet, always padded.
pub fn encode_field(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
