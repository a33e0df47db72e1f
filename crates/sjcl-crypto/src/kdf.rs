//! Key derivation: PBKDF2-HMAC-SHA256 passphrase → AES key

use pbkdf2::pbkdf2_hmac;
use secrecy::{ExposeSecret, SecretBox, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use sjcl_core::{KeySize, SjclError, SjclResult, SALT_SIZE};

/// A passphrase, as raw bytes. Text passphrases are used as their UTF-8 bytes.
///
/// Zeroized on drop.
pub struct Passphrase {
    bytes: SecretBox<[u8]>,
}

impl Passphrase {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: SecretBox::new(bytes.into().into_boxed_slice()),
        }
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}

impl From<&str> for Passphrase {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for Passphrase {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<&[u8]> for Passphrase {
    fn from(b: &[u8]) -> Self {
        Self::new(b)
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(b: Vec<u8>) -> Self {
        Self::new(b)
    }
}

impl From<&SecretString> for Passphrase {
    fn from(s: &SecretString) -> Self {
        Self::new(s.expose_secret().as_bytes())
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passphrase")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A derived AES key, 128 or 256 bits. Lives for a single encrypt/decrypt call.
///
/// Zeroized on drop.
pub struct KeyMaterial {
    bytes: Vec<u8>,
    size: KeySize,
}

impl KeyMaterial {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn key_size(&self) -> KeySize {
        self.size
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("size", &self.size)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive an AES key from a passphrase and the per-message salt.
///
/// The PRF is always HMAC-SHA256, matching what SJCL uses for `sjcl.misc.pbkdf2`.
/// Nothing is cached: every envelope carries its own salt.
pub fn derive_key(
    passphrase: &Passphrase,
    salt: &[u8; SALT_SIZE],
    iterations: u32,
    size: KeySize,
) -> SjclResult<KeyMaterial> {
    if iterations == 0 {
        return Err(SjclError::InvalidIterationCount(iterations));
    }

    let mut bytes = vec![0u8; size.bytes()];
    pbkdf2_hmac::<Sha256>(passphrase.expose(), salt, iterations, &mut bytes);

    Ok(KeyMaterial { bytes, size })
}
