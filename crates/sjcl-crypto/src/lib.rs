//! sjcl-crypto: envelope encryption compatible with the Stanford JavaScript Crypto Library
//!
//! A message encrypted with `sjcl.encrypt(password, text)` in a browser can be
//! decrypted here, and the other way around. Nothing but the passphrase has to
//! be agreed on out of band: the envelope names its own mode, key size, tag
//! size and iteration count.
//!
//! ```text
//! passphrase ─┐
//! salt (8B) ──┴─ PBKDF2-HMAC-SHA256 (iter) ─→ key (ks bits)
//! iv (16B) ───── per-mode nonce ────────────→ nonce
//! key + nonce + plaintext ─ AES-CCM / AES-GCM ─→ ciphertext || tag (ts bits) = ct
//! ```
//!
//! Supported: cipher `aes`, modes `ccm` (64-bit tag) and `gcm` (128-bit tag),
//! key sizes 128 and 256 bits, version 1, empty `adata`.

pub mod aead;
pub mod codec;
pub mod envelope;
pub mod kdf;
pub mod nonce;

pub use codec::{decrypt, decrypt_str, decrypt_validated, encrypt, EncryptOptions};
pub use envelope::{repair_padding, Envelope, ValidatedEnvelope};
pub use kdf::{derive_key, KeyMaterial, Passphrase};
pub use sjcl_core::{KeySize, Mode, SjclError, SjclResult};
