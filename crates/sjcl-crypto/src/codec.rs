//! Envelope encryption and decryption

use rand::RngCore;
use tracing::debug;

use sjcl_core::config::CodecConfig;
use sjcl_core::{
    KeySize, Mode, SjclError, SjclResult, CIPHER, DEFAULT_ITERATIONS, IV_SIZE, SALT_SIZE, VERSION,
};

use crate::aead;
use crate::envelope::{encode_field, Envelope, ValidatedEnvelope};
use crate::kdf::{derive_key, Passphrase};
use crate::nonce::construct_nonce;

/// Parameters for producing a new envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptOptions {
    pub mode: Mode,
    pub iterations: u32,
    pub key_size: KeySize,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Ccm,
            iterations: DEFAULT_ITERATIONS,
            key_size: KeySize::Aes128,
        }
    }
}

impl EncryptOptions {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_key_size(mut self, key_size: KeySize) -> Self {
        self.key_size = key_size;
        self
    }
}

impl TryFrom<&CodecConfig> for EncryptOptions {
    type Error = SjclError;

    fn try_from(config: &CodecConfig) -> SjclResult<Self> {
        if config.iterations == 0 {
            return Err(SjclError::Config(
                "codec.iterations must be positive".to_string(),
            ));
        }
        Ok(Self {
            mode: config.mode,
            iterations: config.iterations,
            key_size: config.key_size,
        })
    }
}

/// Encrypt `plaintext` into a new envelope.
///
/// A fresh random salt and IV are drawn for every call, so encrypting the
/// same plaintext twice never yields the same envelope.
pub fn encrypt(
    plaintext: &[u8],
    passphrase: &Passphrase,
    options: &EncryptOptions,
) -> SjclResult<Envelope> {
    let mode = options.mode;

    let mut salt = [0u8; SALT_SIZE];
    let mut iv = [0u8; IV_SIZE];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);

    let key = derive_key(passphrase, &salt, options.iterations, options.key_size)?;

    // Same bit length the receiver will see: ciphertext plus tag
    let ol_bits = (plaintext.len() as u64 + mode.tag_len() as u64) * 8;
    let nonce = construct_nonce(mode, &iv, ol_bits, mode.tag_bits())?;

    let ct = aead::seal(mode, &key, nonce, plaintext)?;

    debug!(
        mode = %mode,
        iterations = options.iterations,
        key_bits = options.key_size.bits(),
        payload_len = plaintext.len(),
        nonce_len = nonce.len(),
        "encrypted envelope"
    );

    Ok(Envelope {
        iv: encode_field(&iv),
        v: VERSION,
        iter: options.iterations,
        ks: options.key_size.bits(),
        ts: mode.tag_bits(),
        mode: mode.as_str().to_string(),
        adata: String::new(),
        cipher: CIPHER.to_string(),
        salt: encode_field(&salt),
        ct: encode_field(&ct),
    })
}

/// Validate `envelope` and decrypt it.
///
/// Validation errors are returned before any key derivation. A wrong
/// passphrase or any modification of `ct` yields
/// [`SjclError::AuthenticationFailure`] and no plaintext.
pub fn decrypt(envelope: &Envelope, passphrase: &Passphrase) -> SjclResult<Vec<u8>> {
    let validated = envelope.validate()?;
    decrypt_validated(&validated, passphrase)
}

/// Decrypt an envelope that has already been validated.
pub fn decrypt_validated(
    envelope: &ValidatedEnvelope,
    passphrase: &Passphrase,
) -> SjclResult<Vec<u8>> {
    let mode = envelope.mode();

    let key = derive_key(
        passphrase,
        envelope.salt(),
        envelope.iterations(),
        envelope.key_size(),
    )?;

    let (body, tag) = envelope.split_tag();
    let nonce = construct_nonce(
        mode,
        envelope.iv(),
        envelope.ct_bits(),
        envelope.tag_bits(),
    )?;

    debug!(
        mode = %mode,
        iterations = envelope.iterations(),
        key_bits = envelope.key_size().bits(),
        payload_len = body.len(),
        nonce_len = nonce.len(),
        "decrypting envelope"
    );

    aead::open(mode, &key, nonce, body, tag)
}

/// Decrypt an envelope whose payload is UTF-8 text.
pub fn decrypt_str(envelope: &Envelope, passphrase: &Passphrase) -> SjclResult<String> {
    let plaintext = decrypt(envelope, passphrase)?;
    String::from_utf8(plaintext).map_err(|e| SjclError::MalformedEncoding {
        field: "plaintext",
        reason: e.utf8_error().to_string(),
    })
}
