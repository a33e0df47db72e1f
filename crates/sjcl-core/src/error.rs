use thiserror::Error;

pub type SjclResult<T> = Result<T, SjclError>;

#[derive(Debug, Error)]
pub enum SjclError {
    #[error("unsupported cipher {0:?} (only \"aes\" is supported)")]
    UnsupportedCipher(String),

    #[error("unsupported mode {0:?} (expected \"ccm\" or \"gcm\")")]
    UnsupportedMode(String),

    /// Non-empty `adata` is rejected outright, never silently ignored.
    #[error("additional authenticated data must be empty")]
    UnsupportedAssociatedData,

    #[error("unsupported envelope version {0} (only version 1 is supported)")]
    UnsupportedVersion(u32),

    #[error("salt must be {expected} bytes, got {got}")]
    InvalidSaltLength { expected: usize, got: usize },

    #[error("key size must be 128 or 256 bits, got {0}")]
    InvalidKeyLength(u32),

    #[error("tag length for {mode} must be {expected} bits, got {got}")]
    TagLengthMismatch {
        mode: &'static str,
        expected: u32,
        got: u32,
    },

    #[error("iteration count must be positive, got {0}")]
    InvalidIterationCount(u32),

    #[error("IV of {len} bytes cannot be used with {mode}")]
    InvalidIvLength { mode: &'static str, len: usize },

    #[error("ciphertext is {len} bytes, shorter than the {tag_len}-byte tag")]
    TruncatedCiphertext { len: usize, tag_len: usize },

    /// Deliberately carries no detail about why verification failed.
    #[error("authentication failed: wrong passphrase or corrupted data")]
    AuthenticationFailure,

    #[error("malformed encoding in field '{field}': {reason}")]
    MalformedEncoding { field: &'static str, reason: String },

    #[error("cipher error: {0}")]
    Cipher(String),

    #[error("envelope JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl SjclError {
    /// True for errors raised by envelope validation, before any key derivation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SjclError::UnsupportedCipher(_)
                | SjclError::UnsupportedMode(_)
                | SjclError::UnsupportedAssociatedData
                | SjclError::UnsupportedVersion(_)
                | SjclError::InvalidSaltLength { .. }
                | SjclError::InvalidKeyLength(_)
                | SjclError::TagLengthMismatch { .. }
                | SjclError::InvalidIterationCount(_)
                | SjclError::InvalidIvLength { .. }
                | SjclError::TruncatedCiphertext { .. }
                | SjclError::MalformedEncoding { .. }
        )
    }
}
