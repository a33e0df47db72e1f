//! Per-mode nonce construction from the envelope IV
//!
//! GCM hands the IV to the cipher unchanged. CCM splits the 15 bytes after the
//! flags byte of its first block between the nonce and `L`, the width of the
//! message-length field. SJCL picks the smallest `L` (2..=4) that can encode the
//! payload length and keeps only the first `15 - L` bytes of the IV:
//!
//! ```text
//! payload bytes        L   nonce bytes (16-byte IV)
//! < 2^16               2   13
//! < 2^24               3   12
//! otherwise            4   11
//! ```
//!
//! Both sides must agree on the payload length or the nonces (and therefore
//! the tags) differ.

use sjcl_core::{Mode, SjclError, SjclResult};

/// Shortest nonce AES-CCM accepts.
pub const CCM_MIN_NONCE: usize = 7;

/// IV lengths AES-GCM is instantiated for.
pub const GCM_IV_LENGTHS: [usize; 2] = [12, 16];

/// CCM length-of-length for a payload of `payload_len` bytes and an IV of `iv_len` bytes.
pub fn ccm_length_of_length(iv_len: usize, payload_len: u64) -> usize {
    let mut l = 2;
    while l < 4 && (payload_len >> (8 * l)) > 0 {
        l += 1;
    }
    // A short IV cannot fill 15 - L bytes; widen L instead.
    if l + iv_len < 15 {
        l = 15 - iv_len;
    }
    l
}

/// Reject IVs the mode cannot turn into a nonce, before any key is derived.
pub fn check_iv(mode: Mode, iv_len: usize) -> SjclResult<()> {
    let usable = match mode {
        Mode::Ccm => iv_len >= CCM_MIN_NONCE,
        Mode::Gcm => GCM_IV_LENGTHS.contains(&iv_len),
    };
    if usable {
        Ok(())
    } else {
        Err(SjclError::InvalidIvLength {
            mode: mode.as_str(),
            len: iv_len,
        })
    }
}

/// Nonce handed to the AEAD.
///
/// `ol_bits` is the bit length of ciphertext with the tag appended and
/// `tag_bits` the tag length, so `(ol_bits - tag_bits) / 8` is the payload
/// length on both the encrypt and the decrypt side.
pub fn construct_nonce(mode: Mode, iv: &[u8], ol_bits: u64, tag_bits: u32) -> SjclResult<&[u8]> {
    check_iv(mode, iv.len())?;
    match mode {
        Mode::Gcm => Ok(iv),
        Mode::Ccm => {
            let payload_len = ol_bits.saturating_sub(u64::from(tag_bits)) / 8;
            let l = ccm_length_of_length(iv.len(), payload_len);
            let nonce_len = 15 - l;
            tracing::trace!(payload_len, l, nonce_len, "ccm nonce");
            Ok(&iv[..nonce_len])
        }
    }
}
