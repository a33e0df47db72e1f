//! AES-CCM / AES-GCM dispatch
//!
//! Nonce length and key size are type parameters of the RustCrypto AEADs, so
//! each (mode, key size, nonce length) combination the format can produce
//! maps to one concrete cipher type. Tags are fixed per mode: 8 bytes for CCM,
//! 16 bytes for GCM.

use aes::{Aes128, Aes256};
use aes_gcm::aead::consts::{U10, U11, U12, U13, U16, U7, U8, U9};
use aes_gcm::aead::{AeadInPlace, KeyInit, Nonce, Tag};
use aes_gcm::AesGcm;
use ccm::Ccm;
use zeroize::Zeroize;

use sjcl_core::{KeySize, Mode, SjclError, SjclResult};

use crate::kdf::KeyMaterial;

macro_rules! dispatch {
    ($op:ident, $mode:expr, $key:expr, $nonce:expr $(, $arg:expr)*) => {
        match ($mode, $key.key_size(), $nonce.len()) {
            (Mode::Ccm, KeySize::Aes128, 7) => $op::<Ccm<Aes128, U8, U7>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes128, 8) => $op::<Ccm<Aes128, U8, U8>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes128, 9) => $op::<Ccm<Aes128, U8, U9>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes128, 10) => $op::<Ccm<Aes128, U8, U10>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes128, 11) => $op::<Ccm<Aes128, U8, U11>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes128, 12) => $op::<Ccm<Aes128, U8, U12>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes128, 13) => $op::<Ccm<Aes128, U8, U13>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes256, 7) => $op::<Ccm<Aes256, U8, U7>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes256, 8) => $op::<Ccm<Aes256, U8, U8>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes256, 9) => $op::<Ccm<Aes256, U8, U9>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes256, 10) => $op::<Ccm<Aes256, U8, U10>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes256, 11) => $op::<Ccm<Aes256, U8, U11>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes256, 12) => $op::<Ccm<Aes256, U8, U12>>($key, $nonce $(, $arg)*),
            (Mode::Ccm, KeySize::Aes256, 13) => $op::<Ccm<Aes256, U8, U13>>($key, $nonce $(, $arg)*),
            (Mode::Gcm, KeySize::Aes128, 12) => $op::<AesGcm<Aes128, U12>>($key, $nonce $(, $arg)*),
            (Mode::Gcm, KeySize::Aes128, 16) => $op::<AesGcm<Aes128, U16>>($key, $nonce $(, $arg)*),
            (Mode::Gcm, KeySize::Aes256, 12) => $op::<AesGcm<Aes256, U12>>($key, $nonce $(, $arg)*),
            (Mode::Gcm, KeySize::Aes256, 16) => $op::<AesGcm<Aes256, U16>>($key, $nonce $(, $arg)*),
            (mode, _, len) => Err(SjclError::InvalidIvLength {
                mode: mode.as_str(),
                len,
            }),
        }
    };
}

/// Encrypt `plaintext`, returning ciphertext with the tag appended.
pub fn seal(mode: Mode, key: &KeyMaterial, nonce: &[u8], plaintext: &[u8]) -> SjclResult<Vec<u8>> {
    dispatch!(seal_with, mode, key, nonce, plaintext)
}

/// Verify `tag` over `body` and decrypt it.
///
/// Any failure is reported as [`SjclError::AuthenticationFailure`] and no
/// plaintext bytes survive it.
pub fn open(
    mode: Mode,
    key: &KeyMaterial,
    nonce: &[u8],
    body: &[u8],
    tag: &[u8],
) -> SjclResult<Vec<u8>> {
    if tag.len() != mode.tag_len() {
        return Err(SjclError::TagLengthMismatch {
            mode: mode.as_str(),
            expected: mode.tag_bits(),
            got: (tag.len() * 8) as u32,
        });
    }
    dispatch!(open_with, mode, key, nonce, body, tag)
}

fn cipher_for<A: KeyInit>(key: &KeyMaterial) -> SjclResult<A> {
    A::new_from_slice(key.as_bytes())
        .map_err(|_| SjclError::InvalidKeyLength((key.as_bytes().len() * 8) as u32))
}

fn seal_with<A: AeadInPlace + KeyInit>(
    key: &KeyMaterial,
    nonce: &[u8],
    plaintext: &[u8],
) -> SjclResult<Vec<u8>> {
    let cipher = cipher_for::<A>(key)?;

    let mut buffer = Vec::with_capacity(plaintext.len() + 16);
    buffer.extend_from_slice(plaintext);
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<A>::from_slice(nonce), &[], &mut buffer)
        .map_err(|e| {
            SjclError::Cipher(format!("encrypting {} bytes failed: {e}", plaintext.len()))
        })?;

    buffer.extend_from_slice(&tag);
    Ok(buffer)
}

fn open_with<A: AeadInPlace + KeyInit>(
    key: &KeyMaterial,
    nonce: &[u8],
    body: &[u8],
    tag: &[u8],
) -> SjclResult<Vec<u8>> {
    let cipher = cipher_for::<A>(key)?;

    let mut buffer = body.to_vec();
    let verified = cipher.decrypt_in_place_detached(
        Nonce::<A>::from_slice(nonce),
        &[],
        &mut buffer,
        Tag::<A>::from_slice(tag),
    );

    if verified.is_err() {
        buffer.zeroize();
        return Err(SjclError::AuthenticationFailure);
    }
    Ok(buffer)
}
