//! Interoperability with envelopes produced by SJCL itself, plus the
//! rejection, tamper-detection and CCM length-field behaviour those envelopes
//! depend on.

use sjcl_crypto::{
    decrypt, decrypt_str, encrypt, EncryptOptions, Envelope, KeySize, Mode, Passphrase, SjclError,
};

const CCM_ENVELOPE: &str = r#"{"ks":128,"cipher":"aes","mode":"ccm","v":1,"adata":"","iv":"fR4fZKbjsZOrzDyjCYdEQw==","salt":"5IiimlH8JvY=","ts":64,"iter":1000,"ct":"V8BYrUdurq1/Qx/EX8EBliKDKa6XB93dZ6QOFSelw77Q"}"#;

const GCM_ENVELOPE: &str = r#"{"iv":"oi51KdYi8av0PysYeCDDiw==","v":1,"iter":10000,"ks":256,"ts":128,"mode":"gcm","adata":"","cipher":"aes","salt":"C4DRJM5AH+A=","ct":"KIINDGEQO63pY2mFIWpOuWgx2RAnfU0rhKU="}"#;

const GCM_PASSPHRASE: &str = "vYHOPyQ7Q6NOfm6zkT44IE2SVv+52arqCOv7cDfMApI=";

fn flip_bit(b64: &str, bit: usize) -> String {
    let mut bytes = sjcl_crypto::envelope::decode_field("ct", b64).unwrap();
    bytes[bit / 8] ^= 1 << (bit % 8);
    sjcl_crypto::envelope::encode_field(&bytes)
}

#[test]
fn decrypts_sjcl_ccm_envelope() {
    let envelope = Envelope::from_json(CCM_ENVELOPE).unwrap();
    let plaintext = decrypt_str(&envelope, &Passphrase::from("shared_secret")).unwrap();
    assert_eq!(plaintext, "secret message to encrypt");
}

#[test]
fn decrypts_sjcl_gcm_envelope() {
    let envelope = Envelope::from_json(GCM_ENVELOPE).unwrap();
    let plaintext = decrypt_str(&envelope, &Passphrase::from(GCM_PASSPHRASE)).unwrap();
    assert_eq!(plaintext, "test paste");
}

#[test]
fn sjcl_envelope_wrong_passphrase() {
    let envelope = Envelope::from_json(CCM_ENVELOPE).unwrap();
    let result = decrypt(&envelope, &Passphrase::from("not_the_secret"));
    assert!(matches!(result, Err(SjclError::AuthenticationFailure)));
}

#[test]
fn every_bit_flip_in_ccm_ct_fails_authentication() {
    let original = Envelope::from_json(CCM_ENVELOPE).unwrap();
    let passphrase = Passphrase::from("shared_secret");
    let ct_bits = 33 * 8;

    for bit in 0..ct_bits {
        let mut tampered = original.clone();
        tampered.ct = flip_bit(&original.ct, bit);
        let result = decrypt(&tampered, &passphrase);
        assert!(
            matches!(result, Err(SjclError::AuthenticationFailure)),
            "flipping bit {bit} must fail authentication, got {result:?}"
        );
    }
}

#[test]
fn every_bit_flip_in_gcm_ct_fails_authentication() {
    let passphrase = Passphrase::from("pw");
    let options = EncryptOptions::new(Mode::Gcm).with_iterations(1);
    let original = encrypt(b"tamper me", &passphrase, &options).unwrap();
    assert_eq!(decrypt_str(&original, &passphrase).unwrap(), "tamper me");

    // 9 ciphertext bytes followed by the 16-byte tag
    let ct_bits = (9 + 16) * 8;
    for bit in 0..ct_bits {
        let mut tampered = original.clone();
        tampered.ct = flip_bit(&original.ct, bit);
        let result = decrypt(&tampered, &passphrase);
        assert!(
            matches!(result, Err(SjclError::AuthenticationFailure)),
            "flipping bit {bit} must fail authentication, got {result:?}"
        );
    }
}

#[test]
fn validated_envelope_decrypts_through_getters() {
    let envelope = Envelope::from_json(CCM_ENVELOPE).unwrap();
    let validated = envelope.validate().unwrap();
    assert_eq!(validated.mode(), Mode::Ccm);
    assert_eq!(validated.key_size(), KeySize::Aes128);
    assert_eq!(validated.iterations(), 1000);
    assert_eq!(validated.iv().len(), 16);
    assert_eq!(validated.ct().len(), 33);

    let plaintext =
        sjcl_crypto::decrypt_validated(&validated, &Passphrase::from("shared_secret")).unwrap();
    assert_eq!(plaintext, b"secret message to encrypt");
}

#[test]
fn tag_only_gcm_ct_is_an_empty_message() {
    let passphrase = Passphrase::from("pw");
    let options = EncryptOptions::new(Mode::Gcm).with_iterations(1);
    let envelope = encrypt(b"", &passphrase, &options).unwrap();

    let validated = envelope.validate().unwrap();
    assert_eq!(validated.ct().len(), 16);
    assert_eq!(validated.payload_len(), 0);
    assert!(sjcl_crypto::decrypt_validated(&validated, &passphrase)
        .unwrap()
        .is_empty());

    // Shorter than the tag is rejected before anything is split
    let mut short = envelope.clone();
    short.ct = sjcl_crypto::envelope::encode_field(&[0u8; 3]);
    assert!(matches!(
        decrypt(&short, &passphrase),
        Err(SjclError::TruncatedCiphertext { len: 3, tag_len: 16 })
    ));
}

#[test]
fn truncated_tag_fails() {
    let mut envelope = Envelope::from_json(CCM_ENVELOPE).unwrap();
    let mut ct = sjcl_crypto::envelope::decode_field("ct", &envelope.ct).unwrap();
    ct.pop();
    envelope.ct = sjcl_crypto::envelope::encode_field(&ct);

    let result = decrypt(&envelope, &Passphrase::from("shared_secret"));
    assert!(matches!(result, Err(SjclError::AuthenticationFailure)));
}

#[test]
fn rejects_des_before_key_derivation() {
    let mut envelope = Envelope::from_json(CCM_ENVELOPE).unwrap();
    envelope.cipher = "des".into();
    // Deriving a key with this many iterations would take hours
    envelope.iter = u32::MAX;

    let result = decrypt(&envelope, &Passphrase::from("shared_secret"));
    assert!(matches!(result, Err(SjclError::UnsupportedCipher(c)) if c == "des"));
}

#[test]
fn rejects_associated_data() {
    let mut envelope = Envelope::from_json(CCM_ENVELOPE).unwrap();
    envelope.adata = "x".into();
    envelope.iter = u32::MAX;

    let result = decrypt(&envelope, &Passphrase::from("shared_secret"));
    assert!(matches!(result, Err(SjclError::UnsupportedAssociatedData)));
}

#[test]
fn validation_errors_are_classified() {
    let mut envelope = Envelope::from_json(GCM_ENVELOPE).unwrap();
    envelope.v = 2;
    let err = decrypt(&envelope, &Passphrase::from(GCM_PASSPHRASE)).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, SjclError::UnsupportedVersion(2)));
}

#[test]
fn tolerates_missing_base64_padding() {
    let mut envelope = Envelope::from_json(GCM_ENVELOPE).unwrap();
    envelope.iv = envelope.iv.trim_end_matches('=').to_string();
    envelope.salt = envelope.salt.trim_end_matches('=').to_string();
    envelope.ct = envelope.ct.trim_end_matches('=').to_string();
    assert_eq!(envelope.ct.len() % 4, 3);

    let plaintext = decrypt_str(&envelope, &Passphrase::from(GCM_PASSPHRASE)).unwrap();
    assert_eq!(plaintext, "test paste");
}

#[test]
fn ccm_length_field_boundary() {
    let passphrase = Passphrase::from("boundary");
    let options = EncryptOptions::new(Mode::Ccm).with_iterations(1);

    let below = vec![0xA5u8; (1 << 16) - 1];
    let at = vec![0x5Au8; 1 << 16];

    let env_below = encrypt(&below, &passphrase, &options).unwrap();
    let env_at = encrypt(&at, &passphrase, &options).unwrap();

    let l_below = env_below.validate().unwrap().ccm_l();
    let l_at = env_at.validate().unwrap().ccm_l();
    assert_eq!(l_below, Some(2));
    assert_eq!(l_at, Some(3));

    assert_eq!(decrypt(&env_below, &passphrase).unwrap(), below);
    assert_eq!(decrypt(&env_at, &passphrase).unwrap(), at);
}

#[test]
fn ccm_aes256_roundtrip() {
    let passphrase = Passphrase::from("wide key");
    let options = EncryptOptions::new(Mode::Ccm)
        .with_iterations(50)
        .with_key_size(KeySize::Aes256);
    let envelope = encrypt(b"ccm with a 256-bit key", &passphrase, &options).unwrap();
    assert_eq!(envelope.ks, 256);

    let json = envelope.to_json().unwrap();
    let parsed = Envelope::from_json(&json).unwrap();
    assert_eq!(
        decrypt_str(&parsed, &passphrase).unwrap(),
        "ccm with a 256-bit key"
    );
}

#[test]
fn concurrent_calls_share_nothing() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let passphrase = Passphrase::from(format!("thread-{i}"));
                let mode = if i % 2 == 0 { Mode::Ccm } else { Mode::Gcm };
                let options = EncryptOptions::new(mode).with_iterations(10);
                let message = format!("message from thread {i}");

                let envelope = encrypt(message.as_bytes(), &passphrase, &options).unwrap();
                assert_eq!(decrypt_str(&envelope, &passphrase).unwrap(), message);
                envelope
            })
        })
        .collect();

    let envelopes: Vec<Envelope> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, a) in envelopes.iter().enumerate() {
        for b in &envelopes[i + 1..] {
            assert_ne!(a.salt, b.salt);
            assert_ne!(a.iv, b.iv);
        }
    }
}
