//! Integration tests for the keybundle crypto module.

use keybundle::crypto::{decrypt, derive_chain, derive_master_key, encrypt, generate_nonce};
use keybundle::{KeybundleError, Secret, Value};

// ---------------------------------------------------------------------------
// AEAD round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"the newest key encrypts, every key decrypts";

    let (nonce, ciphertext) = encrypt(&key, plaintext, None).expect("encrypt should succeed");
    assert_eq!(nonce.len(), 12);
    // Ciphertext carries a 16-byte tag.
    assert_eq!(ciphertext.len(), plaintext.len() + 16);

    let recovered = decrypt(&key, &nonce, &ciphertext, None).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_uses_a_fresh_nonce_each_time() {
    let key = [0xCDu8; 32];
    let (nonce1, ct1) = encrypt(&key, b"same input", None).unwrap();
    let (nonce2, ct2) = encrypt(&key, b"same input", None).unwrap();

    assert_ne!(nonce1, nonce2, "two encryptions must use different nonces");
    assert_ne!(ct1, ct2);
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let key = [0x11u8; 32];
    let wrong_key = [0x22u8; 32];

    let (nonce, ciphertext) = encrypt(&key, b"secret", None).unwrap();
    let err = decrypt(&wrong_key, &nonce, &ciphertext, None).unwrap_err();
    assert!(matches!(err, KeybundleError::AuthenticationFailed));
}

#[test]
fn decrypt_with_corrupted_ciphertext_fails() {
    let key = [0xBBu8; 32];
    let (nonce, mut ciphertext) = encrypt(&key, b"payload", None).unwrap();
    let last = ciphertext.len() - 1;
    ciphertext[last] ^= 0xff;

    let err = decrypt(&key, &nonce, &ciphertext, None).unwrap_err();
    assert!(matches!(err, KeybundleError::AuthenticationFailed));
}

#[test]
fn decrypt_with_wrong_nonce_fails() {
    let key = [0x42u8; 32];
    let (_, ciphertext) = encrypt(&key, b"payload", None).unwrap();
    let other_nonce = generate_nonce().unwrap();

    assert!(decrypt(&key, &other_nonce, &ciphertext, None).is_err());
}

#[test]
fn handles_empty_plaintext() {
    let key = [0x01u8; 32];
    let (nonce, ciphertext) = encrypt(&key, b"", None).unwrap();
    let recovered = decrypt(&key, &nonce, &ciphertext, None).unwrap();
    assert!(recovered.is_empty());
}

// ---------------------------------------------------------------------------
// Associated data binding
// ---------------------------------------------------------------------------

#[test]
fn associated_data_roundtrip() {
    let key = [0x77u8; 32];
    let aad: &[u8] = b"bound but not encrypted";

    let (nonce, ciphertext) = encrypt(&key, b"data", Some(aad)).unwrap();
    let recovered = decrypt(&key, &nonce, &ciphertext, Some(aad)).unwrap();
    assert_eq!(recovered, b"data");
}

#[test]
fn wrong_associated_data_fails() {
    let key = [0x77u8; 32];
    let (nonce, ciphertext) = encrypt(&key, b"data", Some(b"aad-one".as_slice())).unwrap();

    let err = decrypt(&key, &nonce, &ciphertext, Some(b"aad-two".as_slice())).unwrap_err();
    assert!(matches!(err, KeybundleError::AuthenticationFailed));
}

#[test]
fn associated_data_mismatch_vs_none() {
    let key = [0x77u8; 32];

    // Encrypted without aad, decrypted with aad.
    let (nonce, ciphertext) = encrypt(&key, b"no aad", None).unwrap();
    assert!(decrypt(&key, &nonce, &ciphertext, Some(b"aad".as_slice())).is_err());

    // Encrypted with aad, decrypted without.
    let (nonce, ciphertext) = encrypt(&key, b"with aad", Some(b"aad".as_slice())).unwrap();
    assert!(decrypt(&key, &nonce, &ciphertext, None).is_err());
}

// ---------------------------------------------------------------------------
// Derivation chain
// ---------------------------------------------------------------------------

#[test]
fn chain_is_deterministic() {
    let master = [0x42u8; 32];
    let a = derive_chain(&master, &[32, 32]).unwrap();
    let b = derive_chain(&master, &[32, 32]).unwrap();
    assert_eq!(*a[0], *b[0]);
    assert_eq!(*a[1], *b[1]);
}

#[test]
fn chain_respects_requested_lengths() {
    let master = [0x42u8; 32];
    let outputs = derive_chain(&master, &[16, 32, 64]).unwrap();
    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].len(), 16);
    assert_eq!(outputs[1].len(), 32);
    assert_eq!(outputs[2].len(), 64);
}

#[test]
fn chain_outputs_are_independent() {
    let master = [0x42u8; 32];
    let outputs = derive_chain(&master, &[32, 32]).unwrap();
    assert_ne!(*outputs[0], *outputs[1]);
    assert_ne!(outputs[0].as_slice(), master.as_slice());
}

#[test]
fn shorter_chain_is_a_prefix_of_a_longer_one() {
    // Extending the length list must never change keys already emitted —
    // that is what makes the chain forward-extensible.
    let master = [0x42u8; 32];
    let short = derive_chain(&master, &[32]).unwrap();
    let long = derive_chain(&master, &[32, 16]).unwrap();
    assert_eq!(*short[0], *long[0]);
}

#[test]
fn empty_chain_emits_nothing() {
    let master = [0x42u8; 32];
    let outputs = derive_chain(&master, &[]).unwrap();
    assert!(outputs.is_empty());
}

// ---------------------------------------------------------------------------
// Master-key derivation
// ---------------------------------------------------------------------------

#[test]
fn master_key_is_deterministic() {
    let secret = Secret::from("correct horse battery staple");
    let context = [Value::from("test")];

    let a = derive_master_key(&secret, Some(&context)).unwrap();
    let b = derive_master_key(&secret, Some(&context)).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn different_contexts_derive_different_keys() {
    let secret = Secret::from("same password");

    let a = derive_master_key(&secret, Some(&[Value::from("store-a")])).unwrap();
    let b = derive_master_key(&secret, Some(&[Value::from("store-b")])).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn absent_context_differs_from_empty_context() {
    // No context means an empty salt; an empty context vector still
    // contributes a sequence header. The two must not collide.
    let secret = Secret::from("same password");

    let none = derive_master_key(&secret, None).unwrap();
    let empty = derive_master_key(&secret, Some(&[])).unwrap();
    assert_ne!(none.as_bytes(), empty.as_bytes());
}

#[test]
fn text_and_byte_secrets_derive_different_keys() {
    // "a" as a passphrase and b"a" as raw bytes encode with different
    // canonical tags, so they must not derive the same master key.
    let text = Secret::from("a");
    let bytes = Secret::from(b"a".as_slice());

    let a = derive_master_key(&text, None).unwrap();
    let b = derive_master_key(&bytes, None).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}
