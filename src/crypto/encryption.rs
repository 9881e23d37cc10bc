//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! returns it alongside the ciphertext; the two travel separately in the
//! wire formats.  Associated data, when present, is bound into the
//! 128-bit authentication tag but not encrypted.
//!
//! The tag check in `decrypt` is the sole integrity gate in the system —
//! there is no separate MAC anywhere.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::errors::{KeybundleError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Fill a buffer with cryptographically secure random bytes.
pub fn generate_random_bytes(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf).map_err(|e| KeybundleError::RngFailed(e.to_string()))
}

/// Generate a random 12-byte nonce.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    generate_random_bytes(&mut nonce)?;
    Ok(nonce)
}

/// Generate random 32-byte key material.
pub fn generate_key_bytes() -> Result<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    generate_random_bytes(&mut key)?;
    Ok(key)
}

/// Encrypt `plaintext` with a 32-byte `key`, binding `associated_data`
/// into the authentication tag when present.
///
/// Returns the fresh nonce and the ciphertext (tag appended) as a pair.
pub fn encrypt(
    key: &[u8],
    plaintext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<([u8; NONCE_LEN], Vec<u8>)> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| KeybundleError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce_bytes = generate_nonce()?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = match associated_data {
        Some(aad) => cipher.encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        ),
        None => cipher.encrypt(nonce, plaintext),
    }
    .map_err(|e| KeybundleError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok((nonce_bytes, ciphertext))
}

/// Decrypt data that was produced by `encrypt`.
///
/// Fails with `AuthenticationFailed` if the tag does not verify — a
/// wrong key, wrong nonce, mismatched associated data, and corrupted
/// ciphertext are deliberately indistinguishable.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(KeybundleError::AuthenticationFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|_| KeybundleError::AuthenticationFailed)?;
    let nonce = Nonce::from_slice(nonce);

    match associated_data {
        Some(aad) => cipher.decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        ),
        None => cipher.decrypt(nonce, ciphertext),
    }
    .map_err(|_| KeybundleError::AuthenticationFailed)
}
