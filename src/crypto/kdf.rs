//! Password-based master-key derivation using PBKDF2-HMAC-SHA256.
//!
//! The caller's secret is canonically encoded and fed to PBKDF2 as the
//! password; the caller's context vector is canonically encoded as a
//! sequence and fed as the salt.  Binding the context into the salt means
//! the same passphrase yields an unrelated master key per context, so
//! multiple independent stores can safely share one human-memorable
//! password.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::canonical::{encode_canonical_sequence, Secret, Value};
use crate::crypto::keys::MasterKey;
use crate::errors::Result;

/// PBKDF2 iteration count.  Fixed — the derived key must be reproducible
/// across every reader of a saved envelope.
const PBKDF2_ITERATIONS: u32 = 500_000;

/// Length of the derived master key in bytes (256 bits).
const KEY_LEN: usize = 32;

/// Derive a 32-byte master key from a secret and an optional context
/// vector.
///
/// An absent context derives with an empty salt, which differs from an
/// empty context vector (whose canonical encoding is a zero-element
/// sequence header).
pub fn derive_master_key(secret: &Secret, context: Option<&[Value]>) -> Result<MasterKey> {
    let password = secret.to_canonical()?;
    let salt = match context {
        Some(items) => encode_canonical_sequence(items)?,
        None => Vec::new(),
    };

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(&password, &salt, PBKDF2_ITERATIONS, &mut key);

    let master = MasterKey::new(key);
    key.zeroize();
    Ok(master)
}
