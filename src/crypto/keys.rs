//! Key derivation helpers using HKDF-SHA256.
//!
//! From one master key the sequential derivation chain produces any
//! number of independent output keys.  Each step expands the running
//! state into `state + output` bytes: the first half becomes the next
//! state, the second half is the emitted key.  Only the master secret
//! ever needs to be retained; every intermediate state is zeroed as soon
//! as it has been consumed.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{KeybundleError, Result};

/// Length of derived keys and of the master key (256 bits).
pub const KEY_LEN: usize = 32;

/// Run the sequential derivation chain, emitting one key per requested
/// output length.
///
/// The chain is deterministic, and a shorter length list is always a
/// prefix of a longer one — extending the list never changes the keys
/// already emitted.
pub fn derive_chain(master: &[u8], output_lengths: &[usize]) -> Result<Vec<Zeroizing<Vec<u8>>>> {
    let state_len = master.len();
    let mut state = Zeroizing::new(master.to_vec());
    let mut outputs = Vec::with_capacity(output_lengths.len());

    for &output_len in output_lengths {
        let mut expanded = Zeroizing::new(vec![0u8; state_len + output_len]);

        // Zero-length salt; all inputs are carried by the state itself.
        let hk = Hkdf::<Sha256>::new(None, &state);
        hk.expand(&[], &mut expanded)
            .map_err(|e| KeybundleError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

        state.copy_from_slice(&expanded[..state_len]);
        outputs.push(Zeroizing::new(expanded[state_len..].to_vec()));
    }

    Ok(outputs)
}

/// A wrapper around a 32-byte master key that automatically zeroes its
/// memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the 32-byte bundle-protection key, the first (and currently
    /// only) link of the derivation chain.
    pub fn derive_bundle_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        let mut outputs = derive_chain(&self.bytes, &[KEY_LEN])?;
        outputs.pop().ok_or_else(|| {
            KeybundleError::KeyDerivationFailed("derivation chain emitted no key".into())
        })
    }
}
