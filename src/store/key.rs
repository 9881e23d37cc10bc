//! The `KeyRecord` type stored inside a key store.
//!
//! Each record pairs a random UUID with 32 bytes of random key material.
//! Records are immutable once created and are never removed from a store,
//! so any ciphertext that names a record's id stays decryptable for the
//! life of the store.  Key material is zeroed on drop.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::encryption::generate_key_bytes;
use crate::errors::Result;

/// A single symmetric data-encryption key held by a store.
#[derive(Clone, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct KeyRecord {
    /// Random UUID naming this key; travels with every ciphertext.
    pub id: String,

    /// The raw 32-byte key material.  Serialized as a CBOR byte string
    /// under the wire name `value`.
    #[serde(rename = "value", with = "serde_bytes")]
    pub secret: Vec<u8>,
}

impl KeyRecord {
    /// Generate a fresh record: new UUID, new random 32-byte secret.
    pub fn generate() -> Result<Self> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            secret: generate_key_bytes()?.to_vec(),
        })
    }
}

// Manual Debug so key material never reaches log output.
impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecord")
            .field("id", &self.id)
            .field("secret", &"[redacted]")
            .finish()
    }
}
