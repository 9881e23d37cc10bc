//! Versioned wire formats and the CBOR codec.
//!
//! Envelope, Bundle, and Encrypted are each an externally-tagged union
//! with a single `v0` variant today.  A payload whose tag is not
//! recognized fails decoding outright — there is no default variant and
//! no fallback.  A future format revision adds a new variant, and old
//! readers keep detecting (and rejecting) data they cannot understand.
//!
//! On the wire each union is a one-entry CBOR map, e.g.
//! `{"v0": {"revision": 3, "nonce": h'...', "ciphertext": h'...'}}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::key::KeyRecord;
use crate::errors::{KeybundleError, Result};

// ---------------------------------------------------------------------------
// Wire unions
// ---------------------------------------------------------------------------

/// Persisted/exported form of a whole store: the encrypted bundle plus
/// the revision it was saved under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Envelope {
    #[serde(rename = "v0")]
    V0(EnvelopeV0),
}

/// Version-0 envelope payload.
///
/// The revision sits outside the encryption but is authenticated: it is
/// bound into the bundle ciphertext as canonical `[revision]` associated
/// data, so an envelope body cannot be spliced under another envelope's
/// revision header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeV0 {
    pub revision: u32,
    #[serde(with = "serde_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub ciphertext: Vec<u8>,
}

/// Plaintext internal state of a store; only ever exists decrypted in
/// memory.
#[derive(Clone, Serialize, Deserialize)]
pub enum Bundle {
    #[serde(rename = "v0")]
    V0(BundleV0),
}

/// Version-0 bundle payload: the store's identity and its full key list,
/// in insertion order.
#[derive(Clone, Serialize, Deserialize)]
pub struct BundleV0 {
    pub uid: String,
    pub keys: Vec<KeyRecord>,
}

/// Ciphertext produced by `KeyStore::encrypt` over user data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Encrypted {
    #[serde(rename = "v0")]
    V0(EncryptedV0),
}

/// Version-0 encrypted payload.  The id of the key used travels with the
/// ciphertext, which is what makes rotation transparent to readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedV0 {
    #[serde(rename = "keyId")]
    pub key_id: String,
    #[serde(with = "serde_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub ciphertext: Vec<u8>,
}

// ---------------------------------------------------------------------------
// CBOR codec
// ---------------------------------------------------------------------------

/// Encode any serializable value as CBOR bytes.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| KeybundleError::SerializationError(format!("{e}")))?;
    Ok(buf)
}

/// Decode CBOR bytes into any deserializable value.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| KeybundleError::SerializationError(format!("{e}")))
}

impl Envelope {
    /// Decode an envelope, rejecting anything without a known version tag.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|_| KeybundleError::UnrecognisedFormat("envelope"))
    }
}

impl Bundle {
    /// Decode a bundle, rejecting anything without a known version tag.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|_| KeybundleError::UnrecognisedFormat("bundle"))
    }
}

impl Encrypted {
    /// Decode an encrypted payload, rejecting anything without a known
    /// version tag.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|_| KeybundleError::UnrecognisedFormat("encrypted"))
    }
}
