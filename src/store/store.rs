//! High-level key-store operations.
//!
//! `KeyStore` orchestrates the canonical encoder, the derivation chain,
//! and the AEAD wrapper into the public create/rotate/encrypt/decrypt/
//! save/load/merge protocol.  A store owns an append-only, insertion-
//! ordered set of key records and a revision counter that advances on
//! every successful `save`.
//!
//! A store assumes single-writer access: `rotate`, `encrypt`, and `save`
//! are not synchronized internally, so concurrent mutation of one
//! instance must be ordered by the caller.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::canonical::{encode_canonical_sequence, Secret, Value};
use crate::crypto::encryption;
use crate::crypto::kdf::derive_master_key;
use crate::errors::{KeybundleError, Result};

use super::format::{self, Bundle, BundleV0, Encrypted, EncryptedV0, Envelope, EnvelopeV0};
use super::key::KeyRecord;

/// The main key-store handle.  Create one with `KeyStore::create` or
/// `KeyStore::load`, then use its methods to protect data.
pub struct KeyStore {
    /// Identity of the logical store; assigned once at creation and
    /// shared by every saved copy and branch.
    uid: String,

    /// Logical clock; strictly increases on every successful `save`.
    revision: u32,

    /// Key records in insertion order.  Append-only; the last record is
    /// the active key used for new encryptions.
    keys: Vec<KeyRecord>,

    /// Id -> position in `keys`.  Enforces id uniqueness and gives O(1)
    /// lookup for ciphertexts naming retired keys.
    index: HashMap<String, usize>,
}

impl KeyStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Initialize a brand-new store: fresh UUID, revision 0, one seed key.
    pub fn create() -> Result<Self> {
        let mut store = Self {
            uid: Uuid::new_v4().to_string(),
            revision: 0,
            keys: Vec::new(),
            index: HashMap::new(),
        };
        store.rotate()?;
        Ok(store)
    }

    /// Load a store from a saved envelope.
    ///
    /// Re-derives the bundle key from `secret` and `context` and verifies
    /// the envelope against its own revision.  A wrong secret, wrong
    /// context, and mismatched revision all surface as the same
    /// `AuthenticationFailed` — no hint is given about which factor was
    /// wrong.
    pub fn load(payload: &[u8], secret: &Secret, context: Option<&[Value]>) -> Result<Self> {
        let Envelope::V0(envelope) = Envelope::decode(payload)?;

        let master = derive_master_key(secret, context)?;
        let bundle_key = master.derive_bundle_key()?;

        let aad = encode_canonical_sequence(&[Value::Uint(envelope.revision)])?;
        let encoded_bundle = Zeroizing::new(encryption::decrypt(
            &bundle_key,
            &envelope.nonce,
            &envelope.ciphertext,
            Some(&aad),
        )?);

        let Bundle::V0(bundle) = Bundle::decode(&encoded_bundle)?;

        let mut store = Self {
            uid: bundle.uid,
            revision: envelope.revision,
            keys: Vec::with_capacity(bundle.keys.len()),
            index: HashMap::with_capacity(bundle.keys.len()),
        };
        for record in bundle.keys {
            store.insert_key(record)?;
        }
        Ok(store)
    }

    /// Safely merge two diverged copies of the same logical store.
    ///
    /// Keys are unioned by id with `first` winning on collision (pinned
    /// behavior; unreachable with random UUIDs), and the merged revision
    /// jumps past both inputs.  Merging never invalidates a ciphertext
    /// encrypted under any key that existed in either parent, because
    /// records are immutable and never removed.
    pub fn merge(first: &KeyStore, second: &KeyStore) -> Result<KeyStore> {
        if first.uid != second.uid {
            return Err(KeybundleError::IdentityMismatch);
        }

        let merged_revision = first
            .revision
            .max(second.revision)
            .checked_add(1)
            .ok_or_else(|| KeybundleError::EncodingFailed("revision counter overflow".into()))?;

        let mut merged = KeyStore {
            uid: first.uid.clone(),
            revision: merged_revision,
            keys: Vec::new(),
            index: HashMap::new(),
        };
        for record in first.keys.iter().chain(second.keys.iter()) {
            if !merged.index.contains_key(&record.id) {
                merged.insert_key(record.clone())?;
            }
        }
        Ok(merged)
    }

    // ------------------------------------------------------------------
    // Rotation
    // ------------------------------------------------------------------

    /// Add a fresh key record; it becomes the active key for new
    /// encryptions.  Existing records are retained so older ciphertexts
    /// stay decryptable — keys are added, never retired.
    pub fn rotate(&mut self) -> Result<()> {
        let record = KeyRecord::generate()?;
        self.insert_key(record)
    }

    // ------------------------------------------------------------------
    // Encrypt / decrypt
    // ------------------------------------------------------------------

    /// Encrypt any serializable payload under the active key.
    pub fn encrypt<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Vec<u8>> {
        let plaintext = Zeroizing::new(format::to_bytes(payload)?);
        self.encrypt_bytes(&plaintext, None)
    }

    /// Encrypt a payload, additionally binding serialized associated data
    /// into the authentication tag.  Decryption must present the same
    /// associated data.
    pub fn encrypt_with_aad<T, A>(&self, payload: &T, associated_data: &A) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        let plaintext = Zeroizing::new(format::to_bytes(payload)?);
        let aad = format::to_bytes(associated_data)?;
        self.encrypt_bytes(&plaintext, Some(&aad))
    }

    /// Decrypt a payload produced by `encrypt`, using whichever key the
    /// ciphertext names.
    pub fn decrypt<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T> {
        let plaintext = Zeroizing::new(self.decrypt_bytes(payload, None)?);
        format::from_bytes(&plaintext)
    }

    /// Decrypt a payload produced by `encrypt_with_aad`.
    pub fn decrypt_with_aad<T, A>(&self, payload: &[u8], associated_data: &A) -> Result<T>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let aad = format::to_bytes(associated_data)?;
        let plaintext = Zeroizing::new(self.decrypt_bytes(payload, Some(&aad))?);
        format::from_bytes(&plaintext)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Export the full store state as an opaque encrypted blob.
    ///
    /// The bundle key is chain-derived from `(secret, context)`, the next
    /// revision is bound into the ciphertext as canonical `[revision]`
    /// associated data, and the revision counter commits only once the
    /// complete envelope exists.
    pub fn save(&mut self, secret: &Secret, context: Option<&[Value]>) -> Result<Vec<u8>> {
        let master = derive_master_key(secret, context)?;
        let bundle_key = master.derive_bundle_key()?;

        let new_revision = self
            .revision
            .checked_add(1)
            .ok_or_else(|| KeybundleError::EncodingFailed("revision counter overflow".into()))?;
        let aad = encode_canonical_sequence(&[Value::Uint(new_revision)])?;

        let bundle = Bundle::V0(BundleV0 {
            uid: self.uid.clone(),
            keys: self.keys.clone(),
        });
        let encoded_bundle = Zeroizing::new(format::to_bytes(&bundle)?);
        let (nonce, ciphertext) = encryption::encrypt(&bundle_key, &encoded_bundle, Some(&aad))?;

        let envelope = Envelope::V0(EnvelopeV0 {
            revision: new_revision,
            nonce: nonce.to_vec(),
            ciphertext,
        });
        let payload = format::to_bytes(&envelope)?;

        self.revision = new_revision;
        Ok(payload)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the store's identity.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Returns the revision of the last save (0 for a never-saved store).
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Returns the number of keys held, including retired ones.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn insert_key(&mut self, record: KeyRecord) -> Result<()> {
        if self.index.contains_key(&record.id) {
            return Err(KeybundleError::DuplicateKey(record.id.clone()));
        }
        self.index.insert(record.id.clone(), self.keys.len());
        self.keys.push(record);
        Ok(())
    }

    fn active_key(&self) -> Result<&KeyRecord> {
        // Non-empty after create(); only a hand-crafted bundle can leave
        // a loaded store without keys.
        self.keys
            .last()
            .ok_or_else(|| KeybundleError::EncryptionFailed("key store holds no keys".into()))
    }

    fn key_by_id(&self, id: &str) -> Result<&KeyRecord> {
        self.index
            .get(id)
            .and_then(|&position| self.keys.get(position))
            .ok_or_else(|| KeybundleError::UnknownKey(id.to_string()))
    }

    fn encrypt_bytes(&self, plaintext: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>> {
        let key = self.active_key()?;
        let (nonce, ciphertext) = encryption::encrypt(&key.secret, plaintext, aad)?;

        format::to_bytes(&Encrypted::V0(EncryptedV0 {
            key_id: key.id.clone(),
            nonce: nonce.to_vec(),
            ciphertext,
        }))
    }

    fn decrypt_bytes(&self, payload: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>> {
        let Encrypted::V0(encrypted) = Encrypted::decode(payload)?;
        let key = self.key_by_id(&encrypted.key_id)?;
        encryption::decrypt(&key.secret, &encrypted.nonce, &encrypted.ciphertext, aad)
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("uid", &self.uid)
            .field("revision", &self.revision)
            .field("key_count", &self.keys.len())
            .finish()
    }
}
