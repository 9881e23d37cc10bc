//! keybundle — an embeddable, versioned, rotatable encrypted key-store.
//!
//! A `KeyStore` derives a master secret from a low-entropy password plus
//! contextual binding data, protects an internal set of symmetric keys,
//! and encrypts/decrypts arbitrary serializable data under the newest key
//! while remaining able to decrypt data produced by retired keys.  The
//! whole store exports as an opaque encrypted blob, and two diverged
//! copies of the same logical store merge without conflicts.

pub mod canonical;
pub mod crypto;
pub mod errors;
pub mod store;

// Re-export the public surface so callers can write:
//   use keybundle::{KeyStore, Secret, Value};
pub use canonical::{encode_canonical, encode_canonical_sequence, Secret, Value};
pub use errors::{KeybundleError, Result};
pub use store::KeyStore;
