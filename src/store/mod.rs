//! Key-store module — versioned, rotatable encrypted key storage.
//!
//! This module provides:
//! - The immutable `KeyRecord` type (`key`)
//! - The versioned Envelope/Bundle/Encrypted wire unions and CBOR codec (`format`)
//! - The high-level `KeyStore` for rotation, encryption, persistence, and merge (`store`)

pub mod format;
pub mod key;
pub mod store;

// Re-export the most commonly used items.
pub use format::{Bundle, BundleV0, Encrypted, EncryptedV0, Envelope, EnvelopeV0};
pub use key::KeyRecord;
pub use store::KeyStore;
