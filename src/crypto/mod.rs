//! Cryptographic primitives for keybundle.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with associated data (`encryption`)
//! - PBKDF2 password-based master-key derivation bound to a context vector (`kdf`)
//! - The sequential HKDF derivation chain and zeroizing `MasterKey` (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_master_key, ...};
pub use encryption::{decrypt, encrypt, generate_key_bytes, generate_nonce};
pub use kdf::derive_master_key;
pub use keys::{derive_chain, MasterKey};
