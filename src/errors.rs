use thiserror::Error;

/// All errors that can occur in keybundle.
#[derive(Debug, Error)]
pub enum KeybundleError {
    // --- Canonical encoding errors ---
    #[error("Canonical encoding failed: {0}")]
    EncodingFailed(String),

    // --- Wire codec errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unrecognised {0} payload")]
    UnrecognisedFormat(&'static str),

    // --- Crypto errors ---
    //
    // Authentication failure is deliberately one undifferentiated error:
    // a wrong secret, a wrong context, wrong associated data, and tampered
    // ciphertext are indistinguishable to the caller.
    #[error("Authentication failed — wrong secret, context, or tampered data")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),

    // --- Key store errors ---
    #[error("Unknown key id '{0}'")]
    UnknownKey(String),

    #[error("Key id '{0}' already exists in the store")]
    DuplicateKey(String),

    #[error("Cannot merge key stores with different ids")]
    IdentityMismatch,
}

/// Convenience type alias for keybundle results.
pub type Result<T> = std::result::Result<T, KeybundleError>;
