//! Deterministic canonical byte encoding for associated data.
//!
//! The encoder maps a small closed value universe onto a tag-plus-payload
//! layout:
//!
//! ```text
//! null       [0x00]
//! boolean    [0x01][0x01 | 0x00]
//! uint32     [0x02][4 bytes LE]
//! bytes      [0x10][length: 4 bytes LE][raw bytes]
//! string     [0x11][length: 4 bytes LE][UTF-8 bytes]
//! sequence   [0x20][count: 4 bytes LE][encoded elements, in order]
//! ```
//!
//! The output is only ever used to build the associated-data bytes bound
//! into AEAD operations (the revision counter on save, the context vector
//! in the password KDF salt).  It is never used for general storage, so
//! no decoder exists.

use zeroize::{Zeroize, Zeroizing};

use crate::errors::{KeybundleError, Result};

const TAG_NULL: u8 = 0x00;
const TAG_BOOL: u8 = 0x01;
const TAG_UINT: u8 = 0x02;
const TAG_BYTES: u8 = 0x10;
const TAG_TEXT: u8 = 0x11;
const TAG_SEQUENCE: u8 = 0x20;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A canonically-encodable value.
///
/// This set is closed: anything outside it (floats, maps, signed or
/// oversized integers) has no canonical encoding.  The `TryFrom`
/// conversions below surface those rejections for callers holding wider
/// numeric types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Uint(u32),
    Bytes(Vec<u8>),
    Text(String),
    Sequence(Vec<Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl TryFrom<u64> for Value {
    type Error = KeybundleError;

    fn try_from(v: u64) -> Result<Self> {
        u32::try_from(v)
            .map(Value::Uint)
            .map_err(|_| not_a_uint32(v))
    }
}

impl TryFrom<i64> for Value {
    type Error = KeybundleError;

    fn try_from(v: i64) -> Result<Self> {
        u32::try_from(v)
            .map(Value::Uint)
            .map_err(|_| not_a_uint32(v))
    }
}

impl TryFrom<f64> for Value {
    type Error = KeybundleError;

    fn try_from(v: f64) -> Result<Self> {
        if v.fract() != 0.0 || v < 0.0 || v > f64::from(u32::MAX) {
            return Err(not_a_uint32(v));
        }
        Ok(Value::Uint(v as u32))
    }
}

fn not_a_uint32(v: impl std::fmt::Display) -> KeybundleError {
    KeybundleError::EncodingFailed(format!("{v} is not a 32-bit unsigned integer"))
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a single value into its canonical byte form.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf)?;
    Ok(buf)
}

/// Encode a slice of values as one canonical sequence.
///
/// Equivalent to `encode_canonical(&Value::Sequence(...))` without
/// cloning the elements.  Used for the context-vector salt and the
/// `[revision]` associated data.
pub fn encode_canonical_sequence(items: &[Value]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_sequence(items, &mut buf)?;
    Ok(buf)
}

fn encode_into(value: &Value, buf: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Null => buf.push(TAG_NULL),
        Value::Bool(b) => {
            buf.push(TAG_BOOL);
            buf.push(u8::from(*b));
        }
        Value::Uint(n) => {
            buf.push(TAG_UINT);
            buf.extend_from_slice(&n.to_le_bytes());
        }
        Value::Bytes(bytes) => encode_bytes(bytes, buf)?,
        Value::Text(text) => encode_text(text, buf)?,
        Value::Sequence(items) => encode_sequence(items, buf)?,
    }
    Ok(())
}

fn encode_bytes(bytes: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    let len = length_prefix(bytes.len(), "byte sequence")?;
    buf.push(TAG_BYTES);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn encode_text(text: &str, buf: &mut Vec<u8>) -> Result<()> {
    let encoded = text.as_bytes();
    let len = length_prefix(encoded.len(), "string")?;
    buf.push(TAG_TEXT);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(encoded);
    Ok(())
}

fn encode_sequence(items: &[Value], buf: &mut Vec<u8>) -> Result<()> {
    let count = length_prefix(items.len(), "sequence")?;
    buf.push(TAG_SEQUENCE);
    buf.extend_from_slice(&count.to_le_bytes());
    for item in items {
        encode_into(item, buf)?;
    }
    Ok(())
}

fn length_prefix(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        KeybundleError::EncodingFailed(format!("{what} length exceeds the 32-bit integer limit"))
    })
}

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A caller-supplied secret used to derive the master key.
///
/// Either a human-memorable passphrase or raw key bytes.  The two forms
/// encode differently (string tag vs byte-sequence tag), so a passphrase
/// and its UTF-8 bytes derive unrelated master keys.  Memory is zeroed on
/// drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub enum Secret {
    Text(String),
    Bytes(Vec<u8>),
}

impl Secret {
    /// Canonical encoding of the secret, in a buffer that zeroes itself.
    pub(crate) fn to_canonical(&self) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(Vec::new());
        match self {
            Secret::Text(text) => encode_text(text, &mut buf)?,
            Secret::Bytes(bytes) => encode_bytes(bytes, &mut buf)?,
        }
        Ok(buf)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Text(_) => f.write_str("Secret::Text(..)"),
            Secret::Bytes(_) => f.write_str("Secret::Bytes(..)"),
        }
    }
}

impl From<&str> for Secret {
    fn from(v: &str) -> Self {
        Secret::Text(v.to_string())
    }
}

impl From<String> for Secret {
    fn from(v: String) -> Self {
        Secret::Text(v)
    }
}

impl From<Vec<u8>> for Secret {
    fn from(v: Vec<u8>) -> Self {
        Secret::Bytes(v)
    }
}

impl From<&[u8]> for Secret {
    fn from(v: &[u8]) -> Self {
        Secret::Bytes(v.to_vec())
    }
}
