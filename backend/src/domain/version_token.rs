//! Version tokens: secret-keyed digests of user records.
//!
//! A token is recomputed from the record on every read and before every
//! conditional write; it is never stored. Two records with equal content
//! always produce the same token under the same secret, and any change to a
//! signed field produces a different one.
//!
//! Canonicalisation:
//!
//! 1. The record is rendered as a JSON object (password and extension
//!    attributes included).
//! 2. Object keys are sorted recursively; arrays keep their order.
//! 3. The result is serialised to compact JSON.
//! 4. BLAKE3 in keyed mode is computed over the UTF-8 bytes.

use std::fmt;

use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::domain::UserRecord;

/// Key-derivation context binding derived keys to this token scheme.
const TOKEN_KEY_CONTEXT: &str = "user-directory 2024-06 version token v1";

/// Opaque version token presented to and returned by clients.
///
/// # Examples
/// ```
/// use user_directory::domain::VersionToken;
///
/// let token = VersionToken::new("abc123");
/// assert_eq!(token.as_str(), "abc123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    /// Wrap a raw token string as received from a client.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the token text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Compare two tokens byte-for-byte in constant time.
    ///
    /// Only tokens in the issued form (64 lowercase hex digits) can be equal.
    pub fn same_as(&self, other: &Self) -> bool {
        match (issued_digest(self.as_str()), issued_digest(other.as_str())) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<VersionToken> for String {
    fn from(value: VersionToken) -> Self {
        value.0
    }
}

/// Computes and verifies version tokens under a shared secret.
///
/// # Examples
/// ```
/// use user_directory::domain::{Email, TokenSigner, UserRecord};
///
/// let signer = TokenSigner::derive_from(b"a sufficiently long shared secret");
/// let record = UserRecord::new(Email::new("a@b.com").unwrap(), "B", "A", "p");
/// let token = signer.compute_token(&record);
/// assert!(signer.matches(&record, &token));
/// ```
#[derive(Clone)]
pub struct TokenSigner {
    key: Zeroizing<[u8; 32]>,
}

impl TokenSigner {
    /// Derive a signing key from arbitrary secret material.
    pub fn derive_from(secret: &[u8]) -> Self {
        Self {
            key: Zeroizing::new(blake3::derive_key(TOKEN_KEY_CONTEXT, secret)),
        }
    }

    /// Compute the token for a record.
    pub fn compute_token(&self, record: &UserRecord) -> VersionToken {
        VersionToken(self.digest(record).to_hex().to_string())
    }

    /// Check a client-presented token against the record's current token.
    ///
    /// Only the exact issued text matches: uppercase or otherwise altered
    /// spellings of the same digest are rejected. Well-formed tokens are
    /// compared in constant time.
    pub fn matches(&self, record: &UserRecord, presented: &VersionToken) -> bool {
        issued_digest(presented.as_str()).is_some_and(|digest| digest == self.digest(record))
    }

    /// Raw key bytes, exposed for fingerprinting only.
    pub fn key_bytes(&self) -> &[u8] {
        self.key.as_slice()
    }

    fn digest(&self, record: &UserRecord) -> blake3::Hash {
        let canonical = canonicalize(&record.to_json());
        blake3::keyed_hash(&self.key, canonical.to_string().as_bytes())
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

/// Decode a token written exactly as `compute_token` renders it.
fn issued_digest(raw: &str) -> Option<blake3::Hash> {
    let issued_form = raw.len() == 2 * blake3::OUT_LEN
        && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if !issued_form {
        return None;
    }
    blake3::Hash::from_hex(raw).ok()
}

/// Recursively sort object keys for a canonical JSON representation.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| k.as_str());
            let canonical_map: Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(canonical_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
