//! Secret loading for the token signer and the session cookie key.
//!
//! Secret files are read into zeroizing buffers. Release builds enforce
//! minimum lengths and refuse ephemeral secrets; debug builds fall back to
//! random secrets with a warning when a file cannot be read.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::TokenSigner;

/// Release-build minimum for the token secret.
pub const TOKEN_SECRET_MIN_LEN: usize = 32;
/// Release-build minimum for the session key.
pub const SESSION_KEY_MIN_LEN: usize = 64;
/// `Key::derive_from` rejects shorter input in every build mode.
const SESSION_KEY_FLOOR: usize = 32;
/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing secrets and warn.
    Debug,
    /// Release builds require real secrets of adequate length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use user_directory::settings::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub(crate) fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while loading secrets.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Reading a secret file failed.
    #[error("failed to read {label} at {path}: {source}")]
    Read {
        label: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A secret file is shorter than required.
    #[error("{label} at {path} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        label: &'static str,
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not run with generated secrets.
    #[error("allow_ephemeral_secrets must be false in release builds")]
    EphemeralNotAllowed,
}

/// Length rules for one secret.
#[derive(Clone, Copy, Debug)]
struct SecretPolicy {
    label: &'static str,
    release_min: usize,
    floor: usize,
    generated_len: usize,
}

const TOKEN_SECRET: SecretPolicy = SecretPolicy {
    label: "token secret",
    release_min: TOKEN_SECRET_MIN_LEN,
    floor: 1,
    generated_len: TOKEN_SECRET_MIN_LEN,
};

const SESSION_KEY: SecretPolicy = SecretPolicy {
    label: "session key",
    release_min: SESSION_KEY_MIN_LEN,
    floor: SESSION_KEY_FLOOR,
    generated_len: SESSION_KEY_MIN_LEN,
};

/// Key material derived from the configured secrets.
pub struct Secrets {
    /// Version token signer.
    pub signer: TokenSigner,
    /// Session cookie key.
    pub session_key: Key,
}

impl Secrets {
    /// Load both secrets, deriving the signer and cookie key.
    pub fn load(
        token_secret_file: &Path,
        session_key_file: &Path,
        mode: BuildMode,
        allow_ephemeral: bool,
    ) -> Result<Self, SecretError> {
        if allow_ephemeral && !mode.is_debug() {
            return Err(SecretError::EphemeralNotAllowed);
        }
        let token_secret = load_secret(token_secret_file, TOKEN_SECRET, mode, allow_ephemeral)?;
        let session_secret = load_secret(session_key_file, SESSION_KEY, mode, allow_ephemeral)?;
        Ok(Self {
            signer: TokenSigner::derive_from(&token_secret),
            session_key: Key::derive_from(&session_secret),
        })
    }

    /// Fingerprint of the token signing key.
    pub fn token_fingerprint(&self) -> String {
        fingerprint(self.signer.key_bytes())
    }

    /// Fingerprint of the session signing key.
    pub fn session_fingerprint(&self) -> String {
        fingerprint(self.session_key.signing())
    }
}

fn load_secret(
    path: &Path,
    policy: SecretPolicy,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, SecretError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let min_len = if mode.is_debug() {
                policy.floor
            } else {
                policy.release_min
            };
            if bytes.len() < min_len {
                return Err(SecretError::TooShort {
                    label: policy.label,
                    path: path.to_path_buf(),
                    length: bytes.len(),
                    min_len,
                });
            }
            Ok(bytes)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                secret = policy.label,
                "using temporary secret (dev only)"
            );
            Ok(ephemeral_secret(policy.generated_len))
        }
        Err(source) => Err(SecretError::Read {
            label: policy.label,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn ephemeral_secret(len: usize) -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0_u8; len]);
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Truncated SHA-256 fingerprint of key material.
///
/// Returns the first 8 bytes of the digest as lowercase hex, enough to tell
/// keys apart in logs without exposing them.
///
/// # Examples
///
/// ```rust
/// use user_directory::settings::fingerprint;
///
/// let fp = fingerprint(b"key material");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn fingerprint(material: &[u8]) -> String {
    let digest = Sha256::digest(material);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
