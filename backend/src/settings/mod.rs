//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USER_DIRECTORY_*` environment variables and
//! an optional configuration file. Accessors apply defaults and validate
//! shapes so `main` only deals with typed values.

mod secrets;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::SameSite;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

pub use secrets::{BuildMode, SecretError, Secrets, fingerprint};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_SECRET_FILE: &str = "/var/run/secrets/token_secret";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 5_000;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Errors raised while interpreting configuration values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A value is present but has the wrong shape.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// `SameSite=None` without `Secure` is rejected in release builds.
    #[error("same_site=None requires cookie_secure=true")]
    InsecureSameSiteNone,
    /// A secret could not be loaded.
    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Configuration values for the user directory service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_DIRECTORY")]
pub struct ServiceSettings {
    /// Listen address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// File holding the version token secret.
    pub token_secret_file: Option<PathBuf>,
    /// File holding the session cookie key.
    pub session_key_file: Option<PathBuf>,
    /// Generate secrets when the files are missing.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secrets: bool,
    /// Mark session cookies `Secure` (default `true`).
    pub cookie_secure: Option<bool>,
    /// Session cookie `SameSite` policy.
    pub same_site: Option<String>,
    /// Webhook receiving "user created" notifications.
    pub notification_webhook_url: Option<String>,
    /// Webhook request timeout in milliseconds.
    pub notification_timeout_ms: Option<u64>,
}

impl ServiceSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidValue {
            name: "bind_addr",
            value: raw.to_owned(),
            expected: "host:port",
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Whether session cookies carry `Secure`, defaulting to `true`.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    pub fn token_secret_file(&self) -> PathBuf {
        self.token_secret_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_SECRET_FILE))
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Cookie `SameSite` policy: `Lax` in debug builds and `Strict` in
    /// release builds unless configured.
    ///
    /// Invalid values fall back to the default with a warning in debug
    /// builds and are rejected in release builds.
    pub fn same_site(&self, mode: BuildMode) -> Result<SameSite, SettingsError> {
        let default = if mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(value) = self.same_site.as_deref() else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if self.cookie_secure() => Ok(SameSite::None),
            "none" if mode.is_debug() => {
                warn!("same_site=None without a secure cookie; browsers may reject it");
                Ok(SameSite::None)
            }
            "none" => Err(SettingsError::InsecureSameSiteNone),
            _ if mode.is_debug() => {
                warn!(value = %value, "invalid same_site, using default");
                Ok(default)
            }
            _ => Err(SettingsError::InvalidValue {
                name: "same_site",
                value: value.to_owned(),
                expected: SAMESITE_EXPECTED,
            }),
        }
    }

    /// Webhook URL for notifications, if configured.
    pub fn notification_webhook_url(&self) -> Result<Option<Url>, SettingsError> {
        let Some(raw) = self
            .notification_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        else {
            return Ok(None);
        };
        Url::parse(raw)
            .map(Some)
            .map_err(|_| SettingsError::InvalidValue {
                name: "notification_webhook_url",
                value: raw.to_owned(),
                expected: "absolute http(s) URL",
            })
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(
            self.notification_timeout_ms
                .unwrap_or(DEFAULT_NOTIFICATION_TIMEOUT_MS),
        )
    }

    /// Load the token secret and session key for `mode`.
    pub fn load_secrets(&self, mode: BuildMode) -> Result<Secrets, SettingsError> {
        Secrets::load(
            &self.token_secret_file(),
            &self.session_key_file(),
            mode,
            self.allow_ephemeral_secrets,
        )
        .map_err(SettingsError::from)
    }
}
