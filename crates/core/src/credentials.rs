//! Credential loading.
//!
//! The API key and service URL come from a TOML secrets file shaped like
//!
//! ```toml
//! [api]
//! PREDICTIONGUARD_API_KEY = "..."
//! PREDICTIONGUARD_URL = "https://..."   # optional
//! ```
//!
//! Environment variables with the same names take precedence. A missing key
//! is fatal at startup.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::constants::DEFAULT_BASE_URL;
use crate::error::{CoreError, Result};

pub const API_KEY_VAR: &str = "PREDICTIONGUARD_API_KEY";
pub const BASE_URL_VAR: &str = "PREDICTIONGUARD_URL";

#[derive(Deserialize, Default)]
struct SecretsFile {
    #[serde(default)]
    api: ApiSection,
}

#[derive(Deserialize, Default)]
struct ApiSection {
    #[serde(rename = "PREDICTIONGUARD_API_KEY")]
    api_key: Option<String>,
    #[serde(rename = "PREDICTIONGUARD_URL")]
    base_url: Option<String>,
}

#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    base_url: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url }
    }

    /// Loads credentials from the process environment and `secrets_path`.
    ///
    /// # Errors
    /// Fails when the secrets file exists but is unreadable or malformed, or
    /// when no API key is found anywhere.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        Self::resolve(|var| std::env::var(var).ok(), secrets_path)
    }

    /// Like [`Credentials::load`] with an injectable variable lookup.
    ///
    /// # Errors
    /// See [`Credentials::load`].
    pub fn resolve<F>(lookup: F, secrets_path: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets = read_secrets(secrets_path)?;

        let api_key = non_empty(lookup(API_KEY_VAR))
            .or_else(|| non_empty(secrets.api.api_key))
            .ok_or(CoreError::MissingCredential(API_KEY_VAR))?;
        let base_url = non_empty(lookup(BASE_URL_VAR))
            .or_else(|| non_empty(secrets.api.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        tracing::debug!(base_url = %base_url, "credentials resolved");
        Ok(Self { api_key, base_url })
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn read_secrets(path: &Path) -> Result<SecretsFile> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no secrets file, using environment only");
            return Ok(SecretsFile::default());
        },
        Err(source) => return Err(CoreError::SecretsRead { path: path.to_path_buf(), source }),
    };
    toml::from_str(&raw).map_err(|source| CoreError::SecretsParse { path: path.to_path_buf(), source })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}
