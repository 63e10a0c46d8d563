use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration and credentials.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("failed to read secrets file {path}: {source}")]
    SecretsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid secrets file {path}: {source}")]
    SecretsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
