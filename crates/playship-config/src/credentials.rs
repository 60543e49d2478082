//! Service account checks performed by the consumer of a resolved configuration.
//!
//! The configuration model stores whatever credentials path it was given;
//! existence and format are only checked here, right before the credentials
//! are needed.

use std::path::{Path, PathBuf};

use playship_types::ConfigError;

use crate::publisher::PublisherConfig;

/// A usable service account key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAccount {
    /// JSON key; carries its own client email
    Json { path: PathBuf },
    /// Legacy PKCS12 key with a separately configured email
    Pkcs12 { path: PathBuf, email: String },
}

impl ServiceAccount {
    /// Check the configured credentials and classify them.
    pub fn from_config(config: &PublisherConfig) -> Result<Self, ConfigError> {
        let path = config
            .service_account_credentials
            .clone()
            .ok_or_else(|| ConfigError::MissingCredentials(config.name.clone()))?;

        if !path.is_file() {
            return Err(ConfigError::CredentialsNotFound(path));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "json" => Ok(ServiceAccount::Json { path }),
            "p12" => match &config.service_account_email {
                Some(email) if !email.trim().is_empty() => Ok(ServiceAccount::Pkcs12 {
                    path,
                    email: email.clone(),
                }),
                _ => Err(ConfigError::MissingServiceAccountEmail(path)),
            },
            _ => Err(ConfigError::UnsupportedCredentials(path)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ServiceAccount::Json { path } | ServiceAccount::Pkcs12 { path, .. } => path,
        }
    }
}
