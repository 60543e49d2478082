//! Core domain types for playship.
//!
//! This crate provides the closed enumerations accepted by the publishing
//! configuration, the bidirectional mapping between each variant and its
//! published name, and the error type raised when configuration is rejected.
//!
//! # Example
//!
//! ```
//! use playship_types::{PublishedName, ReleaseStatus, ResolutionStrategy};
//!
//! let status = ReleaseStatus::from_published_name("inProgress").expect("known name");
//! assert_eq!(status, ReleaseStatus::InProgress);
//! assert_eq!(status.published_name(), "inProgress");
//!
//! let err = ResolutionStrategy::from_published_name("bogus").unwrap_err();
//! assert!(err.to_string().contains("auto, fail, ignore"));
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors raised while writing or consuming publishing configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A string did not match any published name of a closed enumeration.
    #[error("invalid {field} `{value}`, expected one of: {}", .allowed.join(", "))]
    InvalidEnumValue {
        /// Configuration property being written
        field: &'static str,
        /// Rejected input
        value: String,
        /// Every accepted published name, in declaration order
        allowed: Vec<&'static str>,
    },
    /// The staged rollout fraction was outside (0, 1].
    #[error("user_fraction must be greater than 0 and at most 1, got {0}")]
    UserFractionOutOfRange(f64),
    /// No credentials file was configured.
    #[error("no service account credentials configured for `{0}`")]
    MissingCredentials(String),
    /// The configured credentials file does not exist.
    #[error("service account credentials file does not exist: {}", .0.display())]
    CredentialsNotFound(PathBuf),
    /// Legacy PKCS12 keys need the service account email alongside them.
    #[error("PKCS12 credentials {} require service_account_email to be set", .0.display())]
    MissingServiceAccountEmail(PathBuf),
    /// The credentials file is neither a JSON nor a PKCS12 key.
    #[error("unsupported service account credentials format: {} (expected .json or .p12)", .0.display())]
    UnsupportedCredentials(PathBuf),
    /// Shifting version codes above `max_known` left the `i64` range.
    #[error("cannot shift version codes starting at {smallest} above {max_known}: out of range")]
    VersionCodeOverflow { smallest: i64, max_known: i64 },
}

/// A closed enumeration addressable by its published, case-sensitive name.
///
/// `published_name` is the single source of truth; lookup by name and the list
/// of accepted names are both derived from it through [`PublishedName::ALL`].
pub trait PublishedName: Copy + PartialEq + 'static {
    /// Configuration property this enumeration is written through.
    const FIELD: &'static str;

    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// The name users write in configuration.
    fn published_name(self) -> &'static str;

    /// Look up a variant by its exact published name.
    fn from_published_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.published_name() == name)
            .ok_or_else(|| ConfigError::InvalidEnumValue {
                field: Self::FIELD,
                value: name.to_string(),
                allowed: Self::published_names(),
            })
    }

    /// All accepted published names.
    fn published_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|variant| variant.published_name()).collect()
    }
}

/// Strategy for version-code collisions with releases already on the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionStrategy {
    /// Shift version codes above the highest one already published
    Auto,
    /// Fail the build on a collision
    #[default]
    Fail,
    /// Skip the conflicting upload
    Ignore,
}

impl PublishedName for ResolutionStrategy {
    const FIELD: &'static str = "resolution_strategy";
    const ALL: &'static [Self] = &[Self::Auto, Self::Fail, Self::Ignore];

    fn published_name(self) -> &'static str {
        match self {
            ResolutionStrategy::Auto => "auto",
            ResolutionStrategy::Fail => "fail",
            ResolutionStrategy::Ignore => "ignore",
        }
    }
}

/// Lifecycle state assigned to an uploaded release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseStatus {
    /// Rolled out to every user of the track
    #[default]
    Completed,
    /// Uploaded but not rolled out
    Draft,
    /// Staged rollout paused
    Halted,
    /// Staged rollout to a fraction of users
    InProgress,
}

impl ReleaseStatus {
    /// Whether the rollout fraction applies to releases with this status.
    pub fn is_staged(self) -> bool {
        matches!(self, ReleaseStatus::InProgress | ReleaseStatus::Halted)
    }
}

impl PublishedName for ReleaseStatus {
    const FIELD: &'static str = "release_status";
    const ALL: &'static [Self] = &[
        Self::Completed,
        Self::Draft,
        Self::Halted,
        Self::InProgress,
    ];

    fn published_name(self) -> &'static str {
        match self {
            ReleaseStatus::Completed => "completed",
            ReleaseStatus::Draft => "draft",
            ReleaseStatus::Halted => "halted",
            ReleaseStatus::InProgress => "inProgress",
        }
    }
}

impl std::fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.published_name())
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.published_name())
    }
}

impl std::str::FromStr for ResolutionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_published_name(s)
    }
}

impl std::str::FromStr for ReleaseStatus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_published_name(s)
    }
}
