//! Raw, user-supplied settings.
//!
//! Nothing in this module applies defaults or validates values: a field is
//! `None` exactly when the user never set it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use playship_types::{ReleaseStatus, ResolutionStrategy};
use serde::{Deserialize, Serialize};

use crate::outputs::BuildOutput;

/// The serializable part of a configuration unit, exactly as written by the user.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Master on/off switch
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Service account key file (JSON, or legacy PKCS12)
    #[serde(default)]
    pub service_account_credentials: Option<PathBuf>,
    /// Service account email, only needed for PKCS12 keys
    #[serde(default)]
    pub service_account_email: Option<String>,
    /// Prefer app bundles over APKs
    #[serde(default)]
    pub default_to_app_bundles: Option<bool>,
    /// Commit the edit instead of leaving a draft
    #[serde(default)]
    pub commit: Option<bool>,
    /// Source track for promotion
    #[serde(default)]
    pub from_track: Option<String>,
    /// Destination track
    #[serde(default)]
    pub track: Option<String>,
    /// Staged rollout fraction in (0, 1]
    #[serde(default)]
    pub user_fraction: Option<f64>,
    /// Version-code conflict handling
    #[serde(default)]
    pub resolution_strategy: Option<ResolutionStrategy>,
    /// Status assigned to the release
    #[serde(default)]
    pub release_status: Option<ReleaseStatus>,
    /// Directory of prebuilt artifacts
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,
}

impl Settings {
    /// Merge with another settings value; fields set in `other` take precedence.
    pub fn merge(&self, other: &Settings) -> Settings {
        Settings {
            enabled: other.enabled.or(self.enabled),
            service_account_credentials: other
                .service_account_credentials
                .as_ref()
                .or(self.service_account_credentials.as_ref())
                .cloned(),
            service_account_email: other
                .service_account_email
                .as_ref()
                .or(self.service_account_email.as_ref())
                .cloned(),
            default_to_app_bundles: other.default_to_app_bundles.or(self.default_to_app_bundles),
            commit: other.commit.or(self.commit),
            from_track: other.from_track.as_ref().or(self.from_track.as_ref()).cloned(),
            track: other.track.as_ref().or(self.track.as_ref()).cloned(),
            user_fraction: other.user_fraction.or(self.user_fraction),
            resolution_strategy: other.resolution_strategy.or(self.resolution_strategy),
            release_status: other.release_status.or(self.release_status),
            artifact_dir: other.artifact_dir.as_ref().or(self.artifact_dir.as_ref()).cloned(),
        }
    }
}

/// Callback invoked on every build output after its version code was shifted.
///
/// Held only in process; it never appears in a serializable value.
#[derive(Clone)]
pub struct OutputProcessor(Arc<dyn Fn(&mut BuildOutput) + Send + Sync>);

impl OutputProcessor {
    pub fn new(f: impl Fn(&mut BuildOutput) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the callback on one output.
    pub fn call(&self, output: &mut BuildOutput) {
        (self.0)(output)
    }
}

impl fmt::Debug for OutputProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputProcessor(..)")
    }
}

/// Two handles are equal when they share the same callback.
impl PartialEq for OutputProcessor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Raw holder for one configuration unit: the serializable settings plus the
/// optional in-process output processor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    settings: Settings,
    output_processor: Option<OutputProcessor>,
}

impl SettingsStore {
    /// Create a store with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given settings and no output processor.
    pub(crate) fn from_settings(settings: Settings) -> Self {
        Self {
            settings,
            output_processor: None,
        }
    }

    /// Raw settings as supplied by the user.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Registered output processor, if any.
    pub fn output_processor(&self) -> Option<&OutputProcessor> {
        self.output_processor.as_ref()
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub(crate) fn set_output_processor(&mut self, processor: OutputProcessor) {
        self.output_processor = Some(processor);
    }

    /// Field-wise duplicate of the store, including the output processor.
    pub fn copy(&self) -> SettingsStore {
        self.clone()
    }

    /// Same as [`SettingsStore::copy`] with the output processor forced absent.
    pub fn copy_without_hook(&self) -> SettingsStore {
        Self::from_settings(self.settings.clone())
    }

    /// Merge with another store; set fields and the processor of `other` win.
    pub fn merge(&self, other: &SettingsStore) -> SettingsStore {
        SettingsStore {
            settings: self.settings.merge(&other.settings),
            output_processor: other
                .output_processor
                .as_ref()
                .or(self.output_processor.as_ref())
                .cloned(),
        }
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }
}
