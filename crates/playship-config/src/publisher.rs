//! The user-facing publishing configuration.
//!
//! [`PlayPublisher`] wraps a [`SettingsStore`]. Setters validate and write raw
//! values; getters resolve defaults at read time so an unset field is always
//! distinguishable from one explicitly set to its default.

use std::fmt;
use std::path::{Path, PathBuf};

use playship_types::{ConfigError, PublishedName, ReleaseStatus, ResolutionStrategy};
use serde::{Deserialize, Serialize};

use crate::outputs::BuildOutput;
use crate::settings::{OutputProcessor, Settings, SettingsStore};

/// Track used when none is configured.
pub const DEFAULT_TRACK: &str = "internal";

/// Rollout fraction used when none is configured.
pub const DEFAULT_USER_FRACTION: f64 = 0.1;

fn resolve_enabled(settings: &Settings) -> bool {
    settings.enabled.unwrap_or(true)
}

fn resolve_default_to_app_bundles(settings: &Settings) -> bool {
    settings.default_to_app_bundles.unwrap_or(false)
}

fn resolve_commit(settings: &Settings) -> bool {
    settings.commit.unwrap_or(true)
}

fn resolve_track(settings: &Settings) -> &str {
    settings.track.as_deref().unwrap_or(DEFAULT_TRACK)
}

// Promotion defaults to the configured destination track.
fn resolve_from_track(settings: &Settings) -> &str {
    settings
        .from_track
        .as_deref()
        .unwrap_or_else(|| resolve_track(settings))
}

fn resolve_user_fraction(settings: &Settings) -> f64 {
    settings.user_fraction.unwrap_or(DEFAULT_USER_FRACTION)
}

fn resolve_resolution_strategy(settings: &Settings) -> ResolutionStrategy {
    settings.resolution_strategy.unwrap_or_default()
}

fn resolve_release_status(settings: &Settings) -> ReleaseStatus {
    settings.release_status.unwrap_or_default()
}

/// Check that a rollout fraction lies in (0, 1].
pub fn validate_user_fraction(fraction: f64) -> Result<f64, ConfigError> {
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(fraction)
    } else {
        Err(ConfigError::UserFractionOutOfRange(fraction))
    }
}

/// A named, mutable publishing configuration unit (e.g. one per build variant).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayPublisher {
    name: String,
    store: SettingsStore,
}

impl PlayPublisher {
    /// Create a configuration unit with every field unset.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_store(name, SettingsStore::new())
    }

    /// Build a unit from raw settings, applying the same checks as the setters.
    pub fn from_settings(name: impl Into<String>, settings: Settings) -> Result<Self, ConfigError> {
        if let Some(fraction) = settings.user_fraction {
            validate_user_fraction(fraction)?;
        }
        Ok(Self::from_store(name, SettingsStore::from_settings(settings)))
    }

    pub(crate) fn from_store(name: impl Into<String>, store: SettingsStore) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    /// Identifying name; never used for defaulting.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        resolve_enabled(self.store.settings())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.store.settings_mut().enabled = Some(enabled);
    }

    /// Credentials file; existence is checked by the consumer, not here.
    pub fn service_account_credentials(&self) -> Option<&Path> {
        self.store.settings().service_account_credentials.as_deref()
    }

    pub fn set_service_account_credentials(&mut self, path: impl Into<PathBuf>) {
        self.store.settings_mut().service_account_credentials = Some(path.into());
    }

    pub fn service_account_email(&self) -> Option<&str> {
        self.store.settings().service_account_email.as_deref()
    }

    pub fn set_service_account_email(&mut self, email: impl Into<String>) {
        self.store.settings_mut().service_account_email = Some(email.into());
    }

    pub fn default_to_app_bundles(&self) -> bool {
        resolve_default_to_app_bundles(self.store.settings())
    }

    pub fn set_default_to_app_bundles(&mut self, default_to_app_bundles: bool) {
        self.store.settings_mut().default_to_app_bundles = Some(default_to_app_bundles);
    }

    pub fn commit(&self) -> bool {
        resolve_commit(self.store.settings())
    }

    pub fn set_commit(&mut self, commit: bool) {
        self.store.settings_mut().commit = Some(commit);
    }

    pub fn track(&self) -> &str {
        resolve_track(self.store.settings())
    }

    pub fn set_track(&mut self, track: impl Into<String>) {
        self.store.settings_mut().track = Some(track.into());
    }

    /// Promotion source; falls back to the resolved [`PlayPublisher::track`].
    pub fn from_track(&self) -> &str {
        resolve_from_track(self.store.settings())
    }

    pub fn set_from_track(&mut self, from_track: impl Into<String>) {
        self.store.settings_mut().from_track = Some(from_track.into());
    }

    pub fn user_fraction(&self) -> f64 {
        resolve_user_fraction(self.store.settings())
    }

    /// Set the staged rollout fraction. Values outside (0, 1] are rejected
    /// and leave the previous value in place.
    pub fn set_user_fraction(&mut self, fraction: f64) -> Result<(), ConfigError> {
        let fraction = validate_user_fraction(fraction)?;
        self.store.settings_mut().user_fraction = Some(fraction);
        Ok(())
    }

    pub fn resolution_strategy(&self) -> ResolutionStrategy {
        resolve_resolution_strategy(self.store.settings())
    }

    /// Set the strategy by published name (`auto`, `fail` or `ignore`).
    pub fn set_resolution_strategy(&mut self, name: &str) -> Result<(), ConfigError> {
        let strategy = ResolutionStrategy::from_published_name(name)?;
        self.store.settings_mut().resolution_strategy = Some(strategy);
        Ok(())
    }

    pub fn release_status(&self) -> ReleaseStatus {
        resolve_release_status(self.store.settings())
    }

    /// Set the status by published name (`completed`, `draft`, `halted` or
    /// `inProgress`).
    pub fn set_release_status(&mut self, name: &str) -> Result<(), ConfigError> {
        let status = ReleaseStatus::from_published_name(name)?;
        self.store.settings_mut().release_status = Some(status);
        Ok(())
    }

    /// Prebuilt artifact directory; `None` means build on demand.
    pub fn artifact_dir(&self) -> Option<&Path> {
        self.store.settings().artifact_dir.as_deref()
    }

    pub fn set_artifact_dir(&mut self, dir: impl Into<PathBuf>) {
        self.store.settings_mut().artifact_dir = Some(dir.into());
    }

    /// Register the per-output callback, replacing any previous one.
    pub fn output_processor(&mut self, f: impl Fn(&mut BuildOutput) + Send + Sync + 'static) {
        self.store.set_output_processor(OutputProcessor::new(f));
    }

    /// Copy of the raw store, output processor included.
    pub fn settings_store(&self) -> SettingsStore {
        self.store.copy()
    }

    /// Copy of the raw, serializable settings.
    pub fn settings(&self) -> Settings {
        self.store.copy_without_hook().into_settings()
    }

    /// Resolved, serializable configuration. Never carries the output processor.
    pub fn config(&self) -> PublisherConfig {
        let settings = self.store.settings();
        PublisherConfig {
            name: self.name.clone(),
            enabled: resolve_enabled(settings),
            service_account_credentials: settings.service_account_credentials.clone(),
            service_account_email: settings.service_account_email.clone(),
            default_to_app_bundles: resolve_default_to_app_bundles(settings),
            commit: resolve_commit(settings),
            from_track: resolve_from_track(settings).to_string(),
            track: resolve_track(settings).to_string(),
            user_fraction: resolve_user_fraction(settings),
            resolution_strategy: resolve_resolution_strategy(settings),
            release_status: resolve_release_status(settings),
            artifact_dir: settings.artifact_dir.clone(),
        }
    }

    /// Resolved configuration plus the output processor, for in-process use.
    pub fn snapshot(&self) -> PublisherSnapshot {
        PublisherSnapshot {
            config: self.config(),
            output_processor: self.store.output_processor().cloned(),
        }
    }
}

impl fmt::Display for PlayPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Where the packaging pipeline gets artifacts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Upload artifacts already present in this directory
    Prebuilt(PathBuf),
    /// Build the artifacts as part of publishing
    BuildOnDemand,
}

/// Resolved configuration safe to cache, persist or send across processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Configuration unit name
    pub name: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_credentials: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_email: Option<String>,
    pub default_to_app_bundles: bool,
    pub commit: bool,
    pub from_track: String,
    pub track: String,
    pub user_fraction: f64,
    pub resolution_strategy: ResolutionStrategy,
    pub release_status: ReleaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<PathBuf>,
}

impl PublisherConfig {
    pub fn artifact_source(&self) -> ArtifactSource {
        match &self.artifact_dir {
            Some(dir) => ArtifactSource::Prebuilt(dir.clone()),
            None => ArtifactSource::BuildOnDemand,
        }
    }

    /// Whether version codes should be shifted above the track's highest one.
    pub fn auto_resolves_conflicts(&self) -> bool {
        self.resolution_strategy == ResolutionStrategy::Auto
    }
}

/// Resolved configuration together with the output processor.
#[derive(Debug, Clone, PartialEq)]
pub struct PublisherSnapshot {
    config: PublisherConfig,
    output_processor: Option<OutputProcessor>,
}

impl PublisherSnapshot {
    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn output_processor(&self) -> Option<&OutputProcessor> {
        self.output_processor.as_ref()
    }

    /// Drop the output processor, keeping only the serializable part.
    pub fn into_config(self) -> PublisherConfig {
        self.config
    }
}
