use std::path::PathBuf;

use playship_types::ConfigError;

use crate::publisher::PlayPublisher;

/// Command-line overrides applied over a resolved configuration.
///
/// `None` means "user did not pass this flag". Enumerations are kept as the
/// raw strings the user typed so they go through the same validation as any
/// other write.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayOverrides {
    pub enabled: Option<bool>,
    pub service_account_credentials: Option<PathBuf>,
    pub service_account_email: Option<String>,
    pub default_to_app_bundles: Option<bool>,
    pub commit: Option<bool>,
    pub from_track: Option<String>,
    pub track: Option<String>,
    pub user_fraction: Option<f64>,
    pub resolution_strategy: Option<String>,
    pub release_status: Option<String>,
    pub artifact_dir: Option<PathBuf>,
}

impl PlayOverrides {
    /// Apply every override. Either all of them land or, on the first
    /// rejected value, none do.
    pub fn apply(self, publisher: &mut PlayPublisher) -> Result<(), ConfigError> {
        let mut next = publisher.clone();

        if let Some(enabled) = self.enabled {
            next.set_enabled(enabled);
        }
        if let Some(path) = self.service_account_credentials {
            next.set_service_account_credentials(path);
        }
        if let Some(email) = self.service_account_email {
            next.set_service_account_email(email);
        }
        if let Some(bundles) = self.default_to_app_bundles {
            next.set_default_to_app_bundles(bundles);
        }
        if let Some(commit) = self.commit {
            next.set_commit(commit);
        }
        if let Some(track) = self.track {
            next.set_track(track);
        }
        if let Some(from_track) = self.from_track {
            next.set_from_track(from_track);
        }
        if let Some(fraction) = self.user_fraction {
            next.set_user_fraction(fraction)?;
        }
        if let Some(strategy) = self.resolution_strategy {
            next.set_resolution_strategy(&strategy)?;
        }
        if let Some(status) = self.release_status {
            next.set_release_status(&status)?;
        }
        if let Some(dir) = self.artifact_dir {
            next.set_artifact_dir(dir);
        }

        *publisher = next;
        Ok(())
    }
}
