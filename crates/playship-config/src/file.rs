//! Configuration file support (`.playship.toml`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::configs::{PlayConfigs, ROOT_NAME};
use crate::publisher::{PlayPublisher, validate_user_fraction};
use crate::settings::Settings;

/// Default configuration file name
pub const CONFIG_FILE: &str = ".playship.toml";

/// Get the config file path for a directory
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Find the configuration file by walking up the directory tree
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(config_path)
        .find(|candidate| candidate.exists())
}

// Relative paths in a config file are relative to the file, not to the
// process working directory.
fn resolve_relative_paths(settings: &mut Settings, base: &Path) {
    let paths = [
        &mut settings.service_account_credentials,
        &mut settings.artifact_dir,
    ];
    for path in paths.into_iter().flatten() {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}

/// Contents of a `.playship.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Settings shared by every variant
    #[serde(default)]
    pub play: Settings,
    /// Per-variant settings, layered over `play`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, Settings>,
}

impl ConfigFile {
    /// Load `.playship.toml` from a directory; a missing file yields defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = config_path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            resolve_relative_paths(&mut config.play, base);
            for settings in config.variants.values_mut() {
                resolve_relative_paths(settings, base);
            }
        }

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;

        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate values that the file format alone cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(fraction) = self.play.user_fraction {
            validate_user_fraction(fraction).context("invalid [play] section")?;
        }

        for (name, settings) in &self.variants {
            if name.is_empty() {
                anyhow::bail!("variant names cannot be empty");
            }
            if name == ROOT_NAME {
                anyhow::bail!(
                    "[variants.{ROOT_NAME}] is not allowed, put shared settings in [{ROOT_NAME}]"
                );
            }
            if let Some(fraction) = settings.user_fraction {
                validate_user_fraction(fraction)
                    .with_context(|| format!("invalid [variants.{name}] section"))?;
            }
        }

        Ok(())
    }

    /// Validate and turn the file into named configuration units
    pub fn into_configs(self) -> Result<PlayConfigs> {
        self.validate()?;

        let root = PlayPublisher::from_settings(ROOT_NAME, self.play)
            .with_context(|| format!("invalid [{ROOT_NAME}] section"))?;
        let variants: BTreeMap<String, PlayPublisher> = self
            .variants
            .into_iter()
            .map(|(name, settings)| {
                let publisher = PlayPublisher::from_settings(name.clone(), settings)
                    .with_context(|| format!("invalid [variants.{name}] section"))?;
                Ok((name, publisher))
            })
            .collect::<Result<_>>()?;

        Ok(PlayConfigs::from_parts(root, variants))
    }

    /// Generate a default configuration file content as TOML string
    pub fn default_toml_template() -> String {
        r#"# playship configuration file
# Place this file in your project root as .playship.toml

[play]
# Master switch for publishing (default: true)
# enabled = true
# Service account key: a .json key, or a legacy .p12 key plus service_account_email
# service_account_credentials = "play-credentials.json"
# service_account_email = "publisher@project.iam.gserviceaccount.com"
# Upload app bundles instead of APKs (default: false)
# default_to_app_bundles = false
# Commit the edit; false leaves a draft edit (default: true)
# commit = true
# Destination track: internal, alpha, beta, production or a custom track
track = "internal"
# Promotion source track (default: same as track)
# from_track = "internal"
# Staged rollout fraction, greater than 0 and at most 1 (default: 0.1)
# user_fraction = 0.1
# Version code conflicts: auto, fail or ignore
resolution_strategy = "fail"
# Release status: completed, draft, halted or inProgress
release_status = "completed"
# Directory of prebuilt artifacts; unset means build on demand
# artifact_dir = "build/outputs"

# Per-variant settings override [play] field by field
# [variants.release]
# track = "production"
# release_status = "inProgress"
# user_fraction = 0.25
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playship_types::{ReleaseStatus, ResolutionStrategy};
    use tempfile::tempdir;

    #[test]
    fn load_missing_config_returns_default() {
        let td = tempdir().expect("tempdir");
        let config = ConfigFile::load_from_dir(td.path()).expect("load");
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn load_config_from_toml() {
        let td = tempdir().expect("tempdir");
        let content = r#"
[play]
service_account_credentials = "keys/play.json"
track = "beta"
resolution_strategy = "auto"
default_to_app_bundles = true

[variants.release]
track = "production"
release_status = "inProgress"
user_fraction = 0.25

[variants.internal]
commit = false
"#;
        std::fs::write(config_path(td.path()), content).expect("write");

        let file = ConfigFile::load_from_dir(td.path()).expect("load");
        assert_eq!(file.play.track.as_deref(), Some("beta"));
        assert_eq!(file.play.resolution_strategy, Some(ResolutionStrategy::Auto));
        assert_eq!(file.variants.len(), 2);

        let configs = file.into_configs().expect("configs");
        let release = configs.resolve("release");
        assert_eq!(release.track(), "production");
        assert_eq!(release.release_status(), ReleaseStatus::InProgress);
        assert_eq!(release.user_fraction(), 0.25);
        assert_eq!(release.resolution_strategy(), ResolutionStrategy::Auto);
        assert!(release.default_to_app_bundles());

        let internal = configs.resolve("internal");
        assert_eq!(internal.track(), "beta");
        assert!(!internal.commit());
    }

    #[test]
    fn unknown_enum_name_lists_valid_values() {
        let err = toml::from_str::<ConfigFile>("[play]\nrelease_status = \"InProgress\"\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("InProgress"), "{err}");
        assert!(err.contains("inProgress"), "{err}");
        assert!(err.contains("completed"), "{err}");
    }

    #[test]
    fn out_of_range_fraction_is_rejected() {
        let file: ConfigFile = toml::from_str("[variants.release]\nuser_fraction = 1.5\n").unwrap();
        let err = file.into_configs().unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("[variants.release]"), "{message}");
        assert!(message.contains("1.5"), "{message}");
    }

    #[test]
    fn root_name_cannot_be_a_variant() {
        let file: ConfigFile = toml::from_str("[variants.play]\ntrack = \"production\"\n").unwrap();
        let err = file.into_configs().unwrap_err().to_string();
        assert!(err.contains("[variants.play] is not allowed"), "{err}");
    }

    #[test]
    fn relative_paths_resolve_against_the_file() {
        let td = tempdir().expect("tempdir");
        let content = r#"
[play]
service_account_credentials = "keys/play.json"
artifact_dir = "build/outputs"

[variants.release]
service_account_credentials = "/abs/release.json"
artifact_dir = "release"
"#;
        std::fs::write(config_path(td.path()), content).expect("write");

        let file = ConfigFile::load_from_dir(td.path()).expect("load");
        assert_eq!(
            file.play.service_account_credentials,
            Some(td.path().join("keys/play.json"))
        );
        assert_eq!(file.play.artifact_dir, Some(td.path().join("build/outputs")));

        let release = &file.variants["release"];
        assert_eq!(
            release.service_account_credentials,
            Some(PathBuf::from("/abs/release.json"))
        );
        assert_eq!(release.artifact_dir, Some(td.path().join("release")));
    }

    #[test]
    fn save_and_load_round_trip() {
        let td = tempdir().expect("tempdir");
        let path = config_path(td.path());

        let mut file = ConfigFile::default();
        file.play.track = Some("alpha".to_string());
        file.play.release_status = Some(ReleaseStatus::Draft);
        file.variants.insert(
            "release".to_string(),
            Settings {
                user_fraction: Some(0.5),
                ..Default::default()
            },
        );

        file.save(&path).expect("save");
        let loaded = ConfigFile::load_from_file(&path).expect("load");
        assert_eq!(loaded, file);
    }

    #[test]
    fn parse_error_names_the_file() {
        let td = tempdir().expect("tempdir");
        let path = config_path(td.path());
        std::fs::write(&path, "[play\n").expect("write");

        let err = ConfigFile::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn template_parses_and_validates() {
        let file: ConfigFile = toml::from_str(&ConfigFile::default_toml_template()).unwrap();
        file.validate().unwrap();
        assert_eq!(file.play.track.as_deref(), Some("internal"));
        assert_eq!(file.play.resolution_strategy, Some(ResolutionStrategy::Fail));
        assert_eq!(file.play.release_status, Some(ReleaseStatus::Completed));
        assert!(file.variants.is_empty());
    }

    #[test]
    fn find_config_walks_up() {
        let td = tempdir().expect("tempdir");
        let nested = td.path().join("app").join("src").join("main");
        std::fs::create_dir_all(&nested).expect("create dirs");

        let path = config_path(td.path());
        std::fs::write(&path, "[play]\ntrack = 'beta'\n").expect("write");

        assert_eq!(find_config(&nested), Some(path));
    }

    #[test]
    fn config_path_helper() {
        let dir = PathBuf::from("/project");
        assert_eq!(config_path(&dir), PathBuf::from("/project/.playship.toml"));
    }
}
