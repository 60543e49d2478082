//! Publishing configuration for playship.
//!
//! This crate holds the configuration model handed to the publishing steps:
//!
//! - [`SettingsStore`] keeps the raw values exactly as the user supplied them,
//!   with no defaults applied.
//! - [`PlayPublisher`] is the named object users mutate. Its getters resolve
//!   defaults at read time and its setters validate at write time.
//! - [`PublisherConfig`] is the resolved, serializable snapshot, and
//!   [`PublisherSnapshot`] adds the in-process [`OutputProcessor`].
//! - [`PlayConfigs`] holds the root configuration plus per-variant overrides,
//!   optionally loaded from a `.playship.toml` file via [`ConfigFile`].
//!
//! # Example
//!
//! ```
//! use playship_config::{PlayConfigs, PublishedName};
//!
//! let mut configs = PlayConfigs::new();
//! configs.root_mut().set_track("beta");
//! configs.variant_mut("release").set_release_status("inProgress").expect("known status");
//!
//! let release = configs.resolve("release");
//! assert_eq!(release.track(), "beta");
//! assert_eq!(release.from_track(), "beta");
//! assert_eq!(release.release_status().published_name(), "inProgress");
//!
//! // Unknown names are rejected when written.
//! let err = configs.root_mut().set_resolution_strategy("bogus").unwrap_err();
//! assert!(err.to_string().contains("auto, fail, ignore"));
//! ```

mod configs;
mod credentials;
mod file;
mod outputs;
mod overrides;
mod publisher;
mod report;
mod settings;

pub use configs::{PlayConfigs, ROOT_NAME};
pub use credentials::ServiceAccount;
pub use file::{CONFIG_FILE, ConfigFile, config_path, find_config};
pub use outputs::{BuildOutput, shift_version_codes};
pub use overrides::PlayOverrides;
pub use publisher::{
    ArtifactSource, DEFAULT_TRACK, DEFAULT_USER_FRACTION, PlayPublisher, PublisherConfig,
    PublisherSnapshot, validate_user_fraction,
};
pub use report::{CollectingReporter, Reporter};
pub use settings::{OutputProcessor, Settings, SettingsStore};

pub use playship_types::{ConfigError, PublishedName, ReleaseStatus, ResolutionStrategy};
