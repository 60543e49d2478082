//! Named configuration units: one root plus any number of build variants.

use std::collections::BTreeMap;

use crate::publisher::PlayPublisher;
use crate::report::Reporter;

/// Name of the root configuration unit.
pub const ROOT_NAME: &str = "play";

/// Root configuration plus per-variant overrides.
///
/// Every variant owns its own store; [`PlayConfigs::resolve`] layers a
/// variant's set fields over the root's.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayConfigs {
    root: PlayPublisher,
    variants: BTreeMap<String, PlayPublisher>,
}

impl Default for PlayConfigs {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayConfigs {
    pub fn new() -> Self {
        Self {
            root: PlayPublisher::new(ROOT_NAME),
            variants: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(root: PlayPublisher, variants: BTreeMap<String, PlayPublisher>) -> Self {
        Self { root, variants }
    }

    pub fn root(&self) -> &PlayPublisher {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut PlayPublisher {
        &mut self.root
    }

    pub fn variant(&self, name: &str) -> Option<&PlayPublisher> {
        self.variants.get(name)
    }

    /// Get the variant's configuration, creating an empty one on first use.
    /// The root name addresses the root itself.
    pub fn variant_mut(&mut self, name: &str) -> &mut PlayPublisher {
        if name == ROOT_NAME {
            return &mut self.root;
        }
        self.variants
            .entry(name.to_string())
            .or_insert_with(|| PlayPublisher::new(name))
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// Effective configuration for a variant: the variant's set fields over
    /// the root's. Unknown variants, and the root name, resolve to the root.
    pub fn resolve(&self, variant: &str) -> PlayPublisher {
        if variant == ROOT_NAME {
            return self.root.clone();
        }
        let root = self.root.settings_store();
        let store = match self.variants.get(variant) {
            Some(overlay) => root.merge(&overlay.settings_store()),
            None => root,
        };
        PlayPublisher::from_store(variant, store)
    }

    /// Same as [`PlayConfigs::resolve`], reporting what was resolved and any
    /// setting that will have no effect.
    pub fn resolve_with(&self, variant: &str, reporter: &mut dyn Reporter) -> PlayPublisher {
        if variant != ROOT_NAME && !self.variants.contains_key(variant) {
            reporter.info(&format!(
                "no configuration for variant `{variant}`, using `{ROOT_NAME}`"
            ));
        }

        let publisher = self.resolve(variant);
        reporter.info(&format!(
            "resolved `{}`: track={} status={} strategy={}",
            publisher.name(),
            publisher.track(),
            publisher.release_status(),
            publisher.resolution_strategy()
        ));

        if !publisher.is_enabled() {
            reporter.warn(&format!("publishing is disabled for `{}`", publisher.name()));
        }

        if let Some(fraction) = publisher.settings().user_fraction
            && !publisher.release_status().is_staged()
        {
            reporter.warn(&format!(
                "user_fraction {fraction} has no effect for `{}` because release_status is {}",
                publisher.name(),
                publisher.release_status()
            ));
        }

        publisher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use playship_types::ReleaseStatus;

    fn configs() -> PlayConfigs {
        let mut configs = PlayConfigs::new();
        configs.root_mut().set_track("beta");
        configs.root_mut().set_commit(false);
        configs.root_mut().set_service_account_credentials("keys/play.json");

        let release = configs.variant_mut("release");
        release.set_track("production");
        release.set_release_status("inProgress").unwrap();
        release.set_user_fraction(0.2).unwrap();
        configs
    }

    #[test]
    fn variant_overrides_root_field_wise() {
        let resolved = configs().resolve("release");
        assert_eq!(resolved.name(), "release");
        assert_eq!(resolved.track(), "production");
        assert_eq!(resolved.from_track(), "production");
        assert!(!resolved.commit());
        assert_eq!(resolved.release_status(), ReleaseStatus::InProgress);
        assert_eq!(
            resolved.service_account_credentials(),
            Some(std::path::Path::new("keys/play.json"))
        );
    }

    #[test]
    fn unknown_variant_uses_root_values() {
        let resolved = configs().resolve("debug");
        assert_eq!(resolved.name(), "debug");
        assert_eq!(resolved.track(), "beta");
        assert_eq!(resolved.release_status(), ReleaseStatus::Completed);
    }

    #[test]
    fn root_name_resolves_to_root() {
        let configs = configs();
        assert_eq!(configs.resolve(ROOT_NAME), *configs.root());
    }

    #[test]
    fn root_name_is_not_a_variant() {
        let mut configs = PlayConfigs::new();
        configs.variant_mut(ROOT_NAME).set_track("production");

        assert!(configs.variant(ROOT_NAME).is_none());
        assert_eq!(configs.variant_names().count(), 0);
        assert_eq!(configs.root().track(), "production");
        assert_eq!(configs.resolve(ROOT_NAME).track(), "production");
    }

    #[test]
    fn variants_do_not_share_stores() {
        let mut configs = PlayConfigs::new();
        configs.variant_mut("free").set_track("alpha");
        configs.variant_mut("paid");

        assert_eq!(configs.variant("paid").unwrap().track(), "internal");
        assert_eq!(configs.variant("free").unwrap().track(), "alpha");
        assert_eq!(configs.root().track(), "internal");
        assert_eq!(configs.variant_names().collect::<Vec<_>>(), vec!["free", "paid"]);
    }

    #[test]
    fn resolved_publisher_is_independent() {
        let mut configs = configs();
        let resolved = configs.resolve("release");
        configs.variant_mut("release").set_track("alpha");
        configs.root_mut().set_commit(true);
        assert_eq!(resolved.track(), "production");
        assert!(!resolved.commit());
    }

    #[test]
    fn variant_processor_wins_over_root() {
        let mut configs = PlayConfigs::new();
        configs.root_mut().output_processor(|o| o.set_version_name("root"));
        configs.variant_mut("release").output_processor(|o| o.set_version_name("release"));

        let mut output = crate::BuildOutput::new("release", "app.aab", 1);
        let snapshot = configs.resolve("release").snapshot();
        snapshot.output_processor().unwrap().call(&mut output);
        assert_eq!(output.version_name(), Some("release"));

        let mut output = crate::BuildOutput::new("debug", "app.apk", 1);
        let snapshot = configs.resolve("debug").snapshot();
        snapshot.output_processor().unwrap().call(&mut output);
        assert_eq!(output.version_name(), Some("root"));
    }

    #[test]
    fn resolve_with_reports_ineffective_fraction() {
        let mut configs = PlayConfigs::new();
        configs.root_mut().set_user_fraction(0.5).unwrap();
        configs.root_mut().set_enabled(false);

        let mut reporter = CollectingReporter::default();
        let resolved = configs.resolve_with("release", &mut reporter);

        assert_eq!(resolved.user_fraction(), 0.5);
        assert_eq!(reporter.infos.len(), 2);
        assert!(reporter.infos[0].contains("no configuration for variant `release`"));
        assert!(reporter.infos[1].contains("track=internal status=completed strategy=fail"));
        assert_eq!(reporter.warns.len(), 2);
        assert!(reporter.warns[0].contains("disabled"));
        assert!(reporter.warns[1].contains("user_fraction 0.5 has no effect"));
        assert!(reporter.errors.is_empty());
    }

    #[test]
    fn resolve_with_staged_release_is_quiet() {
        let mut reporter = CollectingReporter::default();
        configs().resolve_with("release", &mut reporter);
        assert_eq!(reporter.infos.len(), 1);
        assert!(reporter.warns.is_empty());
    }
}
