use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use playship_config::{
    ConfigFile, PlayConfigs, PlayOverrides, PlayPublisher, PublisherConfig, ROOT_NAME, Reporter,
    ServiceAccount, config_path, find_config,
};

#[derive(Parser, Debug)]
#[command(name = "playship", version)]
#[command(about = "Resolve and check app publishing configuration")]
struct Cli {
    /// Path to the config file (default: search for .playship.toml upward from --dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to start the config file search from
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Build variant to resolve; unknown variants fall back to [play]
    #[arg(long, default_value = ROOT_NAME)]
    variant: String,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    cmd: Commands,
}

/// Values that take precedence over the config file.
#[derive(clap::Args, Debug, Default)]
struct OverrideArgs {
    /// Enable or disable publishing (true/false)
    #[arg(long)]
    enabled: Option<bool>,

    /// Service account key file (.json, or .p12 with --service-account-email)
    #[arg(long)]
    service_account_credentials: Option<PathBuf>,

    /// Service account email for legacy .p12 keys
    #[arg(long)]
    service_account_email: Option<String>,

    /// Upload app bundles instead of APKs (true/false)
    #[arg(long)]
    default_to_app_bundles: Option<bool>,

    /// Commit the edit; false leaves a draft (true/false)
    #[arg(long)]
    commit: Option<bool>,

    /// Promotion source track (default: same as --track)
    #[arg(long)]
    from_track: Option<String>,

    /// Destination track (default: internal)
    #[arg(long)]
    track: Option<String>,

    /// Staged rollout fraction, greater than 0 and at most 1
    #[arg(long)]
    user_fraction: Option<f64>,

    /// Version code conflicts: auto, fail or ignore
    #[arg(long)]
    resolution_strategy: Option<String>,

    /// Release status: completed, draft, halted or inProgress
    #[arg(long)]
    release_status: Option<String>,

    /// Directory of prebuilt artifacts
    #[arg(long)]
    artifact_dir: Option<PathBuf>,
}

impl From<OverrideArgs> for PlayOverrides {
    fn from(args: OverrideArgs) -> Self {
        PlayOverrides {
            enabled: args.enabled,
            service_account_credentials: args.service_account_credentials,
            service_account_email: args.service_account_email,
            default_to_app_bundles: args.default_to_app_bundles,
            commit: args.commit,
            from_track: args.from_track,
            track: args.track,
            user_fraction: args.user_fraction,
            resolution_strategy: args.resolution_strategy,
            release_status: args.release_status,
            artifact_dir: args.artifact_dir,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved configuration for a variant.
    Resolve {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Check the config file and every configured variant.
    Validate,
    /// Write a commented .playship.toml template into --dir.
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Check the service account credentials of a variant.
    Credentials,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

struct CliReporter;

impl Reporter for CliReporter {
    fn info(&mut self, msg: &str) {
        eprintln!("[info] {msg}");
    }

    fn warn(&mut self, msg: &str) {
        eprintln!("[warn] {msg}");
    }

    fn error(&mut self, msg: &str) {
        eprintln!("[error] {msg}");
    }
}

fn main() -> Result<()> {
    let Cli {
        config,
        dir,
        variant,
        overrides,
        cmd,
    } = Cli::parse();

    let mut reporter = CliReporter;

    match cmd {
        Commands::Init { force } => {
            run_init(&dir, force, &mut reporter)?;
        }
        Commands::Resolve { format } => {
            let configs = load_configs(config.as_deref(), &dir, &mut reporter)?;
            let publisher = resolve(&configs, &variant, overrides, &mut reporter)?;
            print_config(&publisher.config(), format)?;
        }
        Commands::Validate => {
            let configs = load_configs(config.as_deref(), &dir, &mut reporter)?;
            run_validate(&configs, overrides, &mut reporter)?;
        }
        Commands::Credentials => {
            let configs = load_configs(config.as_deref(), &dir, &mut reporter)?;
            let publisher = resolve(&configs, &variant, overrides, &mut reporter)?;
            run_credentials(&publisher.config(), &mut reporter)?;
        }
    }

    Ok(())
}

fn load_configs(
    config: Option<&Path>,
    dir: &Path,
    reporter: &mut dyn Reporter,
) -> Result<PlayConfigs> {
    let file = match config {
        Some(path) => ConfigFile::load_from_file(path)?,
        None => {
            let start = dir
                .canonicalize()
                .with_context(|| format!("invalid directory: {}", dir.display()))?;
            match find_config(&start) {
                Some(path) => {
                    reporter.info(&format!("using config file {}", path.display()));
                    ConfigFile::load_from_file(&path)?
                }
                None => {
                    reporter.info("no .playship.toml found, using defaults");
                    ConfigFile::default()
                }
            }
        }
    };

    file.into_configs()
}

fn resolve(
    configs: &PlayConfigs,
    variant: &str,
    overrides: OverrideArgs,
    reporter: &mut dyn Reporter,
) -> Result<PlayPublisher> {
    let mut publisher = configs.resolve_with(variant, reporter);
    PlayOverrides::from(overrides)
        .apply(&mut publisher)
        .context("invalid command-line override")?;
    Ok(publisher)
}

fn print_config(config: &PublisherConfig, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::to_string_pretty(config).context("failed to serialize config")?;
            println!("{out}");
        }
        Format::Toml => {
            let out = toml::to_string_pretty(config).context("failed to serialize config")?;
            print!("{out}");
        }
    }
    Ok(())
}

fn run_validate(
    configs: &PlayConfigs,
    overrides: OverrideArgs,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    let mut names = vec![ROOT_NAME.to_string()];
    names.extend(configs.variant_names().map(str::to_string));

    let overrides = PlayOverrides::from(overrides);
    for name in names {
        let mut publisher = configs.resolve_with(&name, reporter);
        overrides
            .clone()
            .apply(&mut publisher)
            .with_context(|| format!("invalid command-line override for `{name}`"))?;
        println!(
            "{name}: ok (track={}, status={})",
            publisher.track(),
            publisher.release_status()
        );
    }

    Ok(())
}

fn run_init(dir: &Path, force: bool, reporter: &mut dyn Reporter) -> Result<()> {
    let path = config_path(dir);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(&path, ConfigFile::default_toml_template())
        .with_context(|| format!("failed to write config file: {}", path.display()))?;
    reporter.info(&format!("wrote {}", path.display()));
    Ok(())
}

fn run_credentials(config: &PublisherConfig, reporter: &mut dyn Reporter) -> Result<()> {
    let account = ServiceAccount::from_config(config).context("service account check failed")?;
    match account {
        ServiceAccount::Json { path } => {
            println!("{}: json key {}", config.name, path.display());
        }
        ServiceAccount::Pkcs12 { path, email } => {
            reporter.warn("PKCS12 keys are deprecated, prefer a JSON service account key");
            println!("{}: p12 key {} ({email})", config.name, path.display());
        }
    }
    Ok(())
}
