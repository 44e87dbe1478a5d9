//! pypi-bump - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pypi_bump::manifest::DEFAULT_PLACEHOLDER;
use pypi_bump::publish::{DEFAULT_BUILD_COMMAND, DEFAULT_UPLOAD_COMMAND};
use pypi_bump::release::{DEFAULT_MANIFEST, command_timeout};
use pypi_bump::{
    CommandLine, IndexSource, PublishCommands, ReleaseConfig, SystemRunner, Version, plan_release,
    run_release,
};

/// Bump a Python package's version from its latest published release.
#[derive(Parser, Debug)]
#[command(name = "pypi-bump")]
#[command(about = "Bump a Python package's version from its latest published release")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the next version without touching any file
    Next(TargetArgs),

    /// Write the next version into the manifest
    Bump(BumpArgs),

    /// Write the next version, then build and upload
    Release(ReleaseArgs),
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Package name on the index (defaults to the manifest's project name)
    #[arg(short, long, env = "PYPI_BUMP_PACKAGE")]
    package: Option<String>,

    /// Path to the manifest template
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// How to query the index
    #[arg(long, value_enum, default_value_t = IndexSource::Pypi)]
    source: IndexSource,

    /// Index URL override (JSON API base for pypi, simple index for pip)
    #[arg(long, env = "PYPI_BUMP_INDEX_URL")]
    index_url: Option<String>,

    /// Version to use if the package has never been published
    #[arg(long)]
    initial_version: Option<Version>,
}

#[derive(Args, Debug)]
struct BumpArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Literal token in the manifest to replace with the version
    #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
    placeholder: String,

    /// Dry run - print the plan without writing
    #[arg(long)]
    dry_run: bool,

    /// Put the original template back when done
    #[arg(long)]
    restore: bool,
}

#[derive(Args, Debug)]
struct ReleaseArgs {
    #[command(flatten)]
    bump: BumpArgs,

    /// Build command, run in the manifest's directory
    #[arg(long, default_value = DEFAULT_BUILD_COMMAND)]
    build_cmd: String,

    /// Upload command; a trailing `dir/*` argument is expanded
    #[arg(long, default_value = DEFAULT_UPLOAD_COMMAND)]
    upload_cmd: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Next(target) => {
            let config = target_config(target);
            let index = config.build_index().context("Failed to set up package index")?;
            let plan = plan_release(&config, index.as_ref())
                .await
                .context("Failed to determine next version")?;
            println!("{}", plan.next);
        }
        Command::Bump(args) => {
            let config = bump_config(args);
            run(&config).await?;
        }
        Command::Release(args) => {
            let publish = PublishCommands {
                build: parse_command(&args.build_cmd, "--build-cmd")?,
                upload: parse_command(&args.upload_cmd, "--upload-cmd")?,
            };
            let config = ReleaseConfig {
                publish: Some(publish),
                assume_yes: args.yes,
                ..bump_config(args.bump)
            };
            run(&config).await?;
        }
    }

    Ok(())
}

async fn run(config: &ReleaseConfig) -> Result<()> {
    let index = config.build_index().context("Failed to set up package index")?;
    let runner = SystemRunner::new(config.command_timeout);

    run_release(config, index.as_ref(), &runner)
        .await
        .context("Release failed")?;

    Ok(())
}

fn target_config(args: TargetArgs) -> ReleaseConfig {
    ReleaseConfig {
        package: args.package,
        manifest: args.manifest,
        source: args.source,
        index_url: args.index_url,
        initial_version: args.initial_version,
        command_timeout: command_timeout(),
        ..ReleaseConfig::default()
    }
}

fn bump_config(args: BumpArgs) -> ReleaseConfig {
    ReleaseConfig {
        placeholder: args.placeholder,
        dry_run: args.dry_run,
        restore: args.restore,
        ..target_config(args.target)
    }
}

fn parse_command(line: &str, flag: &str) -> Result<CommandLine> {
    CommandLine::parse(line).with_context(|| format!("{} must not be empty", flag))
}

/// Log to stderr so `next` output stays machine-readable.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pypi_bump={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
