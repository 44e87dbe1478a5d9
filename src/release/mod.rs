//! Release pipeline: query -> select -> increment -> substitute -> publish.

pub mod config;

use std::path::{Path, PathBuf};

use dialoguer::Confirm;
use tracing::{debug, warn};

use crate::error::{ReleaseError, VersionError};
use crate::index::{PackageIndex, fetch_latest};
use crate::manifest::{ManifestSnapshot, apply_placeholder, read_project_name, read_version_field};
use crate::publish::{CommandRunner, PublishCommands, publish};
use crate::version::{Version, next_version};

pub use config::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_MANIFEST, IndexSource, ReleaseConfig, TIMEOUT_ENV_VAR,
    command_timeout,
};

/// What a run is going to do, computed before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub package: String,
    /// Latest published release, `None` for a first publish.
    pub previous: Option<Version>,
    pub next: Version,
    pub manifest: PathBuf,
    /// The manifest's version field as found, typically the placeholder.
    pub current_field: Option<String>,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub plan: ReleasePlan,
    pub replacements: usize,
    pub published: bool,
}

/// Resolve the package name and compute the next version. Writes nothing.
pub async fn plan_release<I: PackageIndex + ?Sized>(
    config: &ReleaseConfig,
    index: &I,
) -> Result<ReleasePlan, ReleaseError> {
    let package = match &config.package {
        Some(name) => name.clone(),
        None => read_project_name(&config.manifest)?,
    };

    let current_field = match read_version_field(&config.manifest) {
        Ok(field) => field,
        Err(e) => {
            // Non-TOML manifests still work; they just have no readable field.
            debug!(error = %e, "could not read version field from manifest");
            None
        }
    };

    let previous = fetch_latest(index, &package).await?;

    let next = match next_version(previous.as_ref(), config.initial_version.as_ref()) {
        Ok(next) => next,
        Err(VersionError::NoBaseVersion) => return Err(ReleaseError::NoPublishedVersions(package)),
        Err(e) => return Err(e.into()),
    };

    Ok(ReleasePlan {
        package,
        previous,
        next,
        manifest: config.manifest.clone(),
        current_field,
    })
}

/// Run the full pipeline.
///
/// Stages:
/// 1. Plan (package name, latest release, next version)
/// 2. Substitute the placeholder in the manifest
/// 3. Build and upload, if configured
///
/// With `restore` set, the manifest's original content is written back at
/// the end whether or not the later stages succeeded.
pub async fn run_release<I, R>(
    config: &ReleaseConfig,
    index: &I,
    runner: &R,
) -> Result<ReleaseOutcome, ReleaseError>
where
    I: PackageIndex + ?Sized,
    R: CommandRunner + ?Sized,
{
    // ── Stage 1: Plan ──
    let plan = plan_release(config, index).await?;
    print_plan(&plan, config);

    if config.dry_run {
        println!();
        println!("Dry run complete. No changes made.");
        return Ok(ReleaseOutcome {
            plan,
            replacements: 0,
            published: false,
        });
    }

    if config.publish.is_some() && !config.assume_yes {
        println!();
        let confirmed = Confirm::new()
            .with_prompt(format!("Publish {} {}?", plan.package, plan.next))
            .default(true)
            .interact()
            .map_err(|_| ReleaseError::Cancelled)?;

        if !confirmed {
            return Err(ReleaseError::Cancelled);
        }
    }

    let snapshot = if config.restore {
        Some(ManifestSnapshot::capture(&config.manifest)?)
    } else {
        None
    };

    println!();
    let result = execute(config, plan, runner).await;

    // ── Restore the template ──
    if let Some(snapshot) = snapshot {
        match snapshot.restore() {
            Ok(()) => println!("  [DONE] Restored {}", snapshot.path().display()),
            Err(e) if result.is_ok() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "failed to restore manifest after a failed release");
                eprintln!(
                    "  [FAIL] Could not restore {}: {}",
                    snapshot.path().display(),
                    e
                );
            }
        }
    }

    result
}

async fn execute<R: CommandRunner + ?Sized>(
    config: &ReleaseConfig,
    plan: ReleasePlan,
    runner: &R,
) -> Result<ReleaseOutcome, ReleaseError> {
    // ── Stage 2: Substitute ──
    let replacements = apply_placeholder(&config.manifest, &config.placeholder, &plan.next)?;
    if replacements == 0 {
        println!(
            "  [WARN] '{}' not found in {}; file unchanged",
            config.placeholder,
            config.manifest.display()
        );
    } else {
        println!(
            "  [DONE] Wrote {} to {} ({} occurrence{})",
            plan.next,
            config.manifest.display(),
            replacements,
            if replacements == 1 { "" } else { "s" }
        );
    }

    // ── Stage 3: Build and upload ──
    let published = match &config.publish {
        Some(commands) => {
            publish_from_manifest_dir(commands, &config.manifest, runner).await?;
            println!();
            println!("Released {} {}!", plan.package, plan.next);
            true
        }
        None => false,
    };

    Ok(ReleaseOutcome {
        plan,
        replacements,
        published,
    })
}

async fn publish_from_manifest_dir<R: CommandRunner + ?Sized>(
    commands: &PublishCommands,
    manifest: &Path,
    runner: &R,
) -> Result<(), ReleaseError> {
    let workdir = match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    publish(commands, workdir, runner).await?;
    Ok(())
}

fn print_plan(plan: &ReleasePlan, config: &ReleaseConfig) {
    println!("Package:  {}", plan.package);
    println!(
        "Version:  {} -> {}",
        plan.previous
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string()),
        plan.next
    );
    println!("Manifest: {}", plan.manifest.display());

    if let Some(field) = &plan.current_field
        && field != &config.placeholder
    {
        println!(
            "  [WARN] version field is '{}', expected '{}'",
            field, config.placeholder
        );
    }

    if let Some(commands) = &config.publish {
        println!("Build:    {}", commands.build);
        println!("Upload:   {}", commands.upload);
    }
}
