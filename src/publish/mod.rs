//! Build-and-publish stage: run the build tool, then the upload tool.

pub mod executor;

use std::path::Path;

use crate::error::PublishError;

pub use executor::{
    CommandLine, CommandRunner, DEFAULT_BUILD_COMMAND, DEFAULT_UPLOAD_COMMAND, PublishStep,
    SystemRunner, clear_stale_artifacts, expand_glob,
};

/// Commands to run after the manifest has been rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCommands {
    pub build: CommandLine,
    pub upload: CommandLine,
}

impl Default for PublishCommands {
    fn default() -> Self {
        Self {
            build: CommandLine {
                program: "python".into(),
                args: vec!["-m".into(), "build".into()],
            },
            upload: CommandLine {
                program: "twine".into(),
                args: vec!["upload".into(), "dist/*".into()],
            },
        }
    }
}

/// Run build then upload in `workdir`. Stops at the first failure.
///
/// Files the upload patterns match are deleted before the build, so a second
/// local run never re-uploads an earlier version's artifacts.
pub async fn publish<R: CommandRunner + ?Sized>(
    commands: &PublishCommands,
    workdir: &Path,
    runner: &R,
) -> Result<(), PublishError> {
    let removed = clear_stale_artifacts(&commands.upload, workdir)?;
    if !removed.is_empty() {
        println!("  [CLEAN] removed {} stale artifact(s)", removed.len());
    }

    for (step, command) in [
        (PublishStep::Build, &commands.build),
        (PublishStep::Upload, &commands.upload),
    ] {
        println!("  [RUN]  {}: {}", step, command);
        runner.run(step, command, workdir).await?;
        println!("  [DONE] {}", step);
    }

    Ok(())
}
