//! `publish`: upload built packages to a prefix.dev channel.

use crate::Result;
use crate::process::Invocation;
use crate::settings::Settings;
use anyhow::{Context, anyhow, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CHANNEL: &str = "mojo-community";

const UPLOAD_URL: &str = "https://prefix.dev/api/v1/upload";

/// `.conda` artifacts in the platform subdirectories of `build_output`
/// (`<out>/<subdir>/*.conda`), sorted. Files directly in `build_output` and
/// anything under dot-directories such as `.pixi/` are not artifacts.
pub fn find_artifacts(build_output: &Path) -> Result<Vec<PathBuf>> {
    let root = build_output
        .to_str()
        .ok_or_else(|| anyhow!("build output path is not valid UTF-8: {}", build_output.display()))?;
    let pattern = format!("{}/*/*.conda", glob::Pattern::escape(root));
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };

    let mut artifacts = Vec::new();
    for entry in glob::glob_with(&pattern, options).with_context(|| format!("invalid glob pattern {}", pattern))? {
        let path = entry?;
        if path.is_file() {
            artifacts.push(path);
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// `pixi upload https://prefix.dev/api/v1/upload/<channel> <file>`
pub fn upload_invocation(settings: &Settings, channel: &str, file: &Path) -> Invocation {
    Invocation::new("pixi")
        .arg("upload")
        .arg(format!("{}/{}", UPLOAD_URL, channel))
        .arg(file)
        .current_dir(&settings.project_root)
}

/// Upload every built artifact to `channel`.
///
/// Uploads are attempted for every file even if some fail; each artifact is
/// deleted once processed. Any failure makes the command fail at the end.
pub fn publish(settings: &Settings, channel: &str) -> Result<()> {
    publish_with(settings, channel, |inv| inv.run())
}

pub(crate) fn publish_with<F>(settings: &Settings, channel: &str, mut upload: F) -> Result<()>
where
    F: FnMut(&Invocation) -> Result<()>,
{
    info!(channel, output = %settings.build_output.display(), "publishing packages");

    let artifacts = find_artifacts(&settings.build_output)?;
    if artifacts.is_empty() {
        info!(output = %settings.build_output.display(), "no .conda artifacts to publish");
        return Ok(());
    }

    let mut failed = Vec::new();
    for file in &artifacts {
        match upload(&upload_invocation(settings, channel, file)) {
            Ok(()) => info!(file = %file.display(), "uploaded"),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "upload failed; continuing");
                failed.push(file.display().to_string());
            }
        }

        if let Err(err) = fs::remove_file(file) {
            warn!(file = %file.display(), error = %err, "failed to remove artifact");
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} uploads to '{}' failed: {}",
            failed.len(),
            artifacts.len(),
            channel,
            failed.join(", ")
        );
    }
    Ok(())
}
