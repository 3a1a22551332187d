//! Temporary staging directory holding the compiled package plus copied
//! tests, examples or benchmarks.

use crate::Result;
use crate::process::Invocation;
use crate::settings::Settings;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owns the staging directory and removes it when dropped, including on error paths.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Replace whatever is at `path` with a fresh, empty directory.
    pub fn create(path: &Path) -> Result<Self> {
        remove_dir(path)?;
        fs::create_dir_all(path)
            .with_context(|| format!("create staging directory {}", path.display()))?;
        debug!(path = %path.display(), "created staging directory");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Create the staging directory and compile `package` into it.
    pub fn prepare(settings: &Settings, package: &str) -> Result<Self> {
        let staging = Self::create(&settings.temp_dir)?;
        package_invocation(settings, package, staging.path()).run()?;
        Ok(staging)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the contents of `src` into the staging directory.
    pub fn copy_in(&self, src: &Path) -> Result<()> {
        copy_tree(src, &self.path)
            .with_context(|| format!("copy {} into {}", src.display(), self.path.display()))
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(err) = remove_dir(&self.path) {
            warn!(path = %self.path.display(), error = %err, "failed to remove staging directory");
        }
    }
}

/// `mojo package <src>/<package> -o <out>/<package>.mojopkg`
pub fn package_invocation(settings: &Settings, package: &str, out_dir: &Path) -> Invocation {
    Invocation::new("mojo")
        .arg("package")
        .arg(settings.package_source(package))
        .arg("-o")
        .arg(out_dir.join(format!("{}.mojopkg", package)))
        .current_dir(&settings.project_root)
}

fn remove_dir(path: &Path) -> Result<()> {
    if path.exists() {
        info!(path = %path.display(), "removing temp directory");
        fs::remove_dir_all(path).with_context(|| format!("remove {}", path.display()))?;
    }
    Ok(())
}

/// Recursively copy `src` into `dst`, merging with existing directories and
/// overwriting existing files.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("create {}", dst.display()))?;
    for entry in fs::read_dir(src).with_context(|| format!("read directory {}", src.display()))? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copy {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}
