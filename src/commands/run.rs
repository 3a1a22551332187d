//! `run tests|examples|benchmarks`: stage the compiled package next to the
//! sources and drive `mojo` over them.

use crate::Result;
use crate::manifest::Manifest;
use crate::process::Invocation;
use crate::settings::Settings;
use crate::staging::StagingDir;
use anyhow::{Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default file selection for examples and benchmarks.
pub const DEFAULT_PATTERN: &str = "*.mojo";

/// Programs that are built and executed one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Examples,
    Benchmarks,
}

impl Suite {
    pub fn name(self) -> &'static str {
        match self {
            Suite::Examples => "examples",
            Suite::Benchmarks => "benchmarks",
        }
    }

    pub fn dir(self, settings: &Settings) -> &Path {
        match self {
            Suite::Examples => &settings.examples_dir,
            Suite::Benchmarks => &settings.benchmarks_dir,
        }
    }
}

fn package_name(settings: &Settings) -> Result<String> {
    let manifest = Manifest::from_path(&settings.manifest_path)
        .with_context(|| format!("load manifest {}", settings.manifest_path.display()))?;
    Ok(manifest.package.name)
}

/// `<staging>[/<path>]`: what `mojo test` is pointed at.
pub fn test_target(staging: &Path, path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) => staging.join(p),
        None => staging.to_path_buf(),
    }
}

/// `mojo test <target>`
pub fn test_invocation(settings: &Settings, target: &Path) -> Invocation {
    Invocation::new("mojo")
        .arg("test")
        .arg(target)
        .current_dir(&settings.project_root)
}

/// Stage the package and the test directory, then run `mojo test`.
pub fn run_tests(settings: &Settings, path: Option<&Path>) -> Result<()> {
    let package = package_name(settings)?;

    info!(package = %package, "building package and copying tests");
    let staging = StagingDir::prepare(settings, &package)?;
    staging.copy_in(&settings.test_dir)?;

    let target = test_target(staging.path(), path);
    info!(target = %target.display(), "running tests");
    test_invocation(settings, &target).run()
}

/// Source files of a suite matching `pattern` (relative to `dir`), sorted.
pub fn select_sources(dir: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| anyhow!("path is not valid UTF-8: {}", dir.display()))?;
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(dir_str),
        pattern.unwrap_or(DEFAULT_PATTERN)
    );

    let mut files = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern {}", pattern))? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File name up to the first `.`: `bench_parse.mojo` -> `bench_parse`.
pub fn program_stem(source: &Path) -> Option<&str> {
    let name = source.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or(name);
    (!stem.is_empty()).then_some(stem)
}

/// Build and execute commands for one staged source file.
pub fn program_invocations(settings: &Settings, staged_source: &Path, binary: &Path) -> [Invocation; 2] {
    let build = Invocation::new("mojo")
        .arg("build")
        .arg(staged_source)
        .arg("-o")
        .arg(binary)
        .current_dir(&settings.project_root);
    let exec = Invocation::new(binary).current_dir(&settings.project_root);
    [build, exec]
}

/// Stage the package and the suite directory, then build and run each
/// selected program in order. A missing suite directory is not an error.
pub fn run_programs(settings: &Settings, suite: Suite, pattern: Option<&str>) -> Result<()> {
    let dir = suite.dir(settings);
    if !dir.exists() {
        info!(path = %settings.relative(dir).display(), "path does not exist; nothing to run");
        return Ok(());
    }

    let package = package_name(settings)?;
    info!(package = %package, suite = suite.name(), "building package and copying sources");
    let staging = StagingDir::prepare(settings, &package)?;
    staging.copy_in(dir)?;

    let sources = select_sources(dir, pattern)?;
    info!(suite = suite.name(), count = sources.len(), "running programs");

    for source in &sources {
        let file_name = source
            .file_name()
            .ok_or_else(|| anyhow!("not a file: {}", source.display()))?;
        let stem = program_stem(source)
            .ok_or_else(|| anyhow!("cannot derive program name from {}", source.display()))?;

        let staged = staging.path().join(file_name);
        fs::copy(source, &staged)
            .with_context(|| format!("copy {} to {}", source.display(), staged.display()))?;

        info!(source = %settings.relative(source).display(), "building and running");
        for inv in program_invocations(settings, &staged, &staging.path().join(stem)) {
            inv.run()?;
        }
    }

    Ok(())
}
