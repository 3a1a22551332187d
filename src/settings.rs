//! Paths shared by every command, resolved once at startup.

use crate::Result;
use anyhow::{Context, bail};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of the defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub manifest: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Working directory for every external command.
    pub project_root: PathBuf,
    pub manifest_path: PathBuf,
    pub recipe_template: PathBuf,
    /// Rendered recipe; removed again after `build`.
    pub recipe_output: PathBuf,
    /// Parent of the package sources (`<source_dir>/<package name>`).
    pub source_dir: PathBuf,
    pub test_dir: PathBuf,
    pub examples_dir: PathBuf,
    pub benchmarks_dir: PathBuf,
    /// Staging directory. Deleted and recreated by every `run` command.
    pub temp_dir: PathBuf,
    /// Where `pixi build` writes packages and `publish` looks for them.
    pub build_output: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment (`HOME`, `CONDA_BLD_PATH`)
    /// and the current directory.
    pub fn from_env(overrides: Overrides) -> Result<Self> {
        let root = std::env::current_dir().context("determine current directory")?;
        Self::resolve(
            root,
            std::env::var_os("HOME"),
            std::env::var_os("CONDA_BLD_PATH"),
            overrides,
        )
    }

    /// Resolve settings from explicit inputs. Relative paths are taken relative
    /// to `project_root`; empty environment values count as unset.
    pub fn resolve(
        project_root: PathBuf,
        home: Option<OsString>,
        conda_bld_path: Option<OsString>,
        overrides: Overrides,
    ) -> Result<Self> {
        let non_empty = |v: Option<OsString>| v.filter(|s| !s.is_empty()).map(PathBuf::from);

        let temp_dir = match (overrides.temp_dir, non_empty(home)) {
            (Some(dir), _) => project_root.join(dir),
            (None, Some(home)) => home.join("tmp"),
            (None, None) => bail!("HOME is not set; pass --temp-dir to choose a staging directory"),
        };

        let build_output = non_empty(conda_bld_path)
            .map(|p| project_root.join(p))
            .unwrap_or_else(|| project_root.clone());

        let manifest_path = project_root.join(overrides.manifest.unwrap_or_else(|| "pixi.toml".into()));

        let source_dir = project_root.join("src");

        Ok(Self {
            recipe_template: source_dir.join("recipe.tmpl"),
            recipe_output: project_root.join("recipe.yaml"),
            test_dir: source_dir.join("test"),
            examples_dir: project_root.join("examples"),
            benchmarks_dir: project_root.join("benchmarks"),
            source_dir,
            manifest_path,
            temp_dir,
            build_output,
            project_root,
        })
    }

    /// Build a settings value rooted at `root` with the staging dir at `temp_dir`.
    #[cfg(test)]
    pub fn for_tests(root: &Path, temp_dir: &Path) -> Self {
        let overrides = Overrides {
            manifest: None,
            temp_dir: Some(temp_dir.to_path_buf()),
        };
        // HOME is ignored once --temp-dir is given.
        Self::resolve(root.to_path_buf(), None, None, overrides).unwrap()
    }

    /// Location of the sources for `package`.
    pub fn package_source(&self, package: &str) -> PathBuf {
        self.source_dir.join(package)
    }

    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.project_root).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_follow_home_and_cwd() {
        let s = Settings::resolve(
            PathBuf::from("/work/mist"),
            Some("/home/dev".into()),
            None,
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(s.temp_dir, PathBuf::from("/home/dev/tmp"));
        assert_eq!(s.build_output, PathBuf::from("/work/mist"));
        assert_eq!(s.manifest_path, PathBuf::from("/work/mist/pixi.toml"));
        assert_eq!(s.recipe_template, PathBuf::from("/work/mist/src/recipe.tmpl"));
        assert_eq!(s.recipe_output, PathBuf::from("/work/mist/recipe.yaml"));
        assert_eq!(s.test_dir, PathBuf::from("/work/mist/src/test"));
        assert_eq!(s.examples_dir, PathBuf::from("/work/mist/examples"));
        assert_eq!(s.benchmarks_dir, PathBuf::from("/work/mist/benchmarks"));
        assert_eq!(s.package_source("mist"), PathBuf::from("/work/mist/src/mist"));
    }

    #[test]
    fn conda_bld_path_sets_build_output() {
        let s = Settings::resolve(
            PathBuf::from("/work/mist"),
            Some("/home/dev".into()),
            Some("/var/conda-bld".into()),
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(s.build_output, PathBuf::from("/var/conda-bld"));
    }

    #[test]
    fn empty_conda_bld_path_is_ignored() {
        let s = Settings::resolve(
            PathBuf::from("/work/mist"),
            Some("/home/dev".into()),
            Some("".into()),
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(s.build_output, PathBuf::from("/work/mist"));
    }

    #[test]
    fn overrides_win() {
        let s = Settings::resolve(
            PathBuf::from("/work/mist"),
            Some("/home/dev".into()),
            None,
            Overrides {
                manifest: Some("config/pixi.toml".into()),
                temp_dir: Some("/scratch/stage".into()),
            },
        )
        .unwrap();
        assert_eq!(s.manifest_path, PathBuf::from("/work/mist/config/pixi.toml"));
        assert_eq!(s.temp_dir, PathBuf::from("/scratch/stage"));
    }

    #[test]
    fn missing_home_requires_temp_dir() {
        let err = Settings::resolve(PathBuf::from("/work"), None, None, Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("--temp-dir"));
    }

    #[test]
    fn relative_strips_project_root() {
        let s = Settings::for_tests(Path::new("/work/mist"), Path::new("/tmp/stage"));
        assert_eq!(
            s.relative(Path::new("/work/mist/examples/a.mojo")),
            Path::new("examples/a.mojo")
        );
        assert_eq!(s.relative(Path::new("/elsewhere")), Path::new("/elsewhere"));
    }
}
