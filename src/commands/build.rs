//! `build`: render the recipe and run `pixi build` against it.

use crate::Result;
use crate::manifest::DEFAULT_ENVIRONMENT;
use crate::process::Invocation;
use crate::recipe::generate_recipe;
use crate::settings::Settings;
use std::fs;
use tracing::{info, warn};

/// `pixi [-e <env>] build -o <build_output>`
pub fn build_invocation(settings: &Settings, environment: &str) -> Invocation {
    let mut inv = Invocation::new("pixi");
    if environment != DEFAULT_ENVIRONMENT {
        inv = inv.args(["-e", environment]);
    }
    inv.arg("build")
        .arg("-o")
        .arg(&settings.build_output)
        .current_dir(&settings.project_root)
}

/// Render the recipe, build the conda package, then delete the recipe again.
pub fn build_package(settings: &Settings, environment: &str) -> Result<()> {
    build_package_with(settings, environment, |inv| inv.run())
}

pub(crate) fn build_package_with<F>(settings: &Settings, environment: &str, run: F) -> Result<()>
where
    F: FnOnce(&Invocation) -> Result<()>,
{
    let recipe = generate_recipe(settings, environment)?;

    info!(environment, output = %settings.build_output.display(), "building conda package");
    let result = run(&build_invocation(settings, environment));

    // The rendered recipe is transient even when the build fails.
    if let Err(err) = fs::remove_file(&recipe) {
        warn!(path = %recipe.display(), error = %err, "failed to remove generated recipe");
    }

    result
}
