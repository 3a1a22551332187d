use crate::Result;
use crate::manifest::{DEFAULT_ENVIRONMENT, Manifest};
use crate::recipe::constraint::translate;
use crate::settings::Settings;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// `-e <env>` for feature environments, nothing for the default one.
pub fn environment_flag(environment: &str) -> String {
    if environment == DEFAULT_ENVIRONMENT {
        String::new()
    } else {
        format!("-e {}", environment)
    }
}

/// Substitute manifest values into a recipe template.
///
/// Placeholders are replaced literally wherever they occur; any other
/// `{{...}}` text is left as is.
pub fn render_recipe(template: &str, manifest: &Manifest, environment: &str) -> Result<String> {
    let deps = manifest
        .dependencies_for(environment)
        .with_context(|| format!("select dependencies for environment '{}'", environment))?;
    let lines = translate(deps)
        .with_context(|| format!("translate dependencies for environment '{}'", environment))?;
    debug!(environment, count = lines.len(), "translated dependencies");

    let package = &manifest.package;
    let workspace = &manifest.workspace;
    let replacements = [
        ("{{NAME}}", package.name.as_str()),
        ("{{VERSION}}", package.version.as_str()),
        ("{{DESCRIPTION}}", workspace.description.as_str()),
        ("{{LICENSE}}", workspace.license.as_str()),
        ("{{LICENSE_FILE}}", workspace.license_file.as_str()),
        ("{{HOMEPAGE}}", workspace.homepage.as_str()),
        ("{{REPOSITORY}}", workspace.repository.as_str()),
    ];

    let mut recipe = template.to_string();
    for (placeholder, value) in replacements {
        recipe = recipe.replace(placeholder, value);
    }
    recipe = recipe.replace("{{ENVIRONMENT_FLAG}}", &environment_flag(environment));
    recipe = recipe.replace("{{DEPENDENCIES}}", &lines.join("\n"));

    Ok(recipe)
}

/// Render the recipe template for `environment` and write it next to the manifest.
pub fn generate_recipe(settings: &Settings, environment: &str) -> Result<PathBuf> {
    let manifest = Manifest::from_path(&settings.manifest_path)
        .with_context(|| format!("load manifest {}", settings.manifest_path.display()))?;
    let template = fs::read_to_string(&settings.recipe_template).with_context(|| {
        format!("read recipe template {}", settings.recipe_template.display())
    })?;

    let recipe = render_recipe(&template, &manifest, environment).with_context(|| {
        format!("render recipe from {}", settings.manifest_path.display())
    })?;

    fs::write(&settings.recipe_output, recipe)
        .with_context(|| format!("write recipe {}", settings.recipe_output.display()))?;
    info!(
        environment,
        path = %settings.recipe_output.display(),
        "generated recipe"
    );

    Ok(settings.recipe_output.clone())
}
