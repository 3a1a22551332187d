use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod manifest;
mod process;
mod recipe;
mod settings;
mod staging;

use manifest::DEFAULT_ENVIRONMENT;
use settings::{Overrides, Settings};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "util")]
#[command(about = "Build, test and publish a Mojo package with pixi", long_about = None)]
struct Cli {
    /// Workspace manifest to read.
    #[arg(long, global = true, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Staging directory for `run` commands. Defaults to $HOME/tmp.
    #[arg(long, global = true, value_name = "PATH")]
    temp_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render recipe.yaml from src/recipe.tmpl.
    Templater {
        /// Environment to generate the recipe for.
        #[arg(short, long, default_value = DEFAULT_ENVIRONMENT)]
        mode: String,
    },

    /// Build the conda package (recipe is generated and removed again).
    Build {
        /// Environment to build the package with.
        #[arg(short, long, default_value = DEFAULT_ENVIRONMENT)]
        mode: String,
    },

    /// Upload built .conda packages to a prefix.dev channel.
    Publish {
        #[arg(short, long, default_value = commands::DEFAULT_CHANNEL)]
        channel: String,
    },

    /// Run tests, examples or benchmarks against the packaged library.
    Run {
        #[command(subcommand)]
        target: RunTarget,
    },
}

#[derive(Subcommand)]
enum RunTarget {
    Tests {
        /// Test file or directory, relative to src/test.
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    Examples {
        /// Glob of example files, relative to examples/.
        #[arg(short, long)]
        path: Option<String>,
    },
    Benchmarks {
        /// Glob of benchmark files, relative to benchmarks/.
        #[arg(short, long)]
        path: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::from_env(Overrides {
        manifest: cli.manifest,
        temp_dir: cli.temp_dir,
    })?;

    match cli.cmd {
        Commands::Templater { mode } => {
            let path = recipe::generate_recipe(&settings, &mode)?;
            println!("Wrote {}", settings.relative(&path).display());
        }
        Commands::Build { mode } => commands::build_package(&settings, &mode)?,
        Commands::Publish { channel } => commands::publish(&settings, &channel)?,
        Commands::Run { target } => match target {
            RunTarget::Tests { path } => commands::run_tests(&settings, path.as_deref())?,
            RunTarget::Examples { path } => {
                commands::run_programs(&settings, commands::Suite::Examples, path.as_deref())?
            }
            RunTarget::Benchmarks { path } => {
                commands::run_programs(&settings, commands::Suite::Benchmarks, path.as_deref())?
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_run_command() {
        let cli = Cli::parse_from(["util", "run", "examples", "-p", "hello*.mojo", "--temp-dir", "/s"]);
        assert_eq!(cli.temp_dir, Some(PathBuf::from("/s")));
        match cli.cmd {
            Commands::Run {
                target: RunTarget::Examples { path },
            } => assert_eq!(path.as_deref(), Some("hello*.mojo")),
            _ => panic!("expected run examples"),
        }
    }

    #[test]
    fn defaults_for_mode_and_channel() {
        match Cli::parse_from(["util", "build"]).cmd {
            Commands::Build { mode } => assert_eq!(mode, "default"),
            _ => panic!("expected build"),
        }
        match Cli::parse_from(["util", "publish"]).cmd {
            Commands::Publish { channel } => assert_eq!(channel, "mojo-community"),
            _ => panic!("expected publish"),
        }
        match Cli::parse_from(["util", "templater", "-m", "nightly"]).cmd {
            Commands::Templater { mode } => assert_eq!(mode, "nightly"),
            _ => panic!("expected templater"),
        }
    }
}
