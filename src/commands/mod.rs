//! Subcommand implementations.

pub mod build;
pub mod publish;
pub mod run;

pub use build::build_package;
pub use publish::{DEFAULT_CHANNEL, publish};
pub use run::{Suite, run_programs, run_tests};
