//! Command-line front end for the event planner end-to-end suite.
//!
//! `run` executes selected scenarios (against Chromium or the simulated
//! application), `list` prints the catalogue, `check-config` validates the
//! suite config.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{Cli, ColorArg, Commands, RunArgs, SelectArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;

/// Presentation settings from the parsed command line
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_build_config_from_flags() {
        let cli = Cli::try_parse_from(["planner-e2e", "-q", "--color", "never", "list"]).unwrap();
        let config = build_config(&cli);
        assert!(config.verbosity.is_quiet());
        assert_eq!(config.color, ColorChoice::Never);
    }
}
