//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use planner_e2e::Tag;
use std::path::PathBuf;

/// planner-e2e: end-to-end UI suite for the event planner application
#[derive(Parser, Debug)]
#[command(name = "planner-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Suite config file [default: $PLANNER_E2E_CONFIG or config/suite.yaml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the application
    Run(RunArgs),

    /// List the scenario catalogue
    List(SelectArgs),

    /// Load and validate the suite config
    CheckConfig,
}

/// Scenario selection shared by `run` and `list`
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Only scenarios carrying any of these tags (comma separated)
    #[arg(short, long = "tag", value_delimiter = ',', value_parser = parse_tag)]
    pub tags: Vec<Tag>,

    /// Only scenarios whose id or name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Scenarios running at once, each with its own browser
    #[arg(short, long, default_value = "1")]
    pub jobs: usize,

    /// Stop at the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Override common_info.base_url
    #[arg(long)]
    pub base_url: Option<String>,

    /// Run against the in-process simulated application
    #[arg(long)]
    pub simulated: bool,

    /// Write JUnit XML here
    #[arg(long)]
    pub junit: Option<PathBuf>,

    /// Write a JSON report here
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Save a PNG per failed scenario in this directory
    #[arg(long)]
    pub screenshots: Option<PathBuf>,
}

/// Color output argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

fn parse_tag(value: &str) -> Result<Tag, String> {
    value.parse::<Tag>().map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_defaults() {
            let cli = Cli::try_parse_from(["planner-e2e", "run"]).unwrap();
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.jobs, 1);
            assert!(!args.fail_fast);
            assert!(!args.simulated);
            assert!(args.select.tags.is_empty());
        }

        #[test]
        fn test_run_flags() {
            let cli = Cli::try_parse_from([
                "planner-e2e",
                "-v",
                "run",
                "--tag",
                "smoke,events",
                "-f",
                "login",
                "-j",
                "3",
                "--fail-fast",
                "--simulated",
                "--junit",
                "out/junit.xml",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 1);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.select.tags, vec![Tag::Smoke, Tag::Events]);
            assert_eq!(args.select.filter.as_deref(), Some("login"));
            assert_eq!(args.jobs, 3);
            assert!(args.fail_fast);
            assert!(args.simulated);
            assert_eq!(args.junit, Some(PathBuf::from("out/junit.xml")));
        }

        #[test]
        fn test_unknown_tag_rejected() {
            assert!(Cli::try_parse_from(["planner-e2e", "list", "--tag", "nightly"]).is_err());
        }

        #[test]
        fn test_global_config_after_subcommand() {
            let cli = Cli::try_parse_from(["planner-e2e", "check-config", "-c", "x.yaml"]).unwrap();
            assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
            assert!(matches!(cli.command, Commands::CheckConfig));
        }
    }
}
