//! Run command handler

use super::load_suite_config;
use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use planner_e2e::scenarios::{catalogue, select};
use planner_e2e::{
    logging, ChromiumFactory, FailureMode, Reporter, RunOptions, Runner, SessionFactory,
    SimulatedFactory, SuiteConfig,
};
use std::path::Path;

/// Wait settings (timeout, poll, check in ms) used against the simulated
/// application, which answers immediately
pub const SIMULATED_WAIT: (u64, u64, u64) = (2_000, 10, 200);

/// Execute the run command
pub fn execute_run(cli: &CliConfig, config_path: Option<&Path>, args: &RunArgs) -> CliResult<()> {
    let config = prepare_config(config_path, args)?;

    let mut logging_settings = config.logging.clone();
    logging_settings.level = cli.verbosity.log_level(&config.logging.level);
    let log_guard = logging::init(&logging_settings)?;

    let all = catalogue();
    let picked = select(&all, &args.select.tags, args.select.filter.as_deref());

    let mut output = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    if picked.is_empty() {
        output.warning("no scenarios match the selection");
        return Ok(());
    }

    let factory: Box<dyn SessionFactory> = if args.simulated {
        Box::new(SimulatedFactory::new(config.base_url())?)
    } else {
        Box::new(ChromiumFactory::new(config.driver_config()))
    };

    let mut options = RunOptions::default()
        .jobs(args.jobs)
        .failure_mode(if args.fail_fast {
            FailureMode::AndonCord
        } else {
            FailureMode::CollectAll
        });
    if let Some(ref dir) = args.screenshots {
        options = options.screenshots(dir);
    }

    output.header(&format!(
        "Running {} scenario(s) against {} ({})",
        picked.len(),
        config.base_url(),
        factory.label()
    ));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::test_execution(format!("Failed to create runtime: {e}")))?;

    output.start_spinner("running scenarios");
    let report = rt.block_on(async {
        let runner = Runner::new(&config, factory.as_ref(), options);
        runner.run(&picked).await
    });
    output.finish();

    for outcome in report.results() {
        output.outcome(outcome);
    }

    write_reports(&report, args)?;

    output.summary(
        report.passed_count(),
        report.failed_count(),
        report.skipped_count(),
        report.total_duration(),
    );
    if cli.verbosity.is_verbose() {
        output.info(&format!("log file: {}", log_guard.path().display()));
    }

    let failed = report.failed_count();
    if failed > 0 {
        return Err(CliError::test_execution(format!(
            "{failed} scenario(s) failed"
        )));
    }
    Ok(())
}

/// Load the config and apply command-line overrides.
///
/// With `--simulated` a missing config file falls back to the defaults and
/// waits are shortened to [`SIMULATED_WAIT`].
pub fn prepare_config(config_path: Option<&Path>, args: &RunArgs) -> CliResult<SuiteConfig> {
    let resolved = SuiteConfig::resolve_path(config_path);
    let mut config = if args.simulated && !resolved.exists() {
        SuiteConfig::default()
    } else {
        load_suite_config(config_path)?
    };

    if let Some(ref base_url) = args.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if args.headed {
        config = config.with_headless(false);
    }
    if args.simulated {
        let (timeout, poll, check) = SIMULATED_WAIT;
        config = config.with_wait(timeout, poll, check);
    }
    config.validate()?;
    Ok(config)
}

fn write_reports(report: &Reporter, args: &RunArgs) -> CliResult<()> {
    if let Some(ref path) = args.junit {
        report
            .generate_junit(path)
            .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))?;
    }
    if let Some(ref path) = args.json {
        report
            .generate_json(path)
            .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;
    use planner_e2e::ScenarioOutcome;
    use std::time::Duration;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["planner-e2e", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    mod prepare_config_tests {
        use super::*;

        #[test]
        fn test_simulated_without_file_uses_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("absent.yaml");
            let config = prepare_config(Some(&missing), &run_args(&["--simulated"])).unwrap();
            assert_eq!(config.base_url(), "http://localhost:8000");
            assert_eq!(config.wait.timeout_ms, SIMULATED_WAIT.0);
            assert_eq!(config.wait.check_timeout_ms, SIMULATED_WAIT.2);
        }

        #[test]
        fn test_missing_file_is_an_error_for_real_runs() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("absent.yaml");
            assert!(prepare_config(Some(&missing), &run_args(&[])).is_err());
        }

        #[test]
        fn test_overrides_apply() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("suite.yaml");
            std::fs::write(&path, SuiteConfig::default().to_yaml().unwrap()).unwrap();

            let config = prepare_config(
                Some(&path),
                &run_args(&["--headed", "--base-url", "https://staging.example.com/"]),
            )
            .unwrap();
            assert!(!config.browser.headless);
            assert_eq!(config.base_url(), "https://staging.example.com");
        }

        #[test]
        fn test_bad_base_url_override_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("absent.yaml");
            let args = run_args(&["--simulated", "--base-url", "ftp://nope"]);
            assert!(prepare_config(Some(&missing), &args).is_err());
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_reports_written() {
            let dir = tempfile::tempdir().unwrap();
            let junit = dir.path().join("out/junit.xml");
            let json = dir.path().join("out/report.json");
            let args = run_args(&[
                "--junit",
                junit.to_str().unwrap(),
                "--json",
                json.to_str().unwrap(),
            ]);

            let mut report = Reporter::collect_all();
            report
                .record(ScenarioOutcome::passed("TC-1", "One", Duration::from_millis(3)))
                .unwrap();
            write_reports(&report, &args).unwrap();

            assert!(std::fs::read_to_string(junit).unwrap().contains("<testsuite"));
            assert!(std::fs::read_to_string(json).unwrap().contains("TC-1"));
        }
    }
}
