//! planner-e2e: end-to-end UI suite for the event planner application
//!
//! ## Usage
//!
//! ```bash
//! planner-e2e list --tag smoke          # Show smoke scenarios
//! planner-e2e run --tag smoke           # Run them in Chromium
//! planner-e2e run --simulated -j 4      # Everything, simulated, 4 at once
//! planner-e2e check-config -c ci.yaml   # Validate a config
//! ```

use clap::Parser;
use planner_e2e_cli::{build_config, handlers, Cli, CliResult, Commands};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command {
        Commands::Run(ref args) => handlers::execute_run(&config, cli.config.as_deref(), args),
        Commands::List(ref args) => {
            handlers::execute_list(args);
            Ok(())
        }
        Commands::CheckConfig => handlers::execute_check_config(cli.config.as_deref()),
    }
}
