//! Command handlers - extracted from main.rs for testability

pub mod check_config;
pub mod list;
pub mod run;

pub use check_config::{describe_config, execute_check_config};
pub use list::{execute_list, render_catalogue};
pub use run::{execute_run, SIMULATED_WAIT};

use crate::error::CliResult;
use planner_e2e::SuiteConfig;
use std::path::Path;

/// Load the suite config from `--config`, `$PLANNER_E2E_CONFIG` or the
/// default location
pub fn load_suite_config(explicit: Option<&Path>) -> CliResult<SuiteConfig> {
    let path = SuiteConfig::resolve_path(explicit);
    Ok(SuiteConfig::load(path)?)
}
