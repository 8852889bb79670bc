//! check-config command handler

use super::load_suite_config;
use crate::error::CliResult;
use planner_e2e::{Role, SuiteConfig};
use std::path::Path;

/// Execute the check-config command
pub fn execute_check_config(explicit: Option<&Path>) -> CliResult<()> {
    let path = SuiteConfig::resolve_path(explicit);
    let config = load_suite_config(explicit)?;
    println!("{} is valid", path.display());
    print!("{}", describe_config(&config));
    Ok(())
}

/// Human-readable summary of a config, passwords left out
#[must_use]
pub fn describe_config(config: &SuiteConfig) -> String {
    let mut out = format!("  base_url: {}\n", config.base_url());
    for role in Role::ALL {
        out.push_str(&format!("  {role}: {}\n", config.credentials(role).email));
    }
    out.push_str(&format!(
        "  test_user: {} <{}>\n",
        config.test_user.name, config.test_user.email
    ));
    out.push_str(&format!(
        "  browser: {}, {}x{}\n",
        if config.browser.headless { "headless" } else { "headed" },
        config.browser.viewport_width,
        config.browser.viewport_height
    ));
    out.push_str(&format!(
        "  wait: timeout {}ms, poll {}ms, check {}ms\n",
        config.wait.timeout_ms, config.wait.poll_interval_ms, config.wait.check_timeout_ms
    ));
    out.push_str(&format!("  logs: {}\n", config.logging.dir.display()));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_hides_passwords() {
        let config = SuiteConfig::default();
        let text = describe_config(&config);
        assert!(text.contains("base_url: http://localhost:8000"));
        assert!(text.contains("manager: manager@eventplanner.com"));
        assert!(text.contains("test_user: Test User <testuser@example.com>"));
        assert!(!text.contains("admin123"));
        assert!(!text.contains("password123"));
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(execute_check_config(Some(&missing)).is_err());
    }
}
