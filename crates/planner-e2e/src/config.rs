//! Suite configuration.
//!
//! A [`SuiteConfig`] is loaded once per process from a YAML file and passed
//! by reference to everything that needs it. Groups mirror the layout the
//! suite has always used:
//!
//! ```yaml
//! common_info:
//!   base_url: http://localhost:8000
//! admin:     { email: admin@eventplanner.com,   password: admin123 }
//! manager:   { email: manager@eventplanner.com, password: manager123 }
//! user:      { email: user@eventplanner.com,    password: user123 }
//! test_user: { name: Test User, email: testuser@example.com, password: password123 }
//! ```
//!
//! `browser`, `wait` and `logging` are optional and fall back to defaults.

use crate::driver::DriverConfig;
use crate::result::{E2eError, E2eResult};
use crate::wait::{
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_CHECK_TIMEOUT_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default config file location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/suite.yaml";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "PLANNER_E2E_CONFIG";

/// Application user roles with seeded accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator
    Admin,
    /// Event manager
    Manager,
    /// Standard user
    User,
}

impl Role {
    /// All roles
    pub const ALL: [Self; 3] = [Self::Admin, Self::Manager, Self::User];

    /// Config group name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }

    /// Whether login lands on the event administration screen
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonInfo {
    /// Base URL of the application under test
    pub base_url: String,
}

/// E-mail/password pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login e-mail
    pub email: String,
    /// Login password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Account used by the registration scenarios
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUser {
    /// Display name
    pub name: String,
    /// E-mail address
    pub email: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for TestUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Start maximized (headed runs only)
    pub maximized: bool,
    /// Chromium executable override
    pub chromium_path: Option<String>,
    /// Chromium sandbox (disable in containers)
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            maximized: false,
            chromium_path: None,
            sandbox: true,
        }
    }
}

/// Wait-layer timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    /// Timeout for required elements
    pub timeout_ms: u64,
    /// Interval between polls
    pub poll_interval_ms: u64,
    /// Timeout for checks
    pub check_timeout_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            check_timeout_ms: DEFAULT_CHECK_TIMEOUT_MS,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory receiving one log file per run
    pub dir: PathBuf,
    /// Default level filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

/// Complete suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Application-wide settings
    pub common_info: CommonInfo,
    /// Administrator account
    pub admin: Credentials,
    /// Manager account
    pub manager: Credentials,
    /// Standard user account
    pub user: Credentials,
    /// Registration test account
    pub test_user: TestUser,
    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserSettings,
    /// Wait timings
    #[serde(default)]
    pub wait: WaitSettings,
    /// Log output
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for SuiteConfig {
    /// Local development defaults matching the application's seeders
    fn default() -> Self {
        Self {
            common_info: CommonInfo {
                base_url: "http://localhost:8000".to_string(),
            },
            admin: Credentials::new("admin@eventplanner.com", "admin123"),
            manager: Credentials::new("manager@eventplanner.com", "manager123"),
            user: Credentials::new("user@eventplanner.com", "user123"),
            test_user: TestUser {
                name: "Test User".to_string(),
                email: "testuser@example.com".to_string(),
                password: "password123".to_string(),
            },
            browser: BrowserSettings::default(),
            wait: WaitSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl SuiteConfig {
    /// Resolve the config path: explicit argument, then `PLANNER_E2E_CONFIG`,
    /// then `config/suite.yaml`
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(
            || {
                std::env::var_os(CONFIG_ENV_VAR)
                    .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
            },
            Path::to_path_buf,
        )
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> E2eResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            E2eError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), base_url = %config.base_url(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(content: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> E2eResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject empty values and a base URL that is not http(s)
    pub fn validate(&self) -> E2eResult<()> {
        let required = [
            ("common_info.base_url", &self.common_info.base_url),
            ("admin.email", &self.admin.email),
            ("admin.password", &self.admin.password),
            ("manager.email", &self.manager.email),
            ("manager.password", &self.manager.password),
            ("user.email", &self.user.email),
            ("user.password", &self.user.password),
            ("test_user.name", &self.test_user.name),
            ("test_user.email", &self.test_user.email),
            ("test_user.password", &self.test_user.password),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(E2eError::config(format!("missing value for {key}")));
            }
        }

        let base = &self.common_info.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(E2eError::config(format!(
                "common_info.base_url must start with http:// or https://, got {base}"
            )));
        }

        if self.wait.poll_interval_ms == 0 {
            return Err(E2eError::config("wait.poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.common_info.base_url.trim_end_matches('/')
    }

    /// Absolute URL for an application path such as `/login`
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Credentials for a seeded role
    #[must_use]
    pub const fn credentials(&self, role: Role) -> &Credentials {
        match role {
            Role::Admin => &self.admin,
            Role::Manager => &self.manager,
            Role::User => &self.user,
        }
    }

    /// Wait options for screen objects
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.wait.timeout_ms,
            poll_interval_ms: self.wait.poll_interval_ms,
            check_timeout_ms: self.wait.check_timeout_ms,
        }
    }

    /// Browser session configuration
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        let b = &self.browser;
        let mut config = DriverConfig::new()
            .headless(b.headless)
            .viewport(b.viewport_width, b.viewport_height)
            .maximized(b.maximized);
        if let Some(ref path) = b.chromium_path {
            config = config.executable(path.clone());
        }
        if !b.sandbox {
            config = config.no_sandbox();
        }
        config
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.common_info.base_url = base_url.into();
        self
    }

    /// Override headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    /// Override wait timings
    #[must_use]
    pub const fn with_wait(mut self, timeout_ms: u64, poll_interval_ms: u64, check_timeout_ms: u64) -> Self {
        self.wait = WaitSettings {
            timeout_ms,
            poll_interval_ms,
            check_timeout_ms,
        };
        self
    }

    /// Override the log directory
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.logging.dir = dir.into();
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const MINIMAL: &str = r"
common_info:
  base_url: http://planner.test/
admin:
  email: admin@eventplanner.com
  password: admin123
manager:
  email: manager@eventplanner.com
  password: manager123
user:
  email: user@eventplanner.com
  password: user123
test_user:
  name: Test User
  email: testuser@example.com
  password: password123
";

    mod parse_tests {
        use super::*;

        #[test]
        fn test_minimal_file_gets_defaults() {
            let config = SuiteConfig::from_yaml(MINIMAL).unwrap();
            assert_eq!(config.base_url(), "http://planner.test");
            assert_eq!(config.wait, WaitSettings::default());
            assert!(config.browser.headless);
            assert_eq!(config.logging.dir, PathBuf::from("logs"));
        }

        #[test]
        fn test_optional_sections_override() {
            let yaml = format!(
                "{MINIMAL}wait:\n  timeout_ms: 2000\nbrowser:\n  headless: false\n  sandbox: false\n"
            );
            let config = SuiteConfig::from_yaml(&yaml).unwrap();
            assert_eq!(config.wait.timeout_ms, 2000);
            assert_eq!(config.wait.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            let driver = config.driver_config();
            assert!(!driver.headless);
            assert!(!driver.sandbox);
        }

        #[test]
        fn test_missing_group_is_an_error() {
            let yaml = MINIMAL.replace("manager:", "managers:");
            assert!(matches!(
                SuiteConfig::from_yaml(&yaml),
                Err(E2eError::Yaml(_))
            ));
        }

        #[test]
        fn test_round_trip_through_yaml() {
            let config = SuiteConfig::default();
            let yaml = config.to_yaml().unwrap();
            assert_eq!(SuiteConfig::from_yaml(&yaml).unwrap(), config);
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_empty_value_rejected() {
            let mut config = SuiteConfig::default();
            config.user.password = "  ".to_string();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("user.password"));
        }

        #[test]
        fn test_base_url_scheme_required() {
            let config = SuiteConfig::default().with_base_url("localhost:8000");
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_zero_poll_interval_rejected() {
            let config = SuiteConfig::default().with_wait(100, 0, 50);
            assert!(config.validate().is_err());
        }
    }

    mod accessor_tests {
        use super::*;

        #[test]
        fn test_url_joins_paths() {
            let config = SuiteConfig::default().with_base_url("https://app.test/");
            assert_eq!(config.url("/login"), "https://app.test/login");
            assert_eq!(config.url("events/3"), "https://app.test/events/3");
        }

        #[test]
        fn test_credentials_by_role() {
            let config = SuiteConfig::default();
            assert_eq!(config.credentials(Role::Admin).email, "admin@eventplanner.com");
            assert_eq!(config.credentials(Role::Manager).password, "manager123");
            assert!(Role::Manager.is_staff());
            assert!(!Role::User.is_staff());
        }

        #[test]
        fn test_debug_hides_passwords() {
            let config = SuiteConfig::default();
            let debug = format!("{config:?}");
            assert!(!debug.contains("admin123"));
            assert!(!debug.contains("password123"));
        }

        #[test]
        fn test_wait_options_follow_settings() {
            let opts = SuiteConfig::default().with_wait(1000, 20, 300).wait_options();
            assert_eq!(opts.timeout(), Duration::from_millis(1000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(20));
            assert_eq!(opts.check_timeout(), Duration::from_millis(300));
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_load_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(MINIMAL.as_bytes()).unwrap();
            let config = SuiteConfig::load(file.path()).unwrap();
            assert_eq!(config.test_user.name, "Test User");
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = SuiteConfig::load(dir.path().join("absent.yaml")).unwrap_err();
            assert!(matches!(err, E2eError::Config { .. }));
        }

        #[test]
        fn test_explicit_path_wins() {
            let path = SuiteConfig::resolve_path(Some(Path::new("custom.yaml")));
            assert_eq!(path, PathBuf::from("custom.yaml"));
        }
    }
}
