//! PageDriver - Browser Capability Trait
//!
//! Screen objects and the wait layer depend only on [`PageDriver`], a fixed
//! set of operations (navigate, find, inspect, act, read location). Concrete
//! backends plug in behind it:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PageDriver (capability trait)                                │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────┐     ┌──────────────────────────┐  │
//! │  │  ChromiumDriver        │     │  SimulatedSession        │  │
//! │  │  (feature = "browser") │     │  (in-process model of    │  │
//! │  │  CDP via chromiumoxide │     │   the event planner)     │  │
//! │  └────────────────────────┘     └──────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All operations take `&self`: a session is used by one scenario at a time,
//! and backends keep their mutable state behind a lock.

use crate::locator::Locator;
use crate::result::E2eResult;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Opaque reference to an element located at a point in time.
///
/// The `epoch` ties the handle to one rendering of the page. Backends reject
/// handles from an older epoch with [`crate::E2eError::StaleElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: u64,
    epoch: u64,
}

impl ElementHandle {
    /// Create a handle (backends only)
    #[must_use]
    pub const fn new(id: u64, epoch: u64) -> Self {
        Self { id, epoch }
    }

    /// Backend-specific element id
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Page rendering this handle belongs to
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}@{}", self.id, self.epoch)
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: std::time::SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Check if screenshot has data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Browser configuration for driver sessions
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Start the window maximized (headed runs only)
    pub maximized: bool,
    /// Timeout for navigation and CDP requests
    pub navigation_timeout: Duration,
    /// Executable path override
    pub executable_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            maximized: false,
            navigation_timeout: Duration::from_secs(30),
            executable_path: None,
            sandbox: true,
            user_agent: None,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Start maximized
    #[must_use]
    pub const fn maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set browser executable
    #[must_use]
    pub fn executable(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Chromium command-line switches for this configuration.
    ///
    /// Notifications, info bars and the automation banner are always
    /// suppressed.
    #[must_use]
    pub fn browser_args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-notifications".to_string(),
            "--disable-infobars".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        if self.maximized && !self.headless {
            args.push("--start-maximized".to_string());
        }
        if let Some(ref ua) = self.user_agent {
            args.push(format!("--user-agent={ua}"));
        }
        args
    }
}

/// Browser capability consumed by the wait layer and screen objects.
///
/// Element operations accept handles produced by [`PageDriver::find_elements`]
/// on the same session. A handle from an earlier rendering yields
/// `StaleElement`.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    /// All elements currently matching `locator`, in document order
    async fn find_elements(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> E2eResult<bool>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self, element: &ElementHandle) -> E2eResult<bool>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> E2eResult<()>;

    /// Clear the content of a form control
    async fn clear(&self, element: &ElementHandle) -> E2eResult<()>;

    /// Type text into element, appending to its content.
    ///
    /// A trailing `\n` presses Enter, submitting the enclosing form.
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> E2eResult<()>;

    /// Choose the `<option>` with the given value in a `<select>`
    async fn select_value(&self, element: &ElementHandle, value: &str) -> E2eResult<()>;

    /// Rendered text, or the current value for form controls
    async fn text(&self, element: &ElementHandle) -> E2eResult<String>;

    /// Get current URL
    async fn current_url(&self) -> E2eResult<String>;

    /// Get document title
    async fn title(&self) -> E2eResult<String>;

    /// Reload page
    async fn refresh(&self) -> E2eResult<()>;

    /// Take screenshot
    async fn screenshot(&self) -> E2eResult<Screenshot>;

    /// Close the session
    async fn close(&self) -> E2eResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_handle_accessors() {
            let handle = ElementHandle::new(7, 2);
            assert_eq!(handle.id(), 7);
            assert_eq!(handle.epoch(), 2);
            assert_eq!(handle.to_string(), "e7@2");
        }

        #[test]
        fn test_handles_from_different_epochs_differ() {
            assert_ne!(ElementHandle::new(1, 1), ElementHandle::new(1, 2));
        }
    }

    mod screenshot_tests {
        use super::*;

        #[test]
        fn test_screenshot_is_valid() {
            assert!(Screenshot::new(vec![0x89, 0x50]).is_valid());
            assert!(!Screenshot::new(vec![]).is_valid());
        }
    }

    mod driver_config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert_eq!(config.viewport_width, 1920);
            assert_eq!(config.viewport_height, 1080);
            assert!(config.sandbox);
        }

        #[test]
        fn test_config_builder() {
            let config = DriverConfig::new()
                .headless(false)
                .viewport(1280, 800)
                .maximized(true)
                .no_sandbox()
                .user_agent("planner-e2e");

            assert!(!config.headless);
            assert_eq!(config.viewport_width, 1280);
            assert!(config.maximized);
            assert!(!config.sandbox);
            assert_eq!(config.user_agent.as_deref(), Some("planner-e2e"));
        }

        #[test]
        fn test_browser_args_suppress_banners() {
            let args = DriverConfig::default().browser_args();
            assert!(args.iter().any(|a| a == "--disable-notifications"));
            assert!(args.iter().any(|a| a == "--disable-infobars"));
            assert!(!args.iter().any(|a| a == "--start-maximized"));
        }

        #[test]
        fn test_maximized_only_when_headed() {
            let headed = DriverConfig::new().headless(false).maximized(true);
            assert!(headed.browser_args().iter().any(|a| a == "--start-maximized"));

            let headless = DriverConfig::new().maximized(true);
            assert!(!headless.browser_args().iter().any(|a| a == "--start-maximized"));
        }
    }
}
