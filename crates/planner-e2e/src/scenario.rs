//! Scenario model.
//!
//! A scenario is an async function over a [`ScenarioContext`]: it sets up its
//! preconditions, drives screen objects, and checks outcomes. It ends in
//! exactly one of three ways:
//!
//! - `Ok(Verdict::Passed)`
//! - `Ok(Verdict::Skipped(reason))` when fixture data is missing
//! - `Err(e)` for any wait, driver or assertion failure

use crate::config::{Role, SuiteConfig};
use crate::driver::PageDriver;
use crate::pages::LoginPage;
use crate::result::{E2eError, E2eResult};
use crate::wait::BasePage;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

// =============================================================================
// METADATA
// =============================================================================

/// Scenario category, used for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Fast checks of the critical paths
    Smoke,
    /// Everything beyond the smoke set
    Regression,
    /// Sign-in and sign-up
    Authentication,
    /// Listing, search, filters, details
    Events,
    /// Seat registration
    Registration,
}

impl Tag {
    /// All tags
    pub const ALL: [Self; 5] = [
        Self::Smoke,
        Self::Regression,
        Self::Authentication,
        Self::Events,
        Self::Registration,
    ];

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
            Self::Authentication => "authentication",
            Self::Events => "events",
            Self::Registration => "registration",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                E2eError::config(format!(
                    "unknown tag {s:?} (expected one of: smoke, regression, authentication, events, registration)"
                ))
            })
    }
}

/// Identity of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioMeta {
    /// Stable id, e.g. `TC-AUTH-001`
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Categories
    pub tags: &'static [Tag],
}

impl ScenarioMeta {
    /// Whether the scenario carries `tag`
    #[must_use]
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Case-insensitive substring match on id or name
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.id.to_lowercase().contains(&needle) || self.name.to_lowercase().contains(&needle)
    }
}

/// Non-failing end of a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// All checks held
    Passed,
    /// Preconditions could not be met
    Skipped(String),
}

/// Entry point of a scenario
pub type ScenarioFn = for<'c> fn(&'c ScenarioContext<'c>) -> BoxFuture<'c, E2eResult<Verdict>>;

/// A runnable catalogue entry
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Identity
    pub meta: ScenarioMeta,
    /// Body
    pub run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Everything a scenario may use: its session, the suite configuration and
/// its own identity for log lines
#[derive(Clone, Copy)]
pub struct ScenarioContext<'a> {
    driver: &'a dyn PageDriver,
    config: &'a SuiteConfig,
    meta: &'a ScenarioMeta,
}

impl fmt::Debug for ScenarioContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("scenario", &self.meta.id)
            .field("base_url", &self.config.base_url())
            .finish_non_exhaustive()
    }
}

impl<'a> ScenarioContext<'a> {
    /// Bind a scenario to a session
    #[must_use]
    pub fn new(driver: &'a dyn PageDriver, config: &'a SuiteConfig, meta: &'a ScenarioMeta) -> Self {
        Self {
            driver,
            config,
            meta,
        }
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &'a SuiteConfig {
        self.config
    }

    /// Running scenario
    #[must_use]
    pub const fn meta(&self) -> &'a ScenarioMeta {
        self.meta
    }

    /// Wait/interact layer for screen objects
    #[must_use]
    pub fn base(&self) -> BasePage<'a> {
        BasePage::new(self.driver, self.config.wait_options())
    }

    /// Navigate to an application path such as `/login`
    pub async fn open(&self, path: &str) -> E2eResult<()> {
        let url = self.config.url(path);
        info!(scenario = self.meta.id, %url, "opening");
        self.driver.navigate(&url).await
    }

    /// Record an observation in the run log
    pub fn observe(&self, message: impl fmt::Display) {
        info!(scenario = self.meta.id, "{message}");
    }

    /// Decline to run, naming the missing precondition
    pub fn skip(&self, reason: impl Into<String>) -> E2eResult<Verdict> {
        let reason = reason.into();
        warn!(scenario = self.meta.id, %reason, "skipping");
        Ok(Verdict::Skipped(reason))
    }

    /// Fresh e-mail address, unique per call
    #[must_use]
    pub fn unique_email(&self) -> String {
        unique_email()
    }

    /// Wait until the location contains one of `fragments`; fail otherwise
    pub async fn expect_location(&self, fragments: &[&str]) -> E2eResult<String> {
        let base = self.base();
        let reached = base
            .wait_until_location_contains_any(fragments, base.options().timeout())
            .await;
        let url = base.current_location().await?;
        if reached {
            self.observe(format_args!("location is {url}"));
            Ok(url)
        } else {
            Err(E2eError::assertion(
                "unexpected location",
                format!("URL containing {}", fragments.join(" or ")),
                url,
            ))
        }
    }

    /// Sign in with the seeded account for `role` and wait to leave `/login`
    pub async fn login_as(&self, role: Role) -> E2eResult<String> {
        let creds = self.config.credentials(role);
        self.open("/login").await?;
        LoginPage::new(self.base())
            .login(&creds.email, &creds.password)
            .await?;
        let landing: &[&str] = if role.is_staff() {
            &["events"]
        } else {
            &["home", "events"]
        };
        self.expect_location(landing).await
    }
}

/// Fresh `test_xxxxxxxx@selenium.test` address
#[must_use]
pub fn unique_email() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("test_{}@selenium.test", &id[..8])
}

// =============================================================================
// ASSERTIONS
// =============================================================================

/// Fail with expected/actual when `condition` does not hold
pub fn ensure(
    condition: bool,
    message: &str,
    expected: impl fmt::Display,
    actual: impl fmt::Display,
) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(
            message,
            expected.to_string(),
            actual.to_string(),
        ))
    }
}

/// How a negative scenario expects its input to be refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The browser blocks submission: same screen, no server banner
    ClientSide,
    /// The server redirects back to the same screen with an error banner
    ServerSide,
}

impl Rejection {
    /// Check the observed screen state against this kind of refusal
    pub fn check(self, location: &str, screen_fragment: &str, banner_shown: bool) -> E2eResult<()> {
        let on_screen = location.contains(screen_fragment);
        let (holds, expected) = match self {
            Self::ClientSide => (
                on_screen && !banner_shown,
                format!("still on {screen_fragment} with no server error"),
            ),
            Self::ServerSide => (
                on_screen && banner_shown,
                format!("back on {screen_fragment} with a server error"),
            ),
        };
        ensure(
            holds,
            &format!("{self:?} rejection"),
            expected,
            format!("location {location}, error banner shown: {banner_shown}"),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const META: ScenarioMeta = ScenarioMeta {
        id: "TC-AUTH-001",
        name: "Valid Admin Login",
        tags: &[Tag::Smoke, Tag::Authentication],
    };

    mod tag_tests {
        use super::*;

        #[test]
        fn test_parse_is_case_insensitive() {
            assert_eq!("SMOKE".parse::<Tag>().unwrap(), Tag::Smoke);
            assert_eq!(" events ".parse::<Tag>().unwrap(), Tag::Events);
        }

        #[test]
        fn test_parse_round_trips_names() {
            for tag in Tag::ALL {
                assert_eq!(tag.to_string().parse::<Tag>().unwrap(), tag);
            }
        }

        #[test]
        fn test_unknown_tag() {
            assert!(matches!("slow".parse::<Tag>(), Err(E2eError::Config { .. })));
        }
    }

    mod meta_tests {
        use super::*;

        #[test]
        fn test_has_tag() {
            assert!(META.has_tag(Tag::Smoke));
            assert!(!META.has_tag(Tag::Events));
        }

        #[test]
        fn test_matches_id_or_name() {
            assert!(META.matches("auth-001"));
            assert!(META.matches("admin login"));
            assert!(!META.matches("registration"));
        }
    }

    mod email_tests {
        use super::*;

        #[test]
        fn test_unique_email_shape() {
            let email = unique_email();
            let local = email.strip_suffix("@selenium.test").unwrap();
            let suffix = local.strip_prefix("test_").unwrap();
            assert_eq!(suffix.len(), 8);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn test_unique_email_differs() {
            assert_ne!(unique_email(), unique_email());
        }
    }

    mod rejection_tests {
        use super::*;

        const LOGIN: &str = "http://localhost:8000/login";

        #[test]
        fn test_client_side() {
            assert!(Rejection::ClientSide.check(LOGIN, "login", false).is_ok());
            assert!(Rejection::ClientSide.check(LOGIN, "login", true).is_err());
            assert!(Rejection::ClientSide
                .check("http://localhost:8000/home", "login", false)
                .is_err());
        }

        #[test]
        fn test_server_side() {
            assert!(Rejection::ServerSide.check(LOGIN, "login", true).is_ok());
            assert!(Rejection::ServerSide.check(LOGIN, "login", false).is_err());
        }

        #[test]
        fn test_failure_reports_observation() {
            let err = Rejection::ServerSide.check(LOGIN, "login", false).unwrap_err();
            match err {
                E2eError::AssertionFailed { expected, actual, .. } => {
                    assert!(expected.contains("server error"));
                    assert!(actual.contains("error banner shown: false"));
                }
                other => panic!("unexpected error {other}"),
            }
        }
    }

    mod ensure_tests {
        use super::*;

        #[test]
        fn test_ensure() {
            assert!(ensure(true, "x", 1, 2).is_ok());
            let err = ensure(false, "count", 3, 0).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Assertion failed: count (expected: 3, actual: 0)"
            );
        }
    }

    mod context_tests {
        use super::*;
        use crate::pages::test_support::app;

        #[tokio::test]
        async fn test_login_as_each_role() {
            let app = app();
            let config = SuiteConfig::default().with_wait(500, 5, 50);
            for (role, landing) in [
                (Role::Admin, "/admin/events"),
                (Role::Manager, "/admin/events"),
                (Role::User, "/home"),
            ] {
                let session = app.open_session();
                let ctx = ScenarioContext::new(&session, &config, &META);
                let url = ctx.login_as(role).await.unwrap();
                assert!(url.ends_with(landing), "{role}: {url}");
            }
        }

        #[tokio::test]
        async fn test_expect_location_failure() {
            let app = app();
            let config = SuiteConfig::default().with_wait(50, 5, 20);
            let session = app.open_session();
            let ctx = ScenarioContext::new(&session, &config, &META);
            ctx.open("/login").await.unwrap();
            let err = ctx.expect_location(&["home"]).await.unwrap_err();
            assert!(matches!(err, E2eError::AssertionFailed { .. }));
        }

        #[test]
        fn test_skip() {
            let app = app();
            let config = SuiteConfig::default();
            let session = app.open_session();
            let ctx = ScenarioContext::new(&session, &config, &META);
            assert_eq!(
                ctx.skip("no events").unwrap(),
                Verdict::Skipped("no events".to_string())
            );
        }
    }
}
