//! Screen object support.
//!
//! Every screen of the application is a struct embedding a [`BasePage`] plus
//! a fixed catalogue of `const` [`Locator`](crate::locator::Locator)s. [`PageObject`] ties a screen to
//! its route so that scenarios can open it and recognise it.
//!
//! ```ignore
//! let login = LoginPage::new(ctx.base());
//! ctx.open(LoginPage::URL_PATTERN).await?;
//! login.login(&creds.email, &creds.password).await?;
//! ```

use crate::wait::{poll_until, BasePage};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// A screen of the application under test.
pub trait PageObject<'d> {
    /// Route pattern (e.g. `/login`, `/events/:id`)
    const URL_PATTERN: &'static str;

    /// Wait/interact layer bound to the session
    fn base(&self) -> &BasePage<'d>;

    /// Screen name for log lines
    fn page_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Whether `url` is this screen's route
    fn matches_location(&self, url: &str) -> bool {
        UrlMatcher::new(Self::URL_PATTERN).matches(&path_of(url))
    }
}

/// Last path segment of a type name, without generic arguments
/// (`a::b::HomePage<'_>` becomes `HomePage`)
fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Wait until the session shows the route of `page`
pub async fn wait_for_route<'d, P: PageObject<'d>>(page: &P, timeout: Duration) -> bool {
    let base = *page.base();
    let found = poll_until(timeout, base.options().poll_interval(), || async move {
        let url = base.current_location().await?;
        Ok(page.matches_location(&url).then_some(url))
    })
    .await;
    match found {
        Ok(Some(url)) => {
            tracing::debug!(page = page.page_name(), %url, "route reached");
            true
        }
        Ok(None) => false,
        Err(e) => {
            tracing::debug!(page = page.page_name(), error = %e, "route check failed");
            false
        }
    }
}

/// Path component of an absolute URL; plain paths lose only their query
/// and fragment
#[must_use]
pub fn path_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    }
}

/// URL pattern matcher for screen routes
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/admin/*`
    /// - Named parameters: `/events/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Whether a path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let parts = split_path(path);
        if parts.len() != self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&parts)
            .all(|(segment, part)| match segment {
                UrlSegment::Literal(lit) => lit == part,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Named parameters of a matching path; empty when it does not match
    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        if !self.matches(path) {
            return HashMap::new();
        }
        self.segments
            .iter()
            .zip(split_path(path))
            .filter_map(|(segment, part)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), part.to_string())),
                _ => None,
            })
            .collect()
    }

    /// The original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
