//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an immutable `(strategy, value)` pair. Screen objects
//! declare their locators once as `const` items and every interaction
//! re-resolves them against the current page, so no element handle outlives
//! the call that produced it.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// How a locator value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `name` attribute (form controls)
    Name,
    /// CSS selector, possibly a selector list (`a, b`)
    Css,
    /// `id` attribute
    Id,
    /// XPath expression
    XPath,
    /// Exact visible text of a link
    LinkText,
    /// Element tag name
    TagName,
}

impl Strategy {
    /// Short label used in log lines and error messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Css => "css",
            Self::Id => "id",
            Self::XPath => "xpath",
            Self::LinkText => "link text",
            Self::TagName => "tag",
        }
    }
}

/// Identifies how to find an element on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    value: Cow<'static, str>,
}

impl Locator {
    /// Locate by `name` attribute
    #[must_use]
    pub const fn name(value: &'static str) -> Self {
        Self::fixed(Strategy::Name, value)
    }

    /// Locate by CSS selector
    #[must_use]
    pub const fn css(value: &'static str) -> Self {
        Self::fixed(Strategy::Css, value)
    }

    /// Locate by `id` attribute
    #[must_use]
    pub const fn id(value: &'static str) -> Self {
        Self::fixed(Strategy::Id, value)
    }

    /// Locate by XPath
    #[must_use]
    pub const fn xpath(value: &'static str) -> Self {
        Self::fixed(Strategy::XPath, value)
    }

    /// Locate a link by its exact text
    #[must_use]
    pub const fn link_text(value: &'static str) -> Self {
        Self::fixed(Strategy::LinkText, value)
    }

    /// Locate by tag name
    #[must_use]
    pub const fn tag(value: &'static str) -> Self {
        Self::fixed(Strategy::TagName, value)
    }

    /// Build a locator from a compile-time value
    #[must_use]
    pub const fn fixed(strategy: Strategy, value: &'static str) -> Self {
        Self {
            strategy,
            value: Cow::Borrowed(value),
        }
    }

    /// Build a locator from a runtime value (e.g. an event title)
    #[must_use]
    pub fn dynamic(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: Cow::Owned(value.into()),
        }
    }

    /// Locator strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Raw locator value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Equivalent CSS selector, when the strategy has one.
    ///
    /// `XPath` and `LinkText` have no CSS form and return `None`.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Css => Some(self.value.to_string()),
            Strategy::Name => Some(format!("[name=\"{}\"]", escape_attr(&self.value))),
            Strategy::Id => Some(format!("[id=\"{}\"]", escape_attr(&self.value))),
            Strategy::TagName => Some(self.value.to_ascii_lowercase()),
            Strategy::XPath | Strategy::LinkText => None,
        }
    }

    /// Equivalent XPath expression, for strategies without a CSS form
    #[must_use]
    pub fn to_xpath(&self) -> Option<String> {
        match self.strategy {
            Strategy::XPath => Some(self.value.to_string()),
            Strategy::LinkText => Some(format!(
                "//a[normalize-space(.)={}]",
                xpath_literal(&self.value)
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.label(), self.value)
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    // concat("a", '"', "b") for values holding both quote kinds
    let parts: Vec<String> = value
        .split('"')
        .map(|p| format!("\"{p}\""))
        .collect();
    format!("concat({})", parts.join(", '\"', "))
}
