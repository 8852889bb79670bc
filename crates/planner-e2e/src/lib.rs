//! planner-e2e: end-to-end UI suite for the event planner web application
//!
//! Scenarios drive the application through screen objects, screen objects
//! drive a browser session through the wait/interact layer, and the wait
//! layer talks to any backend implementing [`PageDriver`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    planner-e2e Architecture                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │───►│ Screen     │───►│ BasePage   │            │
//! │   │ (catalogue)│    │ objects    │    │ (waits)    │            │
//! │   └─────┬──────┘    └────────────┘    └─────┬──────┘            │
//! │         │                                   │                   │
//! │   ┌─────▼──────┐                      ┌─────▼──────┐            │
//! │   │ Runner +   │  SessionFactory ───► │ PageDriver │            │
//! │   │ Reporter   │                      │ chromium / │            │
//! │   └────────────┘                      │ simulated  │            │
//! │                                       └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod browser;
/// Suite configuration
pub mod config;
mod driver;
mod fixture;
mod locator;
/// Run logging and scenario markers
pub mod logging;
mod page_object;
/// Screen objects
pub mod pages;
mod reporter;
mod result;
mod runner;
/// Scenario model: tags, context, verdicts, assertions
pub mod scenario;
/// The scenario catalogue
pub mod scenarios;
/// In-process simulation of the event planner application
#[allow(clippy::missing_errors_doc)]
pub mod sim;
/// Wait/interact layer
pub mod wait;

pub use browser::ChromiumDriver;
pub use config::{Role, SuiteConfig};
pub use driver::{DriverConfig, ElementHandle, PageDriver, Screenshot};
pub use fixture::{with_session, ChromiumFactory, SessionFactory, SimulatedFactory};
pub use locator::{Locator, Strategy};
pub use page_object::{path_of, wait_for_route, PageObject, UrlMatcher};
pub use reporter::{FailureMode, Reporter, ScenarioOutcome, TestStatus};
pub use result::{E2eError, E2eResult};
pub use runner::{RunOptions, Runner, NOT_RUN_REASON};
pub use scenario::{Scenario, ScenarioContext, ScenarioMeta, Tag, Verdict};
pub use sim::{SimOptions, SimulatedApp, SimulatedSession};
pub use wait::{BasePage, WaitOptions};

/// Prelude for writing scenarios
pub mod prelude {
    pub use super::config::{Role, SuiteConfig};
    pub use super::pages::{
        EventDetailsPage, HomePage, LoginPage, MyRegistrationsPage, RegisterPage,
    };
    pub use super::result::{E2eError, E2eResult};
    pub use super::scenario::{ensure, Rejection, ScenarioContext, Verdict};
    pub use super::wait::BasePage;
}
