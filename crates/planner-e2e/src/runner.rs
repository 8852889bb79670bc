//! Scenario runner.
//!
//! Each scenario gets its own session from a [`SessionFactory`] and holds it
//! until it finishes; the session is closed whatever the outcome. With
//! `jobs > 1` up to that many scenarios run at once, results are still
//! recorded in catalogue order.
//!
//! In [`FailureMode::AndonCord`] the first failure stops the run: scenarios
//! already in flight finish and are reported, the rest are reported as
//! skipped.

use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::fixture::{with_session, SessionFactory};
use crate::logging::{pass_marker, start_marker};
use crate::reporter::{FailureMode, Reporter, ScenarioOutcome};
use crate::scenario::{Scenario, ScenarioContext, Verdict};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Skip reason for scenarios left out after the cord was pulled
pub const NOT_RUN_REASON: &str = "not run: stopped after an earlier failure";

/// How a run is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Scenarios running at once (at least 1)
    pub jobs: usize,
    /// Stop at the first failure or collect all
    pub failure_mode: FailureMode,
    /// Where failure screenshots go; none are taken when unset
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            failure_mode: FailureMode::AndonCord,
            screenshot_dir: None,
        }
    }
}

impl RunOptions {
    /// Set concurrency
    #[must_use]
    pub const fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set failure mode
    #[must_use]
    pub const fn failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Save a PNG per failed scenario under `dir`
    #[must_use]
    pub fn screenshots(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }
}

/// Runs scenarios against sessions from one factory
pub struct Runner<'a> {
    config: &'a SuiteConfig,
    factory: &'a dyn SessionFactory,
    options: RunOptions,
    stop: AtomicBool,
}

impl fmt::Debug for Runner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("factory", &self.factory.label())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Runner<'a> {
    /// Create a runner
    #[must_use]
    pub fn new(config: &'a SuiteConfig, factory: &'a dyn SessionFactory, options: RunOptions) -> Self {
        Self {
            config,
            factory,
            options,
            stop: AtomicBool::new(false),
        }
    }

    /// Run options
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run `scenarios` and report every one of them
    pub async fn run(&self, scenarios: &[&Scenario]) -> Reporter {
        self.stop.store(false, Ordering::SeqCst);
        let mut reporter = Reporter::new(self.options.failure_mode);
        reporter.start();
        info!(
            scenarios = scenarios.len(),
            jobs = self.options.jobs.max(1),
            backend = self.factory.label(),
            "run started"
        );

        let mut outcomes = stream::iter(scenarios.iter().copied())
            .map(|scenario| self.run_one(scenario))
            .buffered(self.options.jobs.max(1));

        while let Some(outcome) = outcomes.next().await {
            if let Err(e) = reporter.record(outcome) {
                if !self.stop.swap(true, Ordering::SeqCst) {
                    warn!(error = %e, "stopping the run");
                }
            }
        }

        info!("{}", reporter.summary());
        reporter
    }

    async fn run_one(&self, scenario: &Scenario) -> ScenarioOutcome {
        let meta = &scenario.meta;
        if self.stop.load(Ordering::SeqCst) {
            return ScenarioOutcome::skipped(meta.id, meta.name, Duration::ZERO, NOT_RUN_REASON);
        }

        info!("{}", start_marker(meta.id, meta.name));
        let started = Instant::now();
        let run = with_session(self.factory, |driver| async move {
            let ctx = ScenarioContext::new(driver.as_ref(), self.config, meta);
            let verdict = (scenario.run)(&ctx).await;
            let screenshot = match verdict {
                Err(_) => self.capture(driver.as_ref(), meta.id).await,
                Ok(_) => None,
            };
            Ok((verdict, screenshot))
        })
        .await;
        let elapsed = started.elapsed();

        match run {
            Ok((Ok(Verdict::Passed), _)) => {
                info!("{}", pass_marker(meta.id));
                ScenarioOutcome::passed(meta.id, meta.name, elapsed)
            }
            Ok((Ok(Verdict::Skipped(reason)), _)) => {
                ScenarioOutcome::skipped(meta.id, meta.name, elapsed, reason)
            }
            Ok((Err(e), screenshot)) => {
                error!(scenario = meta.id, error = %e, "scenario failed");
                let outcome = ScenarioOutcome::failed(meta.id, meta.name, elapsed, e.to_string());
                match screenshot {
                    Some(path) => outcome.with_screenshot(path),
                    None => outcome,
                }
            }
            Err(e) => {
                error!(scenario = meta.id, error = %e, "session failed");
                ScenarioOutcome::failed(meta.id, meta.name, elapsed, e.to_string())
            }
        }
    }

    /// Save the current page as `<screenshot_dir>/<id>.png`
    async fn capture(&self, driver: &dyn PageDriver, id: &str) -> Option<PathBuf> {
        let dir = self.options.screenshot_dir.as_ref()?;
        let shot = match driver.screenshot().await {
            Ok(shot) if shot.is_valid() => shot,
            Ok(_) => {
                warn!(scenario = id, "empty screenshot, not saved");
                return None;
            }
            Err(e) => {
                warn!(scenario = id, error = %e, "screenshot failed");
                return None;
            }
        };

        let path = dir.join(format!("{id}.png"));
        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, &shot.data).await
        };
        match written.await {
            Ok(()) => {
                info!(scenario = id, path = %path.display(), "screenshot saved");
                Some(path)
            }
            Err(e) => {
                warn!(scenario = id, error = %e, "screenshot not saved");
                None
            }
        }
    }
}
