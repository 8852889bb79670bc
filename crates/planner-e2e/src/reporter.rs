//! Reporter - Run Reporting with Andon Cord Support
//!
//! Collects one [`ScenarioOutcome`] per scenario and renders a summary line,
//! JUnit XML for CI and a JSON document.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  ┌────────────────────┐     ┌──────────────────────┐              │
//! │  │  FailureMode::     │     │  FailureMode::       │              │
//! │  │  AndonCord         │     │  CollectAll          │              │
//! │  │                    │     │                      │              │
//! │  │  stop on first     │     │  run everything and  │              │
//! │  │  failure (default) │     │  report all failures │              │
//! │  └────────────────────┘     └──────────────────────┘              │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// What to do after a scenario fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop on first failure
    #[default]
    AndonCord,
    /// Run everything, report all failures
    CollectAll,
}

/// Scenario result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Scenario passed
    Passed,
    /// Scenario failed
    Failed,
    /// Scenario declined to run
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Check if status is skipped
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        })
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario id, e.g. `TC-AUTH-001`
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Status
    pub status: TestStatus,
    /// Time spent, session setup and teardown included
    pub duration: Duration,
    /// Failure message or skip reason
    pub message: Option<String>,
    /// Screenshot saved on failure
    pub screenshot: Option<PathBuf>,
    /// When the scenario finished
    pub timestamp: SystemTime,
}

impl ScenarioOutcome {
    fn new(id: &str, name: &str, status: TestStatus, duration: Duration) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status,
            duration,
            message: None,
            screenshot: None,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a passing result
    #[must_use]
    pub fn passed(id: &str, name: &str, duration: Duration) -> Self {
        Self::new(id, name, TestStatus::Passed, duration)
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(id: &str, name: &str, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            message: Some(error.into()),
            ..Self::new(id, name, TestStatus::Failed, duration)
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(id: &str, name: &str, duration: Duration, reason: impl Into<String>) -> Self {
        Self {
            message: Some(reason.into()),
            ..Self::new(id, name, TestStatus::Skipped, duration)
        }
    }

    /// Attach the path of the failure screenshot
    #[must_use]
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    /// One console line: `TC-AUTH-001 Valid Admin Login ... PASSED (1.20s)`
    #[must_use]
    pub fn line(&self) -> String {
        let mut line = format!(
            "{} {} ... {} ({:.2}s)",
            self.id,
            self.name,
            self.status,
            self.duration.as_secs_f64()
        );
        if let Some(ref message) = self.message {
            line.push_str(&format!(": {message}"));
        }
        line
    }
}

/// Run reporter with Andon Cord support
///
/// ```ignore
/// let mut reporter = Reporter::andon();
/// reporter.record(ScenarioOutcome::passed("TC-1", "ok", elapsed))?;
/// reporter.record(ScenarioOutcome::failed("TC-2", "bad", elapsed, "boom"))?;
/// // ^ Err: the cord was pulled
/// ```
#[derive(Debug, Default)]
pub struct Reporter {
    results: Vec<ScenarioOutcome>,
    failure_mode: FailureMode,
    suite_name: String,
    start_time: Option<SystemTime>,
}

impl Reporter {
    /// Create a reporter in the given mode
    #[must_use]
    pub fn new(failure_mode: FailureMode) -> Self {
        Self {
            failure_mode,
            suite_name: "planner-e2e".to_string(),
            ..Default::default()
        }
    }

    /// Create reporter with Andon Cord mode (fail-fast)
    #[must_use]
    pub fn andon() -> Self {
        Self::new(FailureMode::AndonCord)
    }

    /// Create reporter with CollectAll mode
    #[must_use]
    pub fn collect_all() -> Self {
        Self::new(FailureMode::CollectAll)
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Failure mode
    #[must_use]
    pub const fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Mark the start of the run
    pub fn start(&mut self) {
        self.start_time = Some(SystemTime::now());
    }

    /// Record a scenario result
    ///
    /// # Errors
    ///
    /// In AndonCord mode, returns an error when the scenario failed. The
    /// result is recorded either way.
    pub fn record(&mut self, result: ScenarioOutcome) -> E2eResult<()> {
        let failure = result
            .status
            .is_failed()
            .then(|| (result.id.clone(), result.message.clone().unwrap_or_default()));

        self.results.push(result);

        if self.failure_mode == FailureMode::AndonCord {
            if let Some((id, message)) = failure {
                return Err(E2eError::assertion(
                    format!("ANDON CORD PULLED: {id} failed"),
                    "pass",
                    message,
                ));
            }
        }
        Ok(())
    }

    /// Get number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    /// Get number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    /// Get number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_skipped()).count()
    }

    /// Get total count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Share of executed (non-skipped) scenarios that passed, 0.0 to 1.0
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let executed = self.passed_count() + self.failed_count();
        if executed == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / executed as f64
    }

    /// Check if nothing failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Wall-clock time since [`Reporter::start`], or the sum of durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.start_time
            .and_then(|t| t.elapsed().ok())
            .unwrap_or_else(|| self.results.iter().map(|r| r.duration).sum())
    }

    /// Get results in recording order
    #[must_use]
    pub fn results(&self) -> &[ScenarioOutcome] {
        &self.results
    }

    /// Get failing scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.results
            .iter()
            .filter(|r| r.status.is_failed())
            .collect()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed, {} failed, {} skipped ({:.1}%)",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0
        )
    }

    /// Render the results as a JSON document
    pub fn render_json(&self) -> E2eResult<String> {
        let report = serde_json::json!({
            "suite": self.suite_name,
            "summary": {
                "total": self.total_count(),
                "passed": self.passed_count(),
                "failed": self.failed_count(),
                "skipped": self.skipped_count(),
                "duration_secs": self.total_duration().as_secs_f64(),
            },
            "results": self.results,
        });
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Write [`Reporter::render_json`] to `output_path`
    pub fn generate_json(&self, output_path: &Path) -> E2eResult<()> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, self.render_json()?)?;
        Ok(())
    }

    /// Generate JUnit XML for CI integration
    ///
    /// # Errors
    ///
    /// Returns error if file writing fails
    pub fn generate_junit(&self, output_path: &Path) -> E2eResult<()> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, self.render_junit())?;
        Ok(())
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        ));
        xml.push('\n');

        for result in &self.results {
            xml.push_str(&format!(
                r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
                escape_xml(&result.id),
                escape_xml(&result.name),
                result.duration.as_secs_f64()
            ));
            xml.push('\n');

            let message = result.message.as_deref().unwrap_or_default();
            match result.status {
                TestStatus::Failed => {
                    xml.push_str(&format!(
                        r#"    <failure message="{}">{}</failure>"#,
                        escape_xml(message),
                        escape_xml(message)
                    ));
                    xml.push('\n');
                }
                TestStatus::Skipped => {
                    xml.push_str(&format!(r#"    <skipped message="{}"/>"#, escape_xml(message)));
                    xml.push('\n');
                }
                TestStatus::Passed => {}
            }
            if let Some(ref shot) = result.screenshot {
                xml.push_str(&format!(
                    "    <system-out>[[ATTACHMENT|{}]]</system-out>\n",
                    escape_xml(&shot.display().to_string())
                ));
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
