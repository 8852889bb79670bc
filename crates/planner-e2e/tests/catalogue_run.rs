//! The whole catalogue run end to end against the simulated application

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use planner_e2e::scenarios::{catalogue, select};
use planner_e2e::{
    FailureMode, RunOptions, Runner, SimOptions, SimulatedFactory, SuiteConfig, Tag, TestStatus,
};

const BASE: &str = "http://localhost:8000";

fn factory() -> SimulatedFactory {
    let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    SimulatedFactory::with_options(BASE, SimOptions::default().with_today(today)).unwrap()
}

fn config() -> SuiteConfig {
    SuiteConfig::default().with_wait(1_000, 5, 100)
}

#[tokio::test]
async fn test_full_catalogue_has_no_failures() {
    let all = catalogue();
    let picked: Vec<_> = all.iter().collect();
    let factory = factory();
    let config = config();
    let runner = Runner::new(
        &config,
        &factory,
        RunOptions::default().failure_mode(FailureMode::CollectAll),
    );

    let report = runner.run(&picked).await;

    let failures: Vec<String> = report.failures().iter().map(|o| o.line()).collect();
    assert!(failures.is_empty(), "{failures:#?}");
    assert_eq!(report.total_count(), all.len());

    let order: Vec<&str> = report.results().iter().map(|o| o.id.as_str()).collect();
    let expected: Vec<&str> = all.iter().map(|s| s.meta.id).collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn test_smoke_scenarios_pass_outright() {
    let all = catalogue();
    let picked = select(&all, &[Tag::Smoke], None);
    let factory = factory();
    let config = config();
    let runner = Runner::new(&config, &factory, RunOptions::default());

    let report = runner.run(&picked).await;

    for outcome in report.results() {
        assert_eq!(outcome.status, TestStatus::Passed, "{}", outcome.line());
    }
}

#[tokio::test]
async fn test_registration_leaves_state_behind() {
    let all = catalogue();
    let picked = select(&all, &[], Some("TC-REG-001"));
    let factory = factory();
    let config = config();
    let runner = Runner::new(&config, &factory, RunOptions::default());

    let report = runner.run(&picked).await;
    assert!(report.all_passed(), "{}", report.summary());

    let registered = factory
        .app()
        .inspect(|state| {
            let user = state.user_by_email("user@eventplanner.com").unwrap();
            state.registrations_of(user.id).len()
        })
        .unwrap();
    assert!(registered >= 1);
}

#[tokio::test]
async fn test_event_scenarios_in_parallel() {
    let all = catalogue();
    let picked = select(&all, &[Tag::Events], None);
    let factory = factory();
    let config = config();
    let runner = Runner::new(
        &config,
        &factory,
        RunOptions::default()
            .jobs(4)
            .failure_mode(FailureMode::CollectAll),
    );

    let report = runner.run(&picked).await;

    assert_eq!(report.failed_count(), 0, "{}", report.summary());
    assert_eq!(report.total_count(), picked.len());
}
