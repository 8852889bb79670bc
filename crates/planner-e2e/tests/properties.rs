//! Behavioural properties of the wait layer and screen objects, checked
//! against the simulated application

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use planner_e2e::prelude::*;
use planner_e2e::{E2eError, Locator, PageDriver, SimOptions, SimulatedApp, SimulatedSession, WaitOptions};
use std::time::Duration;

const BASE: &str = "http://localhost:8000";
const SETTLE: Duration = Duration::from_millis(500);

fn app() -> SimulatedApp {
    let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    SimulatedApp::with_options(BASE, SimOptions::default().with_today(today)).unwrap()
}

fn fast() -> WaitOptions {
    WaitOptions::new()
        .with_timeout(300)
        .with_poll_interval(5)
        .with_check_timeout(50)
}

async fn open(app: &SimulatedApp, path: &str) -> SimulatedSession {
    let session = app.open_session();
    session.navigate(&format!("{BASE}{path}")).await.unwrap();
    session
}

async fn location(session: &SimulatedSession) -> String {
    session.current_url().await.unwrap()
}

#[tokio::test]
async fn test_missing_element_is_not_found() {
    let app = app();
    let session = open(&app, "/login").await;
    let base = BasePage::new(&session, fast());

    let err = base
        .find_present(&Locator::css(".never-rendered"))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::NotFound { .. }), "{err}");
}

#[tokio::test]
async fn test_checks_return_false_instead_of_failing() {
    let app = app();
    let session = open(&app, "/login").await;
    let base = BasePage::new(&session, fast());

    assert!(!base.is_present(&Locator::css(".never-rendered")).await);
    assert!(!base.is_visible(&Locator::css(".never-rendered")).await);
    assert!(base.is_present(&LoginPage::EMAIL_INPUT).await);
}

#[tokio::test]
async fn test_typed_text_reads_back_exactly() {
    let app = app();
    let session = open(&app, "/login").await;
    let base = BasePage::new(&session, fast());

    base.type_text(&LoginPage::EMAIL_INPUT, "first@example.com")
        .await
        .unwrap();
    base.type_text(&LoginPage::EMAIL_INPUT, "second+tag@example.com")
        .await
        .unwrap();
    assert_eq!(
        base.read_text(&LoginPage::EMAIL_INPUT).await.unwrap(),
        "second+tag@example.com"
    );
}

#[tokio::test]
async fn test_my_registrations_redirects_guests_to_login() {
    let app = app();
    let session = open(&app, "/my-registrations").await;
    assert!(location(&session).await.contains("login"));
}

#[tokio::test]
async fn test_admin_lands_on_events() {
    let app = app();
    let config = SuiteConfig::default();
    let session = open(&app, "/login").await;
    let base = BasePage::new(&session, fast());
    let admin = config.credentials(Role::Admin);

    LoginPage::new(base)
        .login(&admin.email, &admin.password)
        .await
        .unwrap();
    assert!(base.wait_until_location_contains("events", SETTLE).await);
}

#[tokio::test]
async fn test_user_lands_on_home_or_events() {
    let app = app();
    let config = SuiteConfig::default();
    let session = open(&app, "/login").await;
    let base = BasePage::new(&session, fast());
    let user = config.credentials(Role::User);

    LoginPage::new(base)
        .login(&user.email, &user.password)
        .await
        .unwrap();
    assert!(
        base.wait_until_location_contains_any(&["home", "events"], SETTLE)
            .await
    );
}

#[tokio::test]
async fn test_wrong_password_stays_on_login_with_error() {
    let app = app();
    let session = open(&app, "/login").await;
    let base = BasePage::new(&session, fast());
    let page = LoginPage::new(base);

    page.login("admin@eventplanner.com", "not-the-password")
        .await
        .unwrap();
    assert!(location(&session).await.contains("login"));
    assert!(page.is_error_displayed().await);
}

#[tokio::test]
async fn test_password_mismatch_never_reaches_login() {
    let app = app();
    let session = open(&app, "/register").await;
    let base = BasePage::new(&session, fast());

    RegisterPage::new(base)
        .register("Mismatch", "mismatch@example.com", "Password123!", Some("Different123!"))
        .await
        .unwrap();
    assert!(!base.wait_until_location_contains("login", SETTLE).await);
    assert!(location(&session).await.contains("register"));
}

#[tokio::test]
async fn test_password_length_boundary() {
    let app = app();

    let session = open(&app, "/register").await;
    let base = BasePage::new(&session, fast());
    RegisterPage::new(base)
        .register("Eight", "eight@example.com", "12345678", None)
        .await
        .unwrap();
    assert!(base.wait_until_location_contains("login", SETTLE).await);

    let session = open(&app, "/register").await;
    let base = BasePage::new(&session, fast());
    RegisterPage::new(base)
        .register("Seven", "seven@example.com", "1234567", None)
        .await
        .unwrap();
    assert!(!base.wait_until_location_contains("login", SETTLE).await);
    assert!(app
        .inspect(|state| state.user_by_email("seven@example.com").is_none())
        .unwrap());
}

#[tokio::test]
async fn test_search_without_match_shows_nothing() {
    let app = app();
    let session = open(&app, "/home").await;
    let home = HomePage::new(BasePage::new(&session, fast()));

    home.search_events("NonExistentEvent12345").await.unwrap();
    let count = home.event_count().await.unwrap();
    assert!(count == 0 || home.no_events_displayed().await);
}
