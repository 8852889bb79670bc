//! Screen objects for the event planner application.
//!
//! One struct per screen, each with a fixed `const` locator catalogue and the
//! actions that belong to that screen. Optional UI (banners, the register vs
//! unregister control) is queried through non-throwing checks. Moving between
//! screens is left to the scenarios.

pub mod event_details;
pub mod home;
pub mod login;
pub mod my_registrations;
pub mod register;

pub use event_details::EventDetailsPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use my_registrations::MyRegistrationsPage;
pub use register::RegisterPage;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_support {
    use crate::sim::{SimOptions, SimulatedApp, SimulatedSession};
    use crate::wait::WaitOptions;
    use chrono::NaiveDate;

    pub const BASE: &str = "http://localhost:8000";

    pub fn app() -> SimulatedApp {
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        SimulatedApp::with_options(BASE, SimOptions::default().with_today(today)).unwrap()
    }

    pub fn fast() -> WaitOptions {
        WaitOptions::new()
            .with_timeout(500)
            .with_poll_interval(5)
            .with_check_timeout(50)
    }

    pub async fn session_at(app: &SimulatedApp, path: &str) -> SimulatedSession {
        use crate::driver::PageDriver;
        let session = app.open_session();
        session.navigate(&format!("{BASE}{path}")).await.unwrap();
        session
    }
}
