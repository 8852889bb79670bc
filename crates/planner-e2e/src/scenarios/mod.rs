//! The scenario catalogue.
//!
//! Ids and names follow the suite's historical test ids so that logs and
//! reports stay comparable across runs.

pub mod event_registration;
pub mod events;
pub mod journey;
pub mod login;
pub mod registration;

use crate::scenario::{Scenario, ScenarioMeta, Tag};

/// Build a catalogue entry from an `async fn(&ScenarioContext<'_>)`
macro_rules! scenario {
    ($id:literal, $name:literal, [$($tag:ident),+ $(,)?], $body:path) => {
        Scenario {
            meta: ScenarioMeta {
                id: $id,
                name: $name,
                tags: &[$(Tag::$tag),+],
            },
            run: |ctx| Box::pin($body(ctx)),
        }
    };
}

/// Every scenario, in execution order
#[must_use]
pub fn catalogue() -> Vec<Scenario> {
    vec![
        // sign-in
        scenario!("TC-AUTH-VIEW-001", "Login Page Accessible", [Smoke, Authentication], login::login_page_accessible),
        scenario!("TC-AUTH-001", "Valid Admin Login", [Smoke, Authentication], login::valid_admin_login),
        scenario!("TC-AUTH-002", "Valid User Login", [Smoke, Authentication], login::valid_user_login),
        scenario!("TC-AUTH-003", "Invalid Login - Wrong Password", [Regression, Authentication], login::wrong_password),
        scenario!("TC-AUTH-004", "Invalid Login - Non-existent Email", [Regression, Authentication], login::unknown_email),
        scenario!("TC-AUTH-005", "Valid Manager Login", [Regression, Authentication], login::valid_manager_login),
        scenario!("TC-AUTH-006", "Invalid Email Format", [Regression, Authentication], login::invalid_email_format),
        scenario!("TC-AUTH-007", "User Logout", [Regression, Authentication], login::user_logout),
        // sign-up
        scenario!("TC-AUTH-VIEW-002", "Register Page Accessible", [Smoke, Authentication], registration::register_page_accessible),
        scenario!("TC-AUTH-010", "Valid Registration", [Smoke, Authentication], registration::valid_registration),
        scenario!("TC-AUTH-011", "Registration - Duplicate Email", [Regression, Authentication], registration::duplicate_email),
        scenario!("TC-AUTH-012", "Registration - Password Mismatch", [Regression, Authentication], registration::password_mismatch),
        scenario!("TC-AUTH-013", "Registration - Password Too Short", [Regression, Authentication], registration::password_too_short),
        scenario!("TC-AUTH-014", "Registration - Minimum Password Length", [Regression, Authentication], registration::password_minimum_length),
        scenario!("TC-AUTH-015", "Registration - Empty Name", [Regression, Authentication], registration::empty_name),
        scenario!("TC-AUTH-NAVIGATE", "Register to Login Navigation", [Regression, Authentication], registration::register_to_login_navigation),
        // listing
        scenario!("TC-EVT-001", "Public Events Listing", [Smoke, Events], events::public_listing),
        scenario!("TC-EVT-010", "Search Events by Title", [Regression, Events], events::search_by_title),
        scenario!("TC-EVT-012", "Search With No Results", [Regression, Events], events::search_no_results),
        scenario!("TC-EVT-020", "Filter Events by Category", [Regression, Events], events::filter_by_category),
        scenario!("TC-EVT-021", "Filter Events by Weekday", [Regression, Events], events::filter_by_weekday),
        scenario!("TC-EVT-030", "View Event Details", [Regression, Events], events::view_event_details),
        scenario!("TC-EVT-HOME", "Home Page Public Access", [Regression, Events], events::home_public_access),
        scenario!("TC-EVT-USER", "Home Page Logged-in View", [Regression, Events], events::home_logged_in_view),
        // seats
        scenario!("TC-REG-001", "Register for Event", [Smoke, Registration], event_registration::register_for_event),
        scenario!("TC-REG-004", "Register Without Login", [Regression, Registration], event_registration::register_without_login),
        scenario!("TC-REG-005", "Unregister from Event", [Regression, Registration], event_registration::unregister_from_event),
        scenario!("TC-REG-010", "View My Registrations", [Regression, Registration], event_registration::view_my_registrations),
        scenario!("TC-REG-011", "Registered Event Listed", [Regression, Registration], event_registration::registered_event_listed),
        scenario!("TC-REG-AUTH", "My Registrations Requires Login", [Regression, Registration], event_registration::my_registrations_requires_login),
        // end to end
        scenario!("TC-PW-001", "Complete User Journey", [Regression, Authentication, Registration], journey::complete_user_journey),
    ]
}

/// Scenarios carrying any of `tags` (all when empty) whose id or name
/// contains `filter`
#[must_use]
pub fn select<'s>(scenarios: &'s [Scenario], tags: &[Tag], filter: Option<&str>) -> Vec<&'s Scenario> {
    scenarios
        .iter()
        .filter(|s| tags.is_empty() || tags.iter().any(|t| s.meta.has_tag(*t)))
        .filter(|s| filter.map_or(true, |f| s.meta.matches(f)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    mod catalogue_tests {
        use super::*;

        #[test]
        fn test_ids_are_unique() {
            let all = catalogue();
            let ids: HashSet<&str> = all.iter().map(|s| s.meta.id).collect();
            assert_eq!(ids.len(), all.len());
        }

        #[test]
        fn test_every_scenario_is_tagged() {
            for s in catalogue() {
                assert!(!s.meta.tags.is_empty(), "{}", s.meta.id);
                assert!(
                    s.meta.has_tag(Tag::Smoke) ^ s.meta.has_tag(Tag::Regression),
                    "{} must be smoke or regression",
                    s.meta.id
                );
            }
        }

        #[test]
        fn test_smoke_set() {
            let all = catalogue();
            let smoke: Vec<&str> = select(&all, &[Tag::Smoke], None)
                .iter()
                .map(|s| s.meta.id)
                .collect();
            assert_eq!(
                smoke,
                vec![
                    "TC-AUTH-VIEW-001",
                    "TC-AUTH-001",
                    "TC-AUTH-002",
                    "TC-AUTH-VIEW-002",
                    "TC-AUTH-010",
                    "TC-EVT-001",
                    "TC-REG-001",
                ]
            );
        }
    }

    mod select_tests {
        use super::*;

        #[test]
        fn test_no_criteria_selects_all() {
            let all = catalogue();
            assert_eq!(select(&all, &[], None).len(), all.len());
        }

        #[test]
        fn test_tags_are_any_of() {
            let all = catalogue();
            let picked = select(&all, &[Tag::Events, Tag::Registration], None);
            assert!(picked
                .iter()
                .all(|s| s.meta.has_tag(Tag::Events) || s.meta.has_tag(Tag::Registration)));
            assert!(picked.iter().any(|s| s.meta.id == "TC-PW-001"));
        }

        #[test]
        fn test_filter_and_tags_combine() {
            let all = catalogue();
            let picked = select(&all, &[Tag::Smoke], Some("login"));
            let ids: Vec<&str> = picked.iter().map(|s| s.meta.id).collect();
            assert_eq!(ids, vec!["TC-AUTH-VIEW-001", "TC-AUTH-001", "TC-AUTH-002"]);
        }
    }
}
