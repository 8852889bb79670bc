//! Request handling of the simulated application.
//!
//! One function, [`handle`], maps a request plus the session cookie onto a
//! rendered page or a redirect. Redirect-after-post carries flash banners,
//! validation errors and old input in the cookie until the next render.

use super::dom::Document;
use super::state::{AppState, ListingFilter, MIN_PASSWORD_LEN, PAGE_SIZE};
use super::views::{self, Flash, PageContext, SeatAction};
use crate::config::Role;
use chrono::Weekday;
use url::form_urlencoded;

/// Registration banner
pub const MSG_REGISTERED: &str = "Registration succeeded !";
/// Unregistration banner
pub const MSG_UNREGISTERED: &str = "Unregistration succeeded.";
/// Sign-up banner shown on the login screen
pub const MSG_SIGNED_UP: &str = "Registration succeeded ! You can now login.";
/// Failed credential check
pub const MSG_BAD_CREDENTIALS: &str = "Invalid email or password";
/// Registration refused for lack of seats
pub const MSG_EVENT_FULL: &str = "Sorry, this event is full.";
/// Second registration for the same event
pub const MSG_ALREADY_REGISTERED: &str = "You are already registered for this event.";
/// Unregistration without a seat
pub const MSG_NOT_REGISTERED: &str = "You are not registered for this event.";

/// HTTP method after `_method` override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE (form override)
    Delete,
}

/// Incoming request
#[derive(Debug, Clone)]
pub struct Request {
    /// Method
    pub method: Method,
    /// Path without query
    pub path: String,
    /// Decoded query pairs
    pub query: Vec<(String, String)>,
    /// Decoded form pairs
    pub form: Vec<(String, String)>,
}

impl Request {
    /// GET with query pairs
    #[must_use]
    pub fn get(path: &str, query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            query,
            form: Vec::new(),
        }
    }

    /// Form submission; a `_method` field overrides POST
    #[must_use]
    pub fn submit(path: &str, form: Vec<(String, String)>) -> Self {
        let method = match form.iter().find(|(k, _)| k == "_method") {
            Some((_, m)) if m.eq_ignore_ascii_case("delete") => Method::Delete,
            _ => Method::Post,
        };
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            form,
        }
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    fn field(&self, name: &str) -> &str {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map_or("", |(_, v)| v.as_str())
    }
}

/// Outcome of a request
#[derive(Debug)]
pub enum Response {
    /// Rendered page
    Page(Document),
    /// Location to load next
    Redirect(String),
}

/// Per-browser server session
#[derive(Debug, Clone, Default)]
pub struct SessionCookie {
    /// Signed-in account
    pub user_id: Option<u64>,
    flash: Option<Flash>,
    errors: Vec<(String, String)>,
    old: Vec<(String, String)>,
    intended: Option<String>,
}

impl SessionCookie {
    fn flash(&mut self, flash: Flash) {
        self.flash = Some(flash);
    }
}

/// Loose RFC 5322 shape: one `@`, non-empty local part, dotted domain
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    value.parse().ok()
}

fn landing(role: Role) -> &'static str {
    if role.is_staff() {
        "/admin/events"
    } else {
        "/home"
    }
}

/// Serve one request
pub fn handle(state: &mut AppState, cookie: &mut SessionCookie, req: &Request) -> Response {
    // a session pointing at a vanished account is signed out
    if cookie.user_id.is_some_and(|id| state.user(id).is_none()) {
        cookie.user_id = None;
    }

    let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
    match (req.method, segments.as_slice()) {
        (Method::Get, [""]) => Response::Redirect("/home".to_string()),
        (Method::Get, ["home"]) => home(state, cookie, req),
        (Method::Get, ["events", id]) => with_event(state, cookie, id, show_event),
        (Method::Post, ["events", id, "register"]) => {
            with_event(state, cookie, id, |state, cookie, event_id| {
                authenticated(cookie, &format!("/events/{event_id}"), |cookie, user_id| {
                    register_seat(state, cookie, user_id, event_id)
                })
            })
        }
        (Method::Delete, ["events", id, "unregister"]) => {
            with_event(state, cookie, id, |state, cookie, event_id| {
                authenticated(cookie, &format!("/events/{event_id}"), |cookie, user_id| {
                    release_seat(state, cookie, user_id, event_id)
                })
            })
        }
        (Method::Get, ["login"]) => guest_only(state, cookie, views::login),
        (Method::Post, ["login"]) => login(state, cookie, req),
        (Method::Get, ["register"]) => guest_only(state, cookie, views::register),
        (Method::Post, ["register"]) => sign_up(state, cookie, req),
        (Method::Post, ["logout"]) => {
            *cookie = SessionCookie::default();
            Response::Redirect("/login".to_string())
        }
        (Method::Get, ["my-registrations"]) => {
            authenticated(cookie, "/my-registrations", |cookie, user_id| {
                let events = state.registrations_of(user_id);
                render(state, cookie, |ctx| views::my_registrations(ctx, &events))
            })
        }
        (Method::Get, ["admin", "events"]) => authenticated(cookie, "/admin/events", |cookie, _| {
            render(state, cookie, |ctx| views::admin_events(ctx, state))
        }),
        (Method::Get, ["profile"]) => authenticated(cookie, "/profile", |cookie, user_id| {
            match state.user(user_id) {
                Some(user) => render(state, cookie, |ctx| views::profile(ctx, user)),
                None => Response::Redirect("/login".to_string()),
            }
        }),
        (_, path) if known_path(path) => {
            Response::Page(views::error_page(405, "Method Not Allowed"))
        }
        _ => Response::Page(views::error_page(404, "Not Found")),
    }
}

fn known_path(segments: &[&str]) -> bool {
    matches!(
        segments,
        [""] | ["home"]
            | ["login"]
            | ["register"]
            | ["logout"]
            | ["my-registrations"]
            | ["profile"]
            | ["admin", "events"]
            | ["events", _]
            | ["events", _, "register" | "unregister"]
    )
}

/// Render a page, consuming the flash data carried by the cookie
fn render(
    state: &AppState,
    cookie: &mut SessionCookie,
    view: impl FnOnce(&PageContext<'_>) -> Document,
) -> Response {
    let ctx = PageContext {
        user: cookie.user_id.and_then(|id| state.user(id)),
        flash: cookie.flash.take(),
        errors: std::mem::take(&mut cookie.errors),
        old: std::mem::take(&mut cookie.old),
    };
    Response::Page(view(&ctx))
}

fn authenticated(
    cookie: &mut SessionCookie,
    here: &str,
    then: impl FnOnce(&mut SessionCookie, u64) -> Response,
) -> Response {
    match cookie.user_id {
        Some(user_id) => then(cookie, user_id),
        None => {
            cookie.intended = Some(here.to_string());
            Response::Redirect("/login".to_string())
        }
    }
}

fn guest_only(
    state: &AppState,
    cookie: &mut SessionCookie,
    view: fn(&PageContext<'_>) -> Document,
) -> Response {
    if let Some(user) = cookie.user_id.and_then(|id| state.user(id)) {
        return Response::Redirect(landing(user.role).to_string());
    }
    render(state, cookie, view)
}

fn with_event(
    state: &mut AppState,
    cookie: &mut SessionCookie,
    id: &str,
    then: impl FnOnce(&mut AppState, &mut SessionCookie, u64) -> Response,
) -> Response {
    match id.parse::<u64>() {
        Ok(event_id) if state.event(event_id).is_some() => then(state, cookie, event_id),
        _ => Response::Page(views::error_page(404, "Not Found")),
    }
}

// =============================================================================
// EVENTS
// =============================================================================

fn home(state: &AppState, cookie: &mut SessionCookie, req: &Request) -> Response {
    let filter = ListingFilter {
        search: req.param("search").map(str::to_string),
        category_id: req.param("category_id").and_then(|c| c.parse().ok()),
        weekday: req.param("weekday").and_then(parse_weekday),
    };
    let page: usize = req
        .param("page")
        .and_then(|p| p.parse().ok())
        .filter(|&p| p > 0)
        .unwrap_or(1);

    let listed = state.listing(&filter);
    let start = (page - 1) * PAGE_SIZE;
    let shown: Vec<_> = listed.iter().skip(start).take(PAGE_SIZE).copied().collect();
    let next_page = (listed.len() > start + PAGE_SIZE).then(|| {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (k, v) in req.query.iter().filter(|(k, _)| k != "page") {
            query.append_pair(k, v);
        }
        query.append_pair("page", &(page + 1).to_string());
        format!("/home?{}", query.finish())
    });

    render(state, cookie, |ctx| {
        views::home(ctx, state, &filter, &shown, next_page)
    })
}

fn show_event(state: &mut AppState, cookie: &mut SessionCookie, event_id: u64) -> Response {
    let state = &*state;
    let Some(event) = state.event(event_id) else {
        return Response::Page(views::error_page(404, "Not Found"));
    };
    let action = match cookie.user_id {
        _ if event.status == super::state::EventStatus::Archived => SeatAction::Closed,
        None => SeatAction::LoginFirst,
        Some(user_id) if state.is_registered(user_id, event_id) => SeatAction::Unregister,
        Some(_) if state.is_full(event) => SeatAction::Full,
        Some(_) => SeatAction::Register,
    };
    render(state, cookie, |ctx| {
        views::event_details(ctx, state, event, action)
    })
}

fn register_seat(
    state: &mut AppState,
    cookie: &mut SessionCookie,
    user_id: u64,
    event_id: u64,
) -> Response {
    let full = state.event(event_id).map_or(true, |e| state.is_full(e));
    if full {
        cookie.flash(Flash::Error(MSG_EVENT_FULL.to_string()));
    } else if state.is_registered(user_id, event_id) {
        cookie.flash(Flash::Error(MSG_ALREADY_REGISTERED.to_string()));
    } else {
        state.register(user_id, event_id);
        cookie.flash(Flash::Success(MSG_REGISTERED.to_string()));
    }
    Response::Redirect(format!("/events/{event_id}"))
}

fn release_seat(
    state: &mut AppState,
    cookie: &mut SessionCookie,
    user_id: u64,
    event_id: u64,
) -> Response {
    if state.unregister(user_id, event_id) {
        cookie.flash(Flash::Success(MSG_UNREGISTERED.to_string()));
    } else {
        cookie.flash(Flash::Error(MSG_NOT_REGISTERED.to_string()));
    }
    Response::Redirect(format!("/events/{event_id}"))
}

// =============================================================================
// AUTH
// =============================================================================

type FieldErrors = Vec<(String, String)>;

fn push(errors: &mut FieldErrors, field: &str, message: String) {
    errors.push((field.to_string(), message));
}

fn require(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        push(errors, field, format!("The {field} field is required."));
        return false;
    }
    true
}

fn check_email(errors: &mut FieldErrors, value: &str) -> bool {
    if !require(errors, "email", value) {
        return false;
    }
    if !is_valid_email(value.trim()) {
        push(errors, "email", "The email field must be a valid email address.".to_string());
        return false;
    }
    true
}

fn back_with(
    cookie: &mut SessionCookie,
    to: &str,
    errors: FieldErrors,
    old: Vec<(String, String)>,
) -> Response {
    cookie.errors = errors;
    cookie.old = old;
    Response::Redirect(to.to_string())
}

fn login(state: &AppState, cookie: &mut SessionCookie, req: &Request) -> Response {
    let email = req.field("email").trim();
    let password = req.field("password");
    let old = vec![("email".to_string(), email.to_string())];

    let mut errors = FieldErrors::new();
    check_email(&mut errors, email);
    require(&mut errors, "password", password);
    if !errors.is_empty() {
        return back_with(cookie, "/login", errors, old);
    }

    match state.authenticate(email, password) {
        Some(user) => {
            cookie.user_id = Some(user.id);
            let to = cookie
                .intended
                .take()
                .unwrap_or_else(|| landing(user.role).to_string());
            Response::Redirect(to)
        }
        None => back_with(
            cookie,
            "/login",
            vec![("email".to_string(), MSG_BAD_CREDENTIALS.to_string())],
            old,
        ),
    }
}

fn sign_up(state: &mut AppState, cookie: &mut SessionCookie, req: &Request) -> Response {
    let name = req.field("name").trim();
    let email = req.field("email").trim();
    let password = req.field("password");
    let confirmation = req.field("password_confirmation");
    let old = vec![
        ("name".to_string(), name.to_string()),
        ("email".to_string(), email.to_string()),
    ];

    let mut errors = FieldErrors::new();
    require(&mut errors, "name", name);
    if check_email(&mut errors, email) && state.user_by_email(email).is_some() {
        push(&mut errors, "email", "The email has already been taken.".to_string());
    }
    if require(&mut errors, "password", password) {
        if password.chars().count() < MIN_PASSWORD_LEN {
            push(
                &mut errors,
                "password",
                format!("The password field must be at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        if password != confirmation {
            push(
                &mut errors,
                "password",
                "The password field confirmation does not match.".to_string(),
            );
        }
    }
    if !errors.is_empty() {
        return back_with(cookie, "/register", errors, old);
    }

    state.add_user(name, email, password, Role::User);
    cookie.flash(Flash::Success(MSG_SIGNED_UP.to_string()));
    Response::Redirect("/login".to_string())
}
