//! Page templates of the simulated application.
//!
//! Markup carries the same classes, names and form actions the real
//! application renders, so screen-object locators resolve identically.

use super::dom::{Document, El, NodeId};
use super::state::{AppState, Event, EventStatus, ListingFilter, User};

/// One-shot banner carried to the next rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    /// `.alert-success`
    Success(String),
    /// `.alert-error`
    Error(String),
}

/// Per-request data shared by every template
#[derive(Debug, Default)]
pub struct PageContext<'a> {
    /// Signed-in account
    pub user: Option<&'a User>,
    /// Banner from the previous request
    pub flash: Option<Flash>,
    /// Validation errors by field, in rule order
    pub errors: Vec<(String, String)>,
    /// Previously submitted input (never passwords)
    pub old: Vec<(String, String)>,
}

impl PageContext<'_> {
    fn old(&self, field: &str) -> String {
        self.old
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }
}

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

// =============================================================================
// LAYOUT
// =============================================================================

fn layout(title: &str, ctx: &PageContext<'_>, with_header: bool) -> (Document, NodeId) {
    let mut doc = Document::new(title);
    let root = doc.root();
    if with_header {
        header(&mut doc, root, ctx.user);
    }
    let main = doc.append(root, El::new("main"));
    (doc, main)
}

fn header(doc: &mut Document, root: NodeId, user: Option<&User>) {
    let header = doc.append(root, El::new("header").class("header"));
    let logo = doc.append(header, El::new("a").class("logo").attr("href", "/home"));
    doc.append(logo, El::new("span").text("AAB"));
    doc.append(logo, El::new("span").text("Event Planner"));
    let buttons = doc.append(header, El::new("div").class("auth-buttons"));

    let Some(user) = user else {
        doc.append(
            buttons,
            El::new("a").class("btn").class("btn-outline").attr("href", "/login").text("Login"),
        );
        doc.append(
            buttons,
            El::new("a").class("btn").class("btn-primary").attr("href", "/register").text("Signup"),
        );
        return;
    };

    let dropdown = doc.append(buttons, El::new("div").class("user-dropdown").attr("id", "userDropdown"));
    let toggle = doc.append(
        dropdown,
        El::new("button")
            .class("user-dropdown-toggle")
            .attr("type", "button")
            .attr("data-toggle", ".user-dropdown-menu"),
    );
    doc.append(toggle, El::new("span").class("user-name").text(user.name.clone()));
    doc.append(toggle, El::new("span").class("user-email").text(user.email.clone()));

    let menu = doc.append(dropdown, El::new("div").class("user-dropdown-menu").hidden());
    doc.append(menu, El::new("a").class("user-dropdown-item").attr("href", "/profile").text("View profile"));
    doc.append(
        menu,
        El::new("a").class("user-dropdown-item").attr("href", "/my-registrations").text("Registrations"),
    );
    if user.role.is_staff() {
        let label = if user.role == crate::config::Role::Admin {
            "Admin Panel"
        } else {
            "Manager Panel"
        };
        doc.append(
            menu,
            El::new("a").class("user-dropdown-item").class("admin").attr("href", "/admin/events").text(label),
        );
    }
    let logout = doc.append(menu, El::new("form").attr("action", "/logout").attr("method", "POST"));
    doc.append(
        logout,
        El::new("button").class("user-dropdown-item").class("logout").attr("type", "submit").text("Log out"),
    );
}

fn banners(doc: &mut Document, parent: NodeId, ctx: &PageContext<'_>) {
    match &ctx.flash {
        Some(Flash::Success(msg)) => {
            doc.append(parent, El::new("div").class("alert").class("alert-success").text(msg.clone()));
        }
        Some(Flash::Error(msg)) => {
            doc.append(parent, El::new("div").class("alert").class("alert-error").text(msg.clone()));
        }
        None => {}
    }
    if !ctx.errors.is_empty() {
        let alert = doc.append(parent, El::new("div").class("alert").class("alert-error"));
        let list = doc.append(alert, El::new("ul"));
        for (_, msg) in &ctx.errors {
            doc.append(list, El::new("li").text(msg.clone()));
        }
    }
}

fn card_date(event: &Event) -> String {
    event.start.format("%A, %B %d, %-I:%M %p").to_string()
}

fn event_card(doc: &mut Document, grid: NodeId, event: &Event) -> NodeId {
    let card = doc.append(
        grid,
        El::new("div")
            .class("event-card")
            .attr("data-href", format!("/events/{}", event.id)),
    );
    let image = doc.append(card, El::new("div").class("event-image"));
    if event.is_free() {
        doc.append(image, El::new("div").class("event-free-badge").text("FREE"));
    }
    let details = doc.append(card, El::new("div").class("event-details"));
    doc.append(details, El::new("h3").class("event-title").text(event.title.clone()));
    doc.append(details, El::new("p").class("event-meta").text(card_date(event)));
    doc.append(details, El::new("p").class("event-meta").text(event.place.clone()));
    details
}

// =============================================================================
// AUTH SCREENS
// =============================================================================

fn auth_shell(
    title: &str,
    heading: &str,
    aside: (&str, &str, &str),
    ctx: &PageContext<'_>,
) -> (Document, NodeId) {
    let (mut doc, main) = layout(title, ctx, false);
    let container = doc.append(main, El::new("div").class("auth-container"));

    let left = doc.append(container, El::new("div").class("auth-left"));
    let left = doc.append(left, El::new("div").class("auth-left-content"));
    doc.append(left, El::new("h1").text(aside.0));
    doc.append(left, El::new("p").text("To keep connected with us provide us with your information"));
    doc.append(left, El::new("a").class("auth-left-btn").attr("href", aside.1).text(aside.2));

    let right = doc.append(container, El::new("div").class("auth-right"));
    let form_box = doc.append(right, El::new("div").class("auth-form-container"));
    let brand = doc.append(form_box, El::new("div").class("auth-brand"));
    doc.append(brand, El::new("span").text("AAB"));
    doc.append(brand, El::new("span").text("Event Planner"));
    doc.append(form_box, El::new("h2").class("auth-title").text(heading));
    banners(&mut doc, form_box, ctx);
    (doc, form_box)
}

fn form_field(
    doc: &mut Document,
    form: NodeId,
    label: &str,
    input: El,
    error: Option<&str>,
) {
    let group = doc.append(form, El::new("div").class("form-group"));
    doc.append(group, El::new("label").class("form-label").text(label));
    doc.append(group, input.class("form-input").flag("required"));
    if let Some(msg) = error {
        doc.append(group, El::new("span").class("form-error").text(msg));
    }
}

/// `GET /login`
#[must_use]
pub fn login(ctx: &PageContext<'_>) -> Document {
    let (mut doc, container) = auth_shell(
        "Login - Event Planner",
        "Sign In to Event Planner",
        ("Welcome Back", "/register", "Register"),
        ctx,
    );
    let form = doc.append(container, El::new("form").attr("action", "/login").attr("method", "POST"));
    form_field(
        &mut doc,
        form,
        "Your email",
        El::new("input").attr("type", "email").attr("name", "email").attr("value", ctx.old("email")),
        ctx.field_error("email"),
    );
    form_field(
        &mut doc,
        form,
        "Your password",
        El::new("input").attr("type", "password").attr("name", "password").attr("value", ""),
        ctx.field_error("password"),
    );
    doc.append(form, El::new("button").class("btn-submit").attr("type", "submit").text("Login"));
    doc
}

/// `GET /register`
#[must_use]
pub fn register(ctx: &PageContext<'_>) -> Document {
    let (mut doc, container) = auth_shell(
        "Register - Event Planner",
        "Sign Up to Event Planner",
        ("Hello friend", "/login", "Login"),
        ctx,
    );
    let form = doc.append(container, El::new("form").attr("action", "/register").attr("method", "POST"));
    form_field(
        &mut doc,
        form,
        "Your name",
        El::new("input").attr("type", "text").attr("name", "name").attr("value", ctx.old("name")),
        ctx.field_error("name"),
    );
    form_field(
        &mut doc,
        form,
        "Your email",
        El::new("input").attr("type", "email").attr("name", "email").attr("value", ctx.old("email")),
        ctx.field_error("email"),
    );
    form_field(
        &mut doc,
        form,
        "Password",
        El::new("input").attr("type", "password").attr("name", "password").attr("value", ""),
        ctx.field_error("password"),
    );
    form_field(
        &mut doc,
        form,
        "Confirm password",
        El::new("input")
            .attr("type", "password")
            .attr("name", "password_confirmation")
            .attr("value", ""),
        None,
    );
    doc.append(form, El::new("button").class("btn-submit").attr("type", "submit").text("Register"));
    doc
}

// =============================================================================
// EVENT SCREENS
// =============================================================================

/// `GET /home`
#[must_use]
pub fn home(
    ctx: &PageContext<'_>,
    state: &AppState,
    filter: &ListingFilter,
    events: &[&Event],
    next_page: Option<String>,
) -> Document {
    let (mut doc, main) = layout("Home - Event Planner", ctx, true);
    let container = doc.append(main, El::new("div").class("container"));
    let hero = doc.append(container, El::new("div").class("hero"));
    doc.append(hero, El::new("h1").class("hero-title").text("Made for those who do"));

    let section = doc.append(container, El::new("section").class("events-section"));
    let head = doc.append(section, El::new("div").class("events-header"));
    doc.append(head, El::new("h2").class("events-title").text("Events"));

    let form = doc.append(
        head,
        El::new("form")
            .class("filters")
            .attr("id", "filterForm")
            .attr("action", "/home")
            .attr("method", "GET"),
    );
    let search_box = doc.append(form, El::new("div").class("search-box"));
    doc.append(
        search_box,
        El::new("input")
            .attr("type", "text")
            .attr("name", "search")
            .attr("id", "searchInput")
            .attr("placeholder", "Search")
            .attr("value", filter.search.clone().unwrap_or_default()),
    );

    let weekday = doc.append(
        form,
        El::new("select")
            .class("filter-select")
            .attr("name", "weekday")
            .attr("value", "")
            .flag("data-autosubmit"),
    );
    doc.append(weekday, El::new("option").attr("value", "").text("Weekdays"));
    for day in WEEKDAYS {
        let mut label = day.to_string();
        label[..1].make_ascii_uppercase();
        doc.append(weekday, El::new("option").attr("value", day).text(label));
    }
    if let Some(d) = filter.weekday {
        doc.set_attr(weekday, "value", WEEKDAYS[d.num_days_from_monday() as usize]);
    }

    let category = doc.append(
        form,
        El::new("select")
            .class("filter-select")
            .attr("name", "category_id")
            .attr("id", "categoryFilter")
            .attr("value", filter.category_id.map(|c| c.to_string()).unwrap_or_default())
            .flag("data-autosubmit"),
    );
    doc.append(category, El::new("option").attr("value", "").text("Any category"));
    for c in state.categories() {
        doc.append(category, El::new("option").attr("value", c.id.to_string()).text(c.name.clone()));
    }

    let grid = doc.append(section, El::new("div").class("events-grid"));
    if events.is_empty() {
        let empty = doc.append(grid, El::new("div"));
        doc.append(empty, El::new("p").text("No events found. Check back later!"));
    }
    for event in events {
        event_card(&mut doc, grid, event);
    }

    if let Some(next) = next_page {
        let more = doc.append(section, El::new("div").class("load-more"));
        doc.append(more, El::new("a").class("load-more-btn").attr("href", next).text("Load more..."));
    }
    doc
}

/// What the registration area of the details screen offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAction {
    /// Guest: link to the login screen
    LoginFirst,
    /// Signed in, not registered, seats left
    Register,
    /// Signed in and registered
    Unregister,
    /// Signed in, not registered, no seats left
    Full,
    /// Archived event
    Closed,
}

/// `GET /events/{id}`
#[must_use]
pub fn event_details(
    ctx: &PageContext<'_>,
    state: &AppState,
    event: &Event,
    action: SeatAction,
) -> Document {
    let (mut doc, main) = layout(&format!("{} - Event Planner", event.title), ctx, true);
    let container = doc.append(main, El::new("div").class("container").class("event-show"));
    doc.append(container, El::new("a").attr("href", "/home").text("Back to Events"));

    let body = doc.append(container, El::new("div").class("event-body"));
    let image = doc.append(body, El::new("div").class("event-image"));
    if event.is_free() {
        doc.append(image, El::new("div").class("event-free-badge").text("FREE"));
    }

    let info = doc.append(body, El::new("div").class("event-info"));
    doc.append(info, El::new("h1").text(event.title.clone()));
    if let Some(category) = state.category(event.category_id) {
        doc.append(info, El::new("span").class("event-category").text(category.name.clone()));
    }
    if event.status == EventStatus::Archived {
        doc.append(info, El::new("span").class("event-archived").text("Archived Event"));
    }
    let description = doc.append(info, El::new("div").class("event-description"));
    doc.append(description, El::new("p").text(event.description.clone()));

    let facts = doc.append(info, El::new("div").class("event-facts"));
    doc.append(
        facts,
        El::new("div")
            .class("event-date")
            .text(event.start.format("%A, %B %d, %Y %-I:%M %p").to_string()),
    );
    if let Some(end) = event.end {
        doc.append(
            facts,
            El::new("div")
                .class("event-end-date")
                .text(end.format("%A, %B %d, %Y %-I:%M %p").to_string()),
        );
    }
    doc.append(facts, El::new("div").class("event-place").text(event.place.clone()));
    doc.append(facts, El::new("div").class("event-price").text(event.price_label()));
    doc.append(
        facts,
        El::new("div").class("event-capacity").text(format!(
            "{} / {} registered",
            state.registered_count(event.id),
            event.capacity
        )),
    );

    let status = doc.append(info, El::new("div").class("registration-status"));
    match action {
        SeatAction::Closed => {
            doc.append(
                status,
                El::new("div")
                    .class("registration-closed")
                    .text("This event has been archived. Registration is closed."),
            );
        }
        SeatAction::Unregister => {
            let form = doc.append(
                status,
                El::new("form")
                    .attr("action", format!("/events/{}/unregister", event.id))
                    .attr("method", "POST"),
            );
            doc.append(form, El::new("input").attr("type", "hidden").attr("name", "_method").attr("value", "DELETE"));
            doc.append(form, El::new("button").attr("type", "submit").text("Unregister from Event"));
        }
        SeatAction::Register => {
            let form = doc.append(
                status,
                El::new("form")
                    .attr("action", format!("/events/{}/register", event.id))
                    .attr("method", "POST"),
            );
            doc.append(form, El::new("button").attr("type", "submit").text("Register for Event"));
        }
        SeatAction::Full => {
            doc.append(
                status,
                El::new("button").flag("disabled").text("Event Full"),
            );
        }
        SeatAction::LoginFirst => {
            doc.append(
                status,
                El::new("a").attr("href", "/login").text("Login to Register"),
            );
        }
    }
    banners(&mut doc, info, ctx);
    doc
}

/// `GET /my-registrations`
#[must_use]
pub fn my_registrations(ctx: &PageContext<'_>, events: &[&Event]) -> Document {
    let (mut doc, main) = layout("My Registrations - Event Planner", ctx, true);
    let container = doc.append(main, El::new("div").class("container"));
    doc.append(container, El::new("h1").text("My Registrations"));
    banners(&mut doc, container, ctx);

    let grid = doc.append(container, El::new("div").class("events-grid"));
    if events.is_empty() {
        let empty = doc.append(grid, El::new("div"));
        doc.append(empty, El::new("p").text("You haven't registered for any events yet."));
        doc.append(empty, El::new("a").attr("href", "/home").text("Browse Events"));
    }
    for event in events {
        let details = event_card(&mut doc, grid, event);
        doc.append(details, El::new("p").class("event-meta").class("registered-badge").text("Registered"));
    }
    doc
}

/// `GET /admin/events`
#[must_use]
pub fn admin_events(ctx: &PageContext<'_>, state: &AppState) -> Document {
    let (mut doc, main) = layout("Events - Admin - Event Planner", ctx, true);
    let container = doc.append(main, El::new("div").class("container").class("admin"));
    doc.append(container, El::new("h1").class("page-title").text("Events"));
    let table = doc.append(container, El::new("table").class("admin-table"));
    for event in state.events() {
        let row = doc.append(table, El::new("tr").class("admin-event-row"));
        doc.append(row, El::new("td").text(event.title.clone()));
        doc.append(row, El::new("td").text(event.place.clone()));
        let status = match event.status {
            EventStatus::Active => "active",
            EventStatus::Archived => "archived",
        };
        doc.append(row, El::new("td").class("status").text(status));
    }
    doc
}

/// `GET /profile`
#[must_use]
pub fn profile(ctx: &PageContext<'_>, user: &User) -> Document {
    let (mut doc, main) = layout("Profile - Event Planner", ctx, true);
    let container = doc.append(main, El::new("div").class("container").class("profile"));
    doc.append(container, El::new("h1").class("page-title").text("Profile"));
    doc.append(container, El::new("div").class("profile-name").text(user.name.clone()));
    doc.append(container, El::new("div").class("profile-email").text(user.email.clone()));
    doc
}

/// Error page for unknown routes and methods
#[must_use]
pub fn error_page(status: u16, reason: &str) -> Document {
    let mut doc = Document::new(format!("{status} {reason}"));
    let root = doc.root();
    let main = doc.append(root, El::new("main").class("error-page"));
    doc.append(main, El::new("h1").text(format!("{status} | {reason}")));
    doc
}
