//! Server-side data of the simulated application: accounts, categories,
//! events and event registrations, seeded the way the application's
//! database seeder does it.

use crate::config::Role;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Events shown per listing page
pub const PAGE_SIZE: usize = 12;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Registered account
#[derive(Debug, Clone)]
pub struct User {
    /// Account id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Login e-mail
    pub email: String,
    /// Password (plain; the simulation has no hashing)
    pub password: String,
    /// Role
    pub role: Role,
}

/// Event category
#[derive(Debug, Clone)]
pub struct Category {
    /// Category id
    pub id: u64,
    /// Display name
    pub name: String,
}

/// Publication state of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Listed and open for registration
    Active,
    /// Hidden from the listing, registration closed
    Archived,
}

/// Event
#[derive(Debug, Clone)]
pub struct Event {
    /// Event id
    pub id: u64,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Category
    pub category_id: u64,
    /// Start
    pub start: NaiveDateTime,
    /// End
    pub end: Option<NaiveDateTime>,
    /// Location
    pub place: String,
    /// Price in cents
    pub price_cents: u32,
    /// Seats
    pub capacity: u32,
    /// Publication state
    pub status: EventStatus,
}

impl Event {
    /// Whether the event costs nothing
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.price_cents == 0
    }

    /// Price as shown on the details screen
    #[must_use]
    pub fn price_label(&self) -> String {
        if self.is_free() {
            "Free".to_string()
        } else {
            format!("TND {}.{:02}", self.price_cents / 100, self.price_cents % 100)
        }
    }
}

/// A user's seat at an event
#[derive(Debug, Clone)]
pub struct Registration {
    /// Registered user
    pub user_id: u64,
    /// Event
    pub event_id: u64,
    /// Sequence number, newest highest
    pub seq: u64,
}

/// Listing filters from the home screen query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    /// Category id
    pub category_id: Option<u64>,
    /// Day of week the event starts on
    pub weekday: Option<Weekday>,
}

/// All server-side data
#[derive(Debug, Clone)]
pub struct AppState {
    users: Vec<User>,
    categories: Vec<Category>,
    events: Vec<Event>,
    registrations: Vec<Registration>,
    next_seq: u64,
}

impl AppState {
    /// Seeded data with event dates relative to `today`
    #[must_use]
    pub fn seeded(today: NaiveDate) -> Self {
        let mut state = Self {
            users: Vec::new(),
            categories: Vec::new(),
            events: Vec::new(),
            registrations: Vec::new(),
            next_seq: 1,
        };

        state.add_user("Admin", "admin@eventplanner.com", "admin123", Role::Admin);
        let manager = state.add_user("Manager", "manager@eventplanner.com", "manager123", Role::Manager);
        state.add_user("John Doe", "user@eventplanner.com", "user123", Role::User);

        for (i, name) in ["Technology", "Business", "Arts & Culture", "Sports", "Education"]
            .into_iter()
            .enumerate()
        {
            state.categories.push(Category {
                id: i as u64 + 1,
                name: name.to_string(),
            });
        }

        let at = |days: i64, hour: u32, minute: u32| -> NaiveDateTime {
            let date = if days >= 0 {
                today.checked_add_days(Days::new(days as u64))
            } else {
                today.checked_sub_days(Days::new(days.unsigned_abs()))
            };
            date.unwrap_or(today)
                .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default())
        };

        let seed = [
            ("Tech Conference 2024", "Join us for the biggest technology conference of the year featuring industry leaders and innovative startups.", 1, at(30, 9, 0), Some(at(32, 17, 0)), "Convention Center, Downtown", 29_999, 500, EventStatus::Active),
            ("Free Coding Workshop", "Learn web development basics in this free hands-on workshop. Perfect for beginners!", 1, at(15, 14, 0), Some(at(15, 17, 0)), "Community Center", 0, 50, EventStatus::Active),
            ("Business Networking Event", "Connect with local entrepreneurs and business professionals over drinks and appetizers.", 2, at(20, 18, 30), Some(at(20, 21, 30)), "Grand Hotel Ballroom", 4_999, 200, EventStatus::Active),
            ("Art Gallery Opening", "Exhibition featuring contemporary artists from around the region. Free admission.", 3, at(10, 19, 0), Some(at(45, 19, 0)), "Modern Art Museum", 0, 300, EventStatus::Active),
            ("Marathon Run", "Annual city marathon with multiple race categories. Register early for best prices!", 4, at(60, 7, 0), Some(at(60, 13, 0)), "City Park", 7_500, 1000, EventStatus::Active),
            ("Data Science Masterclass", "An intensive one-seat mentoring session with a senior data scientist.", 5, at(90, 10, 0), None, "Innovation Hub", 15_000, 1, EventStatus::Active),
            ("Winter Gala 2023", "Annual winter celebration. This edition has ended.", 2, at(-40, 20, 0), None, "Grand Hotel Ballroom", 9_000, 150, EventStatus::Archived),
        ];
        for (i, (title, description, category_id, start, end, place, price_cents, capacity, status)) in
            seed.into_iter().enumerate()
        {
            state.events.push(Event {
                id: i as u64 + 1,
                title: title.to_string(),
                description: description.to_string(),
                category_id,
                start,
                end,
                place: place.to_string(),
                price_cents,
                capacity,
                status,
            });
        }

        // the masterclass starts out full
        state.register(manager, 6);
        state
    }

    /// Create an account and return its id
    pub fn add_user(&mut self, name: &str, email: &str, password: &str, role: Role) -> u64 {
        let id = self.users.len() as u64 + 1;
        self.users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        });
        id
    }

    /// Account by id
    #[must_use]
    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Account by e-mail (case-insensitive)
    #[must_use]
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Account matching both e-mail and password
    #[must_use]
    pub fn authenticate(&self, email: &str, password: &str) -> Option<&User> {
        self.user_by_email(email).filter(|u| u.password == password)
    }

    /// All categories
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category by id
    #[must_use]
    pub fn category(&self, id: u64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// All events, any status
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Event by id
    #[must_use]
    pub fn event(&self, id: u64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Active events matching `filter`, soonest first
    #[must_use]
    pub fn listing(&self, filter: &ListingFilter) -> Vec<&Event> {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let mut events: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.status == EventStatus::Active)
            .filter(|e| {
                needle.as_ref().map_or(true, |n| {
                    e.title.to_lowercase().contains(n) || e.description.to_lowercase().contains(n)
                })
            })
            .filter(|e| filter.category_id.map_or(true, |c| e.category_id == c))
            .filter(|e| {
                filter
                    .weekday
                    .map_or(true, |d| chrono::Datelike::weekday(&e.start) == d)
            })
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    /// Seats taken
    #[must_use]
    pub fn registered_count(&self, event_id: u64) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count()
    }

    /// Whether every seat is taken
    #[must_use]
    pub fn is_full(&self, event: &Event) -> bool {
        self.registered_count(event.id) >= event.capacity as usize
    }

    /// Whether the user holds a seat
    #[must_use]
    pub fn is_registered(&self, user_id: u64, event_id: u64) -> bool {
        self.registrations
            .iter()
            .any(|r| r.user_id == user_id && r.event_id == event_id)
    }

    /// Take a seat (no checks)
    pub fn register(&mut self, user_id: u64, event_id: u64) {
        self.registrations.push(Registration {
            user_id,
            event_id,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Release a seat; `false` when the user held none
    pub fn unregister(&mut self, user_id: u64, event_id: u64) -> bool {
        let before = self.registrations.len();
        self.registrations
            .retain(|r| !(r.user_id == user_id && r.event_id == event_id));
        self.registrations.len() != before
    }

    /// The user's registered events, newest registration first
    #[must_use]
    pub fn registrations_of(&self, user_id: u64) -> Vec<&Event> {
        let mut mine: Vec<&Registration> = self
            .registrations
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        mine.sort_by_key(|r| std::cmp::Reverse(r.seq));
        mine.into_iter()
            .filter_map(|r| self.event(r.event_id))
            .collect()
    }
}
