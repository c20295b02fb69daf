//! Protected dashboard sections.
//!
//! Each section is a placeholder screen reachable from the dashboard and the
//! site navigation. They differ only by path, title and summary.

#[cfg(test)]
#[path = "sections_test.rs"]
mod sections_test;

use leptos::prelude::*;
use leptos_router::components::A;

#[derive(Debug, PartialEq, Eq)]
pub struct Section {
    pub path: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
}

impl Section {
    /// Router segment for this section, so routes and links share one path.
    #[must_use]
    pub fn segment(&self) -> &'static str {
        self.path.trim_start_matches('/')
    }
}

pub static TIMETABLE: Section =
    Section { path: "/timetable", title: "Timetable", summary: "Bell schedules for each school day." };
pub static ANNOUNCEMENTS: Section =
    Section { path: "/announcements", title: "Announcements", summary: "Scheduled and live campus announcements." };
pub static DEVICES: Section =
    Section { path: "/devices", title: "Devices", summary: "Control units and speakers on campus." };
pub static USERS: Section = Section { path: "/users", title: "Users", summary: "Staff accounts and their roles." };
pub static ALERTS: Section =
    Section { path: "/alerts", title: "Alerts", summary: "Emergency alerts and their history." };
pub static SETTINGS: Section =
    Section { path: "/settings", title: "Settings", summary: "Organization and account preferences." };

/// Navigation order.
pub static SECTIONS: [&Section; 6] = [&TIMETABLE, &ANNOUNCEMENTS, &DEVICES, &USERS, &ALERTS, &SETTINGS];


#[component]
pub fn SectionPage(section: &'static Section) -> impl IntoView {
    view! {
        <div class="section-page">
            <A href="/dashboard">"Back to dashboard"</A>
            <h1>{section.title}</h1>
            <p>{section.summary}</p>
        </div>
    }
}
