//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` owns the one [`SessionStore`] for the page. During SSR the store is
//! never initialized, so protected routes render the loading placeholder and
//! the browser settles them after hydration.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::protected_route::ProtectedRoute;
use crate::components::site_nav::SiteNav;
use crate::config::PublicConfig;
use crate::net::identity::{AccountRegistrar, IdentityProvider, UnconfiguredProvider};
use crate::pages::dashboard::DashboardPage;
use crate::pages::login::LoginPage;
use crate::pages::pricing::PricingPage;
use crate::pages::sections::{ALERTS, ANNOUNCEMENTS, DEVICES, SETTINGS, Section, SectionPage, TIMETABLE, USERS};
use crate::pages::signup::SignupPage;
use crate::pages::welcome::WelcomePage;
use crate::state::auth::{AuthState, SessionStore};

/// Context handle for the page's session store.
pub type SessionHandle = StoredValue<SessionStore, LocalStorage>;

/// Context handle for account registration, used by the signup page.
pub type RegistrarHandle = StoredValue<Rc<dyn AccountRegistrar>, LocalStorage>;

/// HTML shell rendered on the server for SSR + hydration.
///
/// `config` is written into `<meta>` tags so the browser can rebuild the same
/// [`PublicConfig`] after hydration.
pub fn shell(options: LeptosOptions, config: PublicConfig) -> impl IntoView {
    let meta = config
        .meta_entries()
        .into_iter()
        .map(|(name, content)| view! { <meta name=name content=content/> })
        .collect_view();

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                {meta}
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Pick the identity backend for this render pass.
fn identity_backend(config: &PublicConfig) -> (Rc<dyn IdentityProvider>, Rc<dyn AccountRegistrar>) {
    #[cfg(feature = "hydrate")]
    {
        if config.is_identity_configured() {
            let gotrue = Rc::new(crate::net::gotrue::GoTrueProvider::new(config));
            let provider: Rc<dyn IdentityProvider> = gotrue.clone();
            let registrar: Rc<dyn AccountRegistrar> = gotrue;
            return (provider, registrar);
        }
        log::warn!("identity provider settings missing; sign-in disabled");
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = config;

    let unconfigured = Rc::new(UnconfiguredProvider);
    let provider: Rc<dyn IdentityProvider> = unconfigured.clone();
    let registrar: Rc<dyn AccountRegistrar> = unconfigured;
    (provider, registrar)
}

fn protected_section(section: &'static Section) -> impl IntoView {
    view! {
        <ProtectedRoute>
            <SectionPage section/>
        </ProtectedRoute>
    }
}

/// Root application component.
///
/// Provides the session store, its reactive mirror, and public settings, then
/// sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = PublicConfig::current();
    let (provider, registrar) = identity_backend(&config);
    let store = SessionStore::new(provider);

    // Reactive mirror of the store for guards and navigation.
    let auth = RwSignal::new(store.snapshot());
    store
        .watch(move |state| {
            let _ = auth.try_set(state.clone());
        })
        .detach();

    #[cfg(feature = "hydrate")]
    {
        store.subscribe_to_changes().detach();
        leptos::task::spawn_local(store.initialize());
    }

    let session: SessionHandle = StoredValue::new_local(store);
    let registrar: RegistrarHandle = StoredValue::new_local(registrar);
    on_cleanup(move || {
        session.try_with_value(SessionStore::teardown);
    });

    provide_context(config);
    provide_context::<RwSignal<AuthState>>(auth);
    provide_context(session);
    provide_context(registrar);

    view! {
        <Title text="TI-BOT"/>

        <Router>
            <SiteNav/>
            <main>
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=WelcomePage/>
                    <Route path=StaticSegment("pricing") view=PricingPage/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("signup") view=SignupPage/>
                    <Route
                        path=StaticSegment("dashboard")
                        view=|| view! { <ProtectedRoute><DashboardPage/></ProtectedRoute> }
                    />
                    <Route path=StaticSegment(TIMETABLE.segment()) view=|| protected_section(&TIMETABLE)/>
                    <Route path=StaticSegment(ANNOUNCEMENTS.segment()) view=|| protected_section(&ANNOUNCEMENTS)/>
                    <Route path=StaticSegment(DEVICES.segment()) view=|| protected_section(&DEVICES)/>
                    <Route path=StaticSegment(USERS.segment()) view=|| protected_section(&USERS)/>
                    <Route path=StaticSegment(ALERTS.segment()) view=|| protected_section(&ALERTS)/>
                    <Route path=StaticSegment(SETTINGS.segment()) view=|| protected_section(&SETTINGS)/>
                </Routes>
            </main>
        </Router>
    }
}
