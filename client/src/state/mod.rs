//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `auth` owns the session store. Everything else on the site is stateless
//! page content.

pub mod auth;
