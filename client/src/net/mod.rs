//! Identity networking: provider capability, wire types, and adapters.
//!
//! SYSTEM CONTEXT
//! ==============
//! `identity` defines what the session store needs from an identity provider,
//! `gotrue` implements it over the GoTrue REST API, and `types` holds the
//! identity DTOs shared with pages.

pub mod gotrue;
pub mod identity;
pub mod types;
