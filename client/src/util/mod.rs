//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules keep routing and validation rules out of components so they
//! can be tested without a browser.

pub mod auth;
pub mod password;
