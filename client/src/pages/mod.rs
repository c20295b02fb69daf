//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates rendering details
//! to `components`. Public pages render for everyone; the rest are mounted
//! behind `ProtectedRoute` by the router in `app`.

pub mod dashboard;
pub mod login;
pub mod pricing;
pub mod sections;
pub mod signup;
pub mod welcome;
