//! API handlers for the admin gate.
//!
//! `auth` holds everything session related; the rest are small public routes.

pub mod auth;
pub mod health;
pub mod root;
pub mod setup;
