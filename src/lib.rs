//! Session Auth library.
//!
//! Account registration, credential checks, opaque session tokens and
//! double-submit-cookie CSRF protection for a cookie-based web client.

pub mod auth;
pub mod config;
pub mod db;
pub mod web;
