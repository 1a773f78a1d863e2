//! HTTP client for the SmartPresence recognition backend.
//!
//! Provides typed request/response messages and a [`PresenceApi`] wrapper
//! around the backend's REST endpoints: frame recognition, subject and
//! visitor name lookup, class names, and attendance reports.

pub mod api;
pub mod messages;

pub use api::{PresenceApi, PresenceApiError};
