//! Domain types and rules for the SmartPresence live monitor.
//!
//! Everything in this crate is synchronous and free of I/O: frame
//! geometry, detection identity, overlay styling, correlation ids,
//! class-name extraction, and attendance report shapes. The HTTP client
//! and the capture loop build on top of it.

pub mod attendance;
pub mod class_name;
pub mod correlation;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod types;
