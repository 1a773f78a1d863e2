//! `presence-monitor` library crate.
//!
//! The live capture loop: acquire a camera stream, sample a frame every
//! tick, submit it for recognition, and render the returned faces as
//! overlays scaled to the current display. The binary entrypoint lives
//! in `main.rs`.

pub mod camera;
pub mod config;
pub mod display;
pub mod frame;
pub mod names;
pub mod recognizer;
pub mod session;

pub use session::{CaptureSession, CaptureSettings, MonitorError};
