//! Monitor configuration loaded from environment variables.
//!
//! | Variable                        | Default                 |
//! |---------------------------------|-------------------------|
//! | `PRESENCE_API_URL`              | `http://127.0.0.1:8000` |
//! | `PRESENCE_REQUEST_TIMEOUT_SECS` | `10`                    |
//! | `CAPTURE_INTERVAL_MS`           | `2000`                  |
//! | `CAPTURE_JPEG_QUALITY`          | `85`                    |
//! | `CAMERA_SOURCE`                 | `synthetic`             |
//! | `DISPLAY_WIDTH`                 | `1280`                  |
//! | `DISPLAY_HEIGHT`                | `720`                   |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use presence_core::geometry::{DisplaySize, SOURCE_FRAME_HEIGHT, SOURCE_FRAME_WIDTH};

use crate::camera::StreamConstraints;
use crate::frame::DEFAULT_JPEG_QUALITY;
use crate::session::{CaptureSettings, DEFAULT_CAPTURE_INTERVAL};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const SYNTHETIC_SOURCE: &str = "synthetic";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    Synthetic,
    StillImage(PathBuf),
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub capture: CaptureSettings,
    pub camera: CameraSource,
    pub display: DisplaySize,
}

impl MonitorConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to read variables. Unset or empty variables
    /// take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = get("PRESENCE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs: u64 = parse_or(
            get("PRESENCE_REQUEST_TIMEOUT_SECS"),
            "PRESENCE_REQUEST_TIMEOUT_SECS",
            "a positive number of seconds",
            DEFAULT_REQUEST_TIMEOUT_SECS,
            |v| *v > 0,
        )?;

        let interval_ms: u64 = parse_or(
            get("CAPTURE_INTERVAL_MS"),
            "CAPTURE_INTERVAL_MS",
            "a positive number of milliseconds",
            DEFAULT_CAPTURE_INTERVAL.as_millis() as u64,
            |v| *v > 0,
        )?;

        let jpeg_quality: u8 = parse_or(
            get("CAPTURE_JPEG_QUALITY"),
            "CAPTURE_JPEG_QUALITY",
            "an integer between 1 and 100",
            DEFAULT_JPEG_QUALITY,
            |v| (1..=100).contains(v),
        )?;

        let camera = match get("CAMERA_SOURCE") {
            None => CameraSource::Synthetic,
            Some(v) if v.trim().eq_ignore_ascii_case(SYNTHETIC_SOURCE) => CameraSource::Synthetic,
            Some(v) => CameraSource::StillImage(PathBuf::from(v.trim())),
        };

        let width: u32 = parse_or(
            get("DISPLAY_WIDTH"),
            "DISPLAY_WIDTH",
            "a positive pixel count",
            SOURCE_FRAME_WIDTH,
            |v| *v > 0,
        )?;
        let height: u32 = parse_or(
            get("DISPLAY_HEIGHT"),
            "DISPLAY_HEIGHT",
            "a positive pixel count",
            SOURCE_FRAME_HEIGHT,
            |v| *v > 0,
        )?;
        // Both sides were checked positive above.
        let display = DisplaySize::new(f64::from(width), f64::from(height)).map_err(|_| {
            ConfigError::Invalid {
                var: "DISPLAY_WIDTH",
                expected: "a positive pixel count",
                value: width.to_string(),
            }
        })?;

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            capture: CaptureSettings {
                interval: Duration::from_millis(interval_ms),
                jpeg_quality,
                constraints: StreamConstraints::default(),
            },
            camera,
            display,
        })
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    var: &'static str,
    expected: &'static str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> Result<T, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Ok(value),
        _ => Err(ConfigError::Invalid {
            var,
            expected,
            value: raw,
        }),
    }
}
