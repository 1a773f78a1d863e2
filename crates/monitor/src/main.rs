//! `presence-monitor` -- headless live presence monitor.
//!
//! Opens a camera source, submits a frame to the recognition backend on
//! every tick, and logs the resulting overlays until Ctrl-C. Settings are
//! read from the environment (see [`presence_monitor::config`]).

use std::sync::Arc;

use presence_client::PresenceApi;
use presence_monitor::camera::{Camera, StillImageCamera, SyntheticCamera};
use presence_monitor::config::{CameraSource, MonitorConfig};
use presence_monitor::display::{LogDisplay, LogNotifier};
use presence_monitor::CaptureSession;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presence_monitor=info,presence_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MonitorConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let api = PresenceApi::with_timeout(&config.api_url, config.request_timeout).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Cannot create backend client");
        std::process::exit(1);
    });

    let camera: Arc<dyn Camera> = match &config.camera {
        CameraSource::Synthetic => Arc::new(SyntheticCamera::new()),
        CameraSource::StillImage(path) => Arc::new(StillImageCamera::new(path)),
    };

    tracing::info!(
        api_url = %api.base_url(),
        camera = ?config.camera,
        interval_ms = config.capture.interval.as_millis() as u64,
        "Starting presence-monitor",
    );

    let session = CaptureSession::new(
        camera,
        Arc::new(api),
        Arc::new(LogDisplay::new(config.display)),
        Arc::new(LogNotifier),
        config.capture,
    );

    if session.start().await.is_err() {
        // Already logged and reported through the notifier.
        std::process::exit(1);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
    session.stop();
}
