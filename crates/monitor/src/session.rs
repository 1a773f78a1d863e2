//! The live capture session.
//!
//! [`CaptureSession`] owns the camera stream, the recurring tick timer and
//! the current detection state. Each tick samples a frame, encodes it,
//! submits it for recognition and resolves names, then applies the result
//! only if the tick is still current:
//!
//! - the session is live and in the same generation the tick was issued in
//!   (every `start`/`stop` bumps the generation), and
//! - no newer tick has been applied already.
//!
//! `stop` cannot abort an in-flight request; it makes its result stale.
//!
//! The camera stream sits behind its own lock so the frame grab can run
//! on the blocking pool together with encoding, outside the state lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use presence_client::PresenceApiError;
use presence_core::correlation::CorrelationId;
use presence_core::detection::{DetectionEntry, DetectionResult};
use presence_core::overlay::{annotate, DisplayAnnotation};

use crate::camera::{Camera, CameraError, CameraStream, StreamConstraints};
use crate::display::{DisplaySurface, Notifier};
use crate::frame::{EncodeError, EncodedFrame, DEFAULT_JPEG_QUALITY};
use crate::names::resolve_entries;
use crate::recognizer::Recognizer;

/// Shown to the user when the camera cannot be opened.
pub const CAMERA_ERROR_MESSAGE: &str = "Unable to access camera. Please check permissions.";

/// Default tick period.
pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(2000);

/// Tunables for one capture session.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    /// Time between ticks. The first tick fires one period after `start`.
    pub interval: Duration,
    pub jpeg_quality: u8,
    pub constraints: StreamConstraints,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CAPTURE_INTERVAL,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            constraints: StreamConstraints::default(),
        }
    }
}

/// Errors returned by [`CaptureSession::start`].
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The camera could not be opened. The user has already been notified.
    #[error("Camera unavailable: {0}")]
    Camera(#[from] CameraError),

    /// The settings ask for a zero tick period.
    #[error("Capture interval must be greater than zero")]
    ZeroInterval,
}

/// Why a tick produced no detections.
#[derive(Debug, thiserror::Error)]
enum TickError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Api(#[from] PresenceApiError),

    #[error("Capture task failed: {0}")]
    Worker(String),
}

type SharedStream = Arc<Mutex<Box<dyn CameraStream>>>;

/// Identifies one tick: the session generation it was issued in and its
/// position in issuance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    pub generation: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Waiting for the camera to open.
    Starting,
    Live,
}

struct SessionState {
    phase: Phase,
    generation: u64,
    next_seq: u64,
    last_applied_seq: u64,
    stream: Option<SharedStream>,
    ticker: Option<CancellationToken>,
    detections: Vec<DetectionEntry>,
    annotations: Vec<DisplayAnnotation>,
}

impl SessionState {
    fn accepts(&self, ticket: TickTicket) -> bool {
        self.phase == Phase::Live
            && self.generation == ticket.generation
            && ticket.seq > self.last_applied_seq
    }
}

/// A live capture-and-overlay loop.
///
/// Created with [`CaptureSession::new`]; dropping the last handle stops
/// the session and releases the camera.
pub struct CaptureSession {
    camera: Arc<dyn Camera>,
    recognizer: Arc<dyn Recognizer>,
    display: Arc<dyn DisplaySurface>,
    notifier: Arc<dyn Notifier>,
    settings: CaptureSettings,
    state: Mutex<SessionState>,
}

impl CaptureSession {
    pub fn new(
        camera: Arc<dyn Camera>,
        recognizer: Arc<dyn Recognizer>,
        display: Arc<dyn DisplaySurface>,
        notifier: Arc<dyn Notifier>,
        settings: CaptureSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            camera,
            recognizer,
            display,
            notifier,
            settings,
            state: Mutex::new(SessionState {
                phase: Phase::Idle,
                generation: 0,
                next_seq: 0,
                last_applied_seq: 0,
                stream: None,
                ticker: None,
                detections: Vec::new(),
                annotations: Vec::new(),
            }),
        })
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Open the camera, attach the live view and start ticking.
    ///
    /// Does nothing if the session is already starting or live. A camera
    /// failure is reported through the notifier and returned; the session
    /// stays idle. If [`stop`](Self::stop) runs while the camera is being
    /// opened, the stream is released as soon as it arrives.
    pub async fn start(self: &Arc<Self>) -> Result<(), MonitorError> {
        if self.settings.interval.is_zero() {
            return Err(MonitorError::ZeroInterval);
        }

        let generation = {
            let mut state = self.lock_state();
            if state.phase != Phase::Idle {
                tracing::debug!(phase = ?state.phase, "Capture already active");
                return Ok(());
            }
            state.phase = Phase::Starting;
            state.generation += 1;
            state.generation
        };

        let constraints = self.settings.constraints;
        let opened = self.camera.open(constraints).await;

        let mut state = self.lock_state();
        if state.generation != generation {
            if let Ok(mut stream) = opened {
                release(&mut *stream);
            }
            tracing::info!("Capture stopped while the camera was opening");
            return Ok(());
        }

        let stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                state.phase = Phase::Idle;
                drop(state);
                tracing::error!(error = %e, "Camera acquisition failed");
                self.notifier.notify_error(CAMERA_ERROR_MESSAGE);
                return Err(e.into());
            }
        };

        self.display.attach(constraints);
        let cancel = CancellationToken::new();
        state.phase = Phase::Live;
        state.stream = Some(Arc::new(Mutex::new(stream)));
        state.ticker = Some(cancel.clone());
        drop(state);

        tokio::spawn(run_ticker(
            Arc::downgrade(self),
            self.settings.interval,
            cancel,
        ));

        tracing::info!(
            generation,
            interval_ms = self.settings.interval.as_millis() as u64,
            width = constraints.width,
            height = constraints.height,
            "Capture started"
        );
        Ok(())
    }

    /// Stop ticking, release the camera and clear every overlay.
    ///
    /// Safe to call at any time; a second call does nothing.
    pub fn stop(&self) {
        let mut state = self.lock_state();
        if state.phase == Phase::Idle {
            return;
        }

        let was_live = state.phase == Phase::Live;
        state.phase = Phase::Idle;
        state.generation += 1;
        if let Some(ticker) = state.ticker.take() {
            ticker.cancel();
        }
        if let Some(stream) = state.stream.take() {
            release(&mut **lock_stream(&stream));
        }
        state.detections.clear();
        state.annotations.clear();

        if was_live {
            self.display.detach();
            self.display.clear();
        }
        tracing::info!(generation = state.generation, "Capture stopped");
    }

    /// Run one sample/submit/render cycle.
    ///
    /// Called by the session's timer; a no-op unless the session is live
    /// and the display is mounted. Failures clear the overlays and are
    /// not reported to the user.
    pub async fn tick(&self) {
        let Some((ticket, stream)) = self.begin_tick() else {
            return;
        };

        let detections = match self.submit(stream).await {
            Ok(detections) => detections,
            Err(e) => {
                tracing::warn!(seq = ticket.seq, error = %e, "Tick failed, clearing detections");
                self.apply(ticket, &[], Vec::new());
                return;
            }
        };

        if !self.lock_state().accepts(ticket) {
            tracing::debug!(seq = ticket.seq, "Discarding stale recognition result");
            return;
        }

        let entries = resolve_entries(self.recognizer.as_ref(), &detections).await;
        self.apply(ticket, &detections, entries);
    }

    /// Current detected list.
    pub fn detections(&self) -> Vec<DetectionEntry> {
        self.lock_state().detections.clone()
    }

    /// Overlays as last rendered.
    pub fn annotations(&self) -> Vec<DisplayAnnotation> {
        self.lock_state().annotations.clone()
    }

    pub fn is_live(&self) -> bool {
        self.lock_state().phase == Phase::Live
    }

    // ---- private helpers ----

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a ticket for the current stream, if a tick may run now.
    fn begin_tick(&self) -> Option<(TickTicket, SharedStream)> {
        let mut state = self.lock_state();
        if state.phase != Phase::Live {
            return None;
        }
        if self.display.display_size().is_none() {
            tracing::debug!("Display not mounted, skipping tick");
            return None;
        }

        let stream = state.stream.clone()?;
        state.next_seq += 1;
        let ticket = TickTicket {
            generation: state.generation,
            seq: state.next_seq,
        };
        Some((ticket, stream))
    }

    async fn submit(&self, stream: SharedStream) -> Result<Vec<DetectionResult>, TickError> {
        let quality = self.settings.jpeg_quality;
        let encoded = tokio::task::spawn_blocking(move || -> Result<EncodedFrame, TickError> {
            let frame = lock_stream(&stream).current_frame()?;
            Ok(EncodedFrame::encode(&frame, quality)?)
        })
        .await
        .map_err(|e| TickError::Worker(e.to_string()))??;
        let correlation_id = CorrelationId::new();
        tracing::debug!(
            %correlation_id,
            jpeg_bytes = encoded.jpeg_len(),
            "Submitting frame"
        );
        Ok(self
            .recognizer
            .recognize(correlation_id, encoded.as_base64())
            .await?)
    }

    /// Replace the overlays and detected list with one tick's outcome.
    fn apply(&self, ticket: TickTicket, detections: &[DetectionResult], entries: Vec<DetectionEntry>) {
        let mut state = self.lock_state();
        if !state.accepts(ticket) {
            tracing::debug!(seq = ticket.seq, "Discarding stale tick outcome");
            return;
        }
        state.last_applied_seq = ticket.seq;

        let annotations: Vec<DisplayAnnotation> = match self.display.display_size() {
            Some(size) => detections.iter().map(|d| annotate(d, size)).collect(),
            None => Vec::new(),
        };
        if annotations.is_empty() {
            self.display.clear();
        } else {
            self.display.render(&annotations);
        }

        tracing::info!(seq = ticket.seq, detections = entries.len(), "Tick applied");
        state.detections = entries;
        state.annotations = annotations;
    }
}

fn lock_stream(stream: &Mutex<Box<dyn CameraStream>>) -> MutexGuard<'_, Box<dyn CameraStream>> {
    stream.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stop the stream's tracks unless they are already stopped.
fn release(stream: &mut dyn CameraStream) {
    if stream.is_active() {
        stream.stop();
        tracing::debug!("Camera tracks stopped");
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fire a tick every `period` until `cancel` is triggered or the session
/// is dropped. Ticks run as their own tasks and may overlap.
async fn run_ticker(session: Weak<CaptureSession>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(session) = session.upgrade() else {
                    break;
                };
                tokio::spawn(async move {
                    session.tick().await;
                });
            }
        }
    }
    tracing::debug!("Ticker stopped");
}
