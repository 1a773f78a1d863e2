//! Where the live view and its overlays are presented.

use std::sync::atomic::{AtomicBool, Ordering};

use presence_core::geometry::DisplaySize;
use presence_core::overlay::{DisplayAnnotation, BOX_LINE_WIDTH};

use crate::camera::StreamConstraints;

/// Surface showing the camera feed with an overlay layer on top.
///
/// `render` and `clear` are called while the session holds its state
/// lock, so implementations must not call back into the session.
pub trait DisplaySurface: Send + Sync {
    /// Start showing a live stream.
    fn attach(&self, constraints: StreamConstraints);

    /// Stop showing the stream.
    fn detach(&self);

    /// Current on-screen size, or `None` while the surface is not mounted.
    fn display_size(&self) -> Option<DisplaySize>;

    /// Replace the overlay layer with `annotations`.
    fn render(&self, annotations: &[DisplayAnnotation]);

    /// Remove every overlay.
    fn clear(&self);
}

/// User-facing error channel.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Headless surface that logs each overlay frame.
#[derive(Debug)]
pub struct LogDisplay {
    size: DisplaySize,
    attached: AtomicBool,
}

impl LogDisplay {
    pub fn new(size: DisplaySize) -> Self {
        Self {
            size,
            attached: AtomicBool::new(false),
        }
    }
}

impl DisplaySurface for LogDisplay {
    fn attach(&self, constraints: StreamConstraints) {
        self.attached.store(true, Ordering::SeqCst);
        tracing::info!(
            width = constraints.width,
            height = constraints.height,
            frame_rate = constraints.frame_rate,
            "Live view attached"
        );
    }

    fn detach(&self) {
        if self.attached.swap(false, Ordering::SeqCst) {
            tracing::info!("Live view detached");
        }
    }

    fn display_size(&self) -> Option<DisplaySize> {
        self.attached.load(Ordering::SeqCst).then_some(self.size)
    }

    fn render(&self, annotations: &[DisplayAnnotation]) {
        for annotation in annotations {
            let (label_x, label_y) = annotation.label_origin();
            tracing::info!(
                x = annotation.rect.x,
                y = annotation.rect.y,
                width = annotation.rect.width,
                height = annotation.rect.height,
                color = annotation.color.hex(),
                line_width = BOX_LINE_WIDTH,
                label = %annotation.label,
                label_x,
                label_y,
                "Overlay box"
            );
        }
    }

    fn clear(&self) {
        tracing::debug!("Overlay cleared");
    }
}

/// Notifier that reports through the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, message: &str) {
        tracing::error!(notification = message, "User notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_only_reported_while_attached() {
        let size = DisplaySize::new(640.0, 360.0).unwrap();
        let display = LogDisplay::new(size);
        assert_eq!(display.display_size(), None);

        display.attach(StreamConstraints::default());
        assert_eq!(display.display_size(), Some(size));

        display.detach();
        assert_eq!(display.display_size(), None);
    }
}
