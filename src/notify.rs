//! User-facing notices (toasts and the notification chime).
//!
//! Presentation lives outside the crate; the shell only needs somewhere to
//! send "show this message" and "play the sound".

use crate::feed::FeedKind;

pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, kind: FeedKind);

    fn chime(&self) {}
}

/// Notifier that writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str, kind: FeedKind) {
        match kind {
            FeedKind::Error => tracing::error!(notice = %message, "Notice"),
            FeedKind::Warning => tracing::warn!(notice = %message, "Notice"),
            FeedKind::Info | FeedKind::Success => tracing::info!(notice = %message, kind = kind.as_str(), "Notice"),
        }
    }

    fn chime(&self) {
        tracing::debug!("Notification chime");
    }
}
