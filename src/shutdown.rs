//! Session teardown signal shared by timers and the push channel.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionPhase {
    Running = 0,
    Signaled = 1,
    StoppingTimers = 2,
    ClosingChannel = 3,
    Complete = 4,
}

pub struct SessionLifecycle {
    ended: Arc<AtomicBool>,
    phase: Arc<AtomicU8>,
    notify: Arc<Notify>,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self {
            ended: Arc::new(AtomicBool::new(false)),
            phase: Arc::new(AtomicU8::new(SessionPhase::Running as u8)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Signal the end of the session. Idempotent.
    pub fn signal(&self) {
        if !self.ended.swap(true, Ordering::SeqCst) {
            tracing::info!("Session teardown initiated");
            self.phase.store(SessionPhase::Signaled as u8, Ordering::SeqCst);
            self.notify.notify_waiters();
        }
    }

    pub fn is_ending(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> SessionPhase {
        match self.phase.load(Ordering::SeqCst) {
            0 => SessionPhase::Running,
            1 => SessionPhase::Signaled,
            2 => SessionPhase::StoppingTimers,
            3 => SessionPhase::ClosingChannel,
            _ => SessionPhase::Complete,
        }
    }

    pub fn advance(&self, phase: SessionPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
        tracing::debug!(?phase, "Session phase");
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            ended: Arc::clone(&self.ended),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight handle for observing the session end.
#[derive(Clone)]
pub struct SessionHandle {
    ended: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl SessionHandle {
    pub fn is_ending(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        // Register interest before checking the flag, otherwise a signal fired
        // in between would be lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_ending() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn signal_is_idempotent() {
        let lifecycle = SessionLifecycle::new();
        assert_eq!(lifecycle.phase(), SessionPhase::Running);
        lifecycle.signal();
        lifecycle.signal();
        assert!(lifecycle.is_ending());
        assert_eq!(lifecycle.phase(), SessionPhase::Signaled);
    }

    #[tokio::test]
    async fn handle_wait_returns_after_signal() {
        let lifecycle = SessionLifecycle::new();
        let handle = lifecycle.handle();
        let waiter = tokio::spawn(async move { handle.wait().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        lifecycle.signal();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait should finish")
            .expect("task");
    }

    #[tokio::test]
    async fn handle_wait_after_signal_returns_immediately() {
        let lifecycle = SessionLifecycle::new();
        lifecycle.signal();
        tokio::time::timeout(Duration::from_millis(100), lifecycle.handle().wait())
            .await
            .expect("already signaled");
    }
}
