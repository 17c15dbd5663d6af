//! Real-time event bridge: turns push-channel events into feed entries,
//! notices, view re-renders and counter refreshes.
//!
//! Consumer handlers run in isolation. A handler that returns an error or
//! panics is recorded as a [`HandlerFailure`] and the remaining handlers
//! still run.

mod connection;
pub mod events;
mod transport;

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::app::AppContext;
use crate::feed::FeedKind;
use crate::view::Router;

pub use connection::{ConnectionState, ConnectionStatus};
pub use events::{EntityId, FeedTarget, PushEvent, SUBSCRIBED_EVENTS};
pub use transport::{OutboundEvent, ReconnectPolicy, SseTransport, TransportChannels, TransportEvent};

pub const CONNECTED_NOTICE: &str = "Conexión establecida";
pub const CONNECTION_LOST_NOTICE: &str = "Conexión perdida. Reconectando...";
pub const RECONNECT_FAILED_NOTICE: &str = "No se pudo reconectar con el servidor";
pub const EMIT_FAILED_NOTICE: &str = "Error de conexión";

pub type EventHandler = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub event: String,
    /// Position of the handler in registration order.
    pub index: usize,
    pub message: String,
}

/// Result of dispatching one inbound event.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Consumer handlers that ran, failed ones included.
    pub handled: usize,
    pub failures: Vec<HandlerFailure>,
    pub rerendered: bool,
}

pub struct EventBridge {
    app: Arc<AppContext>,
    router: Arc<Router>,
    status: ConnectionStatus,
    handlers: RwLock<HashMap<&'static str, Vec<EventHandler>>>,
    outbound: Mutex<Option<mpsc::Sender<OutboundEvent>>>,
}

impl EventBridge {
    pub fn new(app: Arc<AppContext>, router: Arc<Router>) -> Self {
        let handlers = SUBSCRIBED_EVENTS
            .iter()
            .map(|name| (*name, Vec::new()))
            .collect();
        Self {
            app,
            router,
            status: ConnectionStatus::new(),
            handlers: RwLock::new(handlers),
            outbound: Mutex::new(None),
        }
    }

    /// Subscribe to one of [`SUBSCRIBED_EVENTS`].
    pub fn on<F>(&self, event: &str, handler: F) -> Result<(), BridgeError>
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write();
        let slot = handlers
            .get_mut(event)
            .ok_or_else(|| BridgeError::UnknownEvent(event.to_string()))?;
        slot.push(Arc::new(handler));
        Ok(())
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn attach_outbound(&self, sender: mpsc::Sender<OutboundEvent>) {
        *self.outbound.lock() = Some(sender);
    }

    /// Send an event to the server. Only works while connected; otherwise
    /// the user gets an error notice and `false` comes back.
    pub fn emit(&self, event: &str, data: Value) -> bool {
        if self.status.is_connected() {
            if let Some(sender) = self.outbound.lock().as_ref() {
                let outbound = OutboundEvent {
                    name: event.to_string(),
                    data,
                };
                match sender.try_send(outbound) {
                    Ok(()) => return true,
                    Err(e) => tracing::warn!(event = %event, error = %e, "Outbound queue rejected event"),
                }
            }
        }

        tracing::warn!(event = %event, "No connection to the push channel");
        self.app.notifier().show(EMIT_FAILED_NOTICE, FeedKind::Error);
        false
    }

    /// Consume transport events until the transport goes away.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<TransportEvent>) {
        tracing::debug!("Event bridge started");
        while let Some(event) = events.recv().await {
            self.handle_transport(event).await;
        }
        self.status.set(ConnectionState::Disconnected);
        tracing::debug!("Event bridge stopped");
    }

    pub async fn handle_transport(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connecting => {
                self.status.set(ConnectionState::Connecting);
            }
            TransportEvent::Connected => {
                if self.status.set(ConnectionState::Connected) != ConnectionState::Connected {
                    self.app.notifier().show(CONNECTED_NOTICE, FeedKind::Success);
                    self.run_handlers(events::CONNECT, &Value::Null);
                }
            }
            TransportEvent::Disconnected { reason } => {
                if self.status.set(ConnectionState::Disconnected) == ConnectionState::Connected {
                    tracing::warn!(reason = %reason, "Push channel lost");
                    self.app.notifier().show(CONNECTION_LOST_NOTICE, FeedKind::Warning);
                    self.run_handlers(events::DISCONNECT, &Value::Null);
                }
            }
            TransportEvent::Exhausted => {
                self.status.set(ConnectionState::Disconnected);
                self.app.notifier().show(RECONNECT_FAILED_NOTICE, FeedKind::Error);
            }
            TransportEvent::Message { name, data } => {
                self.handle_event(&name, &data).await;
            }
        }
    }

    /// Apply the built-in reaction for `name`, then the consumer handlers,
    /// then refresh the header counters for domain events.
    pub async fn handle_event(&self, name: &str, data: &Value) -> DispatchReport {
        let event = match PushEvent::decode(name, data) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(event = %name, error = %e, "Malformed push event payload");
                None
            }
        };

        if let Some(event) = &event {
            self.apply_feed_and_notice(event);
        } else if !SUBSCRIBED_EVENTS.contains(&name) {
            tracing::debug!(event = %name, "Ignoring unsubscribed event");
        }

        let (handled, failures) = self.run_handlers(name, data);

        let mut rerendered = false;
        if let Some(event) = &event {
            let active = self.router.active_view();
            if event.affected_views().contains(&active.as_str()) {
                tracing::debug!(event = %name, view = %active, "Re-rendering active view");
                self.router.render().await;
                rerendered = true;
            }
        }

        if events::is_domain_event(name) {
            self.app.refresh_counters().await;
        }

        DispatchReport {
            handled,
            failures,
            rerendered,
        }
    }

    fn apply_feed_and_notice(&self, event: &PushEvent) {
        if let Some((target, item)) = event.feed_item() {
            let feeds = &self.app.feeds;
            match target {
                FeedTarget::Activity => feeds.activity.push(item),
                FeedTarget::PanelAlerts => feeds.panel_alerts.push(item),
            };
        }
        if let Some((message, kind)) = event.notice() {
            self.app.notifier().show(&message, kind);
        }
        if event.chimes() {
            self.app.notifier().chime();
        }
    }

    fn run_handlers(&self, name: &str, data: &Value) -> (usize, Vec<HandlerFailure>) {
        // Clone the list so handlers may subscribe without deadlocking.
        let handlers = match self.handlers.read().get(name) {
            Some(handlers) => handlers.clone(),
            None => return (0, Vec::new()),
        };

        let mut failures = Vec::new();
        for (index, handler) in handlers.iter().enumerate() {
            let message = match catch_unwind(AssertUnwindSafe(|| handler(data))) {
                Ok(Ok(())) => continue,
                Ok(Err(message)) => message,
                Err(panic) => panic_message(panic.as_ref()),
            };
            tracing::warn!(event = %name, index, error = %message, "Event handler failed");
            failures.push(HandlerFailure {
                event: name.to_string(),
                index,
                message,
            });
        }
        (handlers.len(), failures)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
