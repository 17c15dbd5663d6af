//! Push channel transport: a server-sent events stream for inbound events
//! and JSON posts for outbound ones.
//!
//! The stream task reconnects on its own with a doubling delay. After
//! `max_reconnect_attempts` consecutive failed attempts it reports
//! [`TransportEvent::Exhausted`] and stops.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{RealtimeConfig, ServerConfig};
use crate::shutdown::SessionHandle;
use crate::sse::SseDecoder;

const EVENT_BUFFER: usize = 64;
const OUTBOUND_BUFFER: usize = 32;

/// What the transport reports to the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connecting,
    Connected,
    Disconnected { reason: String },
    /// Reconnection gave up; no further events follow.
    Exhausted,
    Message { name: String, data: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    pub name: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            max_attempts: config.max_reconnect_attempts,
            initial_delay: Duration::from_millis(config.reconnect_delay_ms),
            max_delay: Duration::from_millis(config.reconnect_delay_max_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    pub fn exhausted(&self, failures: u32) -> bool {
        failures >= self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&RealtimeConfig::default())
    }
}

/// Channel ends handed to the bridge once the transport is running.
pub struct TransportChannels {
    pub events: mpsc::Receiver<TransportEvent>,
    pub outbound: mpsc::Sender<OutboundEvent>,
    pub tasks: Vec<JoinHandle<()>>,
}

enum StreamEnd {
    /// The stream was open and then ended.
    Closed(String),
    /// The connection attempt failed.
    Failed(String),
    ReceiverGone,
}

pub struct SseTransport {
    http: Client,
    stream_url: String,
    emit_url: String,
    mesa_id: Option<String>,
    policy: ReconnectPolicy,
}

impl SseTransport {
    /// The stream client has no total timeout; only connecting is bounded.
    pub fn new(server: &ServerConfig, realtime: &RealtimeConfig) -> reqwest::Result<Self> {
        let http = Client::builder()
            .connect_timeout(server.connect_timeout())
            .build()?;
        Ok(Self {
            http,
            stream_url: server.url(&realtime.events_path),
            emit_url: server.url(&realtime.emit_path),
            mesa_id: realtime.mesa_id.clone(),
            policy: ReconnectPolicy::from_config(realtime),
        })
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Start the stream and outbound tasks. Both stop when the session ends.
    pub fn spawn(self, session: SessionHandle) -> TransportChannels {
        let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let transport = Arc::new(self);

        let stream_task = tokio::spawn(Arc::clone(&transport).run_stream(event_tx, session.clone()));
        let outbound_task = tokio::spawn(transport.run_outbound(outbound_rx, session));

        TransportChannels {
            events,
            outbound,
            tasks: vec![stream_task, outbound_task],
        }
    }

    async fn run_stream(self: Arc<Self>, tx: mpsc::Sender<TransportEvent>, session: SessionHandle) {
        let mut failures: u32 = 0;

        loop {
            if session.is_ending() || tx.send(TransportEvent::Connecting).await.is_err() {
                break;
            }

            let end = tokio::select! {
                _ = session.wait() => break,
                end = self.stream_once(&tx) => end,
            };

            let reason = match end {
                StreamEnd::ReceiverGone => break,
                StreamEnd::Closed(reason) => {
                    failures = 0;
                    reason
                }
                StreamEnd::Failed(reason) => {
                    failures += 1;
                    reason
                }
            };
            tracing::warn!(url = %self.stream_url, reason = %reason, failures, "Push channel down");
            if tx.send(TransportEvent::Disconnected { reason }).await.is_err() {
                break;
            }

            if self.policy.exhausted(failures) {
                tracing::error!(attempts = failures, "Giving up on the push channel");
                let _ = tx.send(TransportEvent::Exhausted).await;
                break;
            }

            let delay = self.policy.delay_for(failures.max(1));
            tokio::select! {
                _ = session.wait() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::debug!("Push stream task stopped");
    }

    async fn stream_once(&self, tx: &mpsc::Sender<TransportEvent>) -> StreamEnd {
        let mut request = self.http.get(&self.stream_url).header(ACCEPT, "text/event-stream");
        if let Some(mesa_id) = &self.mesa_id {
            request = request.query(&[("mesa_id", mesa_id)]);
        }

        let mut response = match request.send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => return StreamEnd::Failed(format!("status {}", response.status().as_u16())),
            Err(e) => return StreamEnd::Failed(e.to_string()),
        };

        if tx.send(TransportEvent::Connected).await.is_err() {
            return StreamEnd::ReceiverGone;
        }
        tracing::info!(url = %self.stream_url, "Push channel connected");

        let mut decoder = SseDecoder::new();
        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    for event in decoder.feed(&bytes) {
                        let message = TransportEvent::Message {
                            name: event.name,
                            data: event.data,
                        };
                        if tx.send(message).await.is_err() {
                            return StreamEnd::ReceiverGone;
                        }
                    }
                }
                Ok(None) => {
                    if let Some(event) = decoder.finish() {
                        let message = TransportEvent::Message {
                            name: event.name,
                            data: event.data,
                        };
                        if tx.send(message).await.is_err() {
                            return StreamEnd::ReceiverGone;
                        }
                    }
                    return StreamEnd::Closed("stream closed by server".to_string());
                }
                Err(e) => return StreamEnd::Closed(e.to_string()),
            }
        }
    }

    async fn run_outbound(self: Arc<Self>, mut rx: mpsc::Receiver<OutboundEvent>, session: SessionHandle) {
        loop {
            let event = tokio::select! {
                _ = session.wait() => break,
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            let body = json!({ "event": event.name, "data": event.data });
            match self.http.post(&self.emit_url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(event = %event.name, "Outbound event sent");
                }
                Ok(response) => {
                    tracing::warn!(event = %event.name, status = response.status().as_u16(), "Outbound event rejected");
                }
                Err(e) => {
                    tracing::warn!(event = %event.name, error = %e, "Outbound event failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_up_to_the_ceiling() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(5000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(5000));
    }

    #[test]
    fn exhausted_after_max_attempts() {
        let policy = ReconnectPolicy::default();
        assert!(!policy.exhausted(4));
        assert!(policy.exhausted(5));
    }

    #[test]
    fn urls_come_from_config() {
        let server = ServerConfig {
            base_url: "http://panel.local:8080/".to_string(),
            ..ServerConfig::default()
        };
        let transport = SseTransport::new(&server, &RealtimeConfig::default()).unwrap();
        assert_eq!(transport.stream_url(), "http://panel.local:8080/socket/events");
        assert_eq!(transport.emit_url, "http://panel.local:8080/socket/emit");
    }
}
