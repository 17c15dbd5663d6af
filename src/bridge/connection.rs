use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Text of the header indicator.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "Conectado",
            ConnectionState::Connecting | ConnectionState::Disconnected => "Desconectado",
        }
    }
}

/// Shared, lock-free view of the push channel state.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    state: Arc<AtomicU8>,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected as u8)),
        }
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Store `state` and return the previous one.
    pub fn set(&self, state: ConnectionState) -> ConnectionState {
        ConnectionState::from_u8(self.state.swap(state as u8, Ordering::SeqCst))
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    /// Indicator markup for the panel header.
    pub fn render(&self) -> String {
        let state = self.get();
        let class = if state == ConnectionState::Connected {
            "connected"
        } else {
            "disconnected"
        };
        format!(r#"<span id="connection-status" class="{class}">{}</span>"#, state.label())
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}
