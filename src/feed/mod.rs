//! Bounded, newest-first feeds for alerts and recent activity.
//!
//! A [`FeedBuffer`] never holds more than its capacity: inserting at the front
//! evicts from the tail. The alerts variant also drops pushes whose
//! `(kind, message)` pair is already present, without touching the order of
//! the other items.
//!
//! Every mutation runs under one lock, so a render reading a
//! [`FeedSnapshot`] never sees a half-applied push even when a timer and the
//! push channel both produce items between renders.

mod hub;
pub mod markup;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use hub::{FeedHub, RemoteFeedEntry};

/// Severity of a feed item, also used as the toast tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Info,
    Success,
    Warning,
    Error,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Info => "info",
            FeedKind::Success => "success",
            FeedKind::Warning => "warning",
            FeedKind::Error => "error",
        }
    }

    /// Parse the server's loose `tipo` strings; anything unknown is `Info`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "success" | "exito" => FeedKind::Success,
            "warning" | "warn" | "advertencia" => FeedKind::Warning,
            "error" | "danger" | "urgent" => FeedKind::Error,
            _ => FeedKind::Info,
        }
    }
}

/// Declarative action attached to a feed item.
///
/// Rendered as `data-action`/`data-id` attributes and dispatched through the
/// view layer's action table; no executable code ends up in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    Navigate { view: String },
}

impl FeedAction {
    pub fn navigate(view: impl Into<String>) -> Self {
        FeedAction::Navigate { view: view.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeedAction::Navigate { .. } => "navigate",
        }
    }

    pub fn target(&self) -> &str {
        match self {
            FeedAction::Navigate { view } => view,
        }
    }
}

/// Domain an activity entry belongs to; decides its icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    Pedido,
    Reserva,
    Inventario,
    Usuario,
    Mesa,
    Otro,
}

impl ActivityCategory {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "pedido" => ActivityCategory::Pedido,
            "reserva" => ActivityCategory::Reserva,
            "inventario" => ActivityCategory::Inventario,
            "usuario" => ActivityCategory::Usuario,
            "mesa" => ActivityCategory::Mesa,
            _ => ActivityCategory::Otro,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityCategory::Pedido => "🛍️",
            ActivityCategory::Reserva => "📅",
            ActivityCategory::Inventario => "📦",
            ActivityCategory::Usuario => "👤",
            ActivityCategory::Mesa => "🪑",
            ActivityCategory::Otro => "📝",
        }
    }
}

/// One entry of a feed. Immutable once pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: Uuid,
    pub kind: FeedKind,
    pub message: String,
    pub timestamp: SystemTime,
    pub icon: String,
    pub action: Option<FeedAction>,
}

impl FeedItem {
    pub fn new(kind: FeedKind, message: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            timestamp: SystemTime::now(),
            icon: icon.into(),
            action: None,
        }
    }

    pub fn activity(category: ActivityCategory, message: impl Into<String>) -> Self {
        Self::new(FeedKind::Info, message, category.icon())
    }

    pub fn with_action(mut self, action: FeedAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    fn same_alert(&self, other: &FeedItem) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

/// Whether pushes are checked against the current contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    None,
    KindAndMessage,
}

/// Fixed-capacity, newest-first list of feed items.
#[derive(Clone)]
pub struct FeedBuffer {
    capacity: usize,
    dedup: DedupPolicy,
    items: Arc<Mutex<VecDeque<FeedItem>>>,
}

impl FeedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, DedupPolicy::None)
    }

    /// Alerts variant: drops pushes matching an existing `(kind, message)`.
    pub fn deduplicated(capacity: usize) -> Self {
        Self::with_policy(capacity, DedupPolicy::KindAndMessage)
    }

    pub fn with_policy(capacity: usize, dedup: DedupPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            dedup,
            items: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Insert at the front, evicting from the tail beyond capacity.
    ///
    /// Returns `false` when the push was suppressed as a duplicate.
    pub fn push(&self, item: FeedItem) -> bool {
        let mut items = self.items.lock();
        if self.dedup == DedupPolicy::KindAndMessage && items.iter().any(|i| i.same_alert(&item)) {
            tracing::trace!(kind = item.kind.as_str(), message = %item.message, "Duplicate alert suppressed");
            return false;
        }
        items.push_front(item);
        items.truncate(self.capacity);
        true
    }

    /// Replace the contents with `items`, given newest-first.
    pub fn seed(&self, items: impl IntoIterator<Item = FeedItem>) {
        let mut seeded: VecDeque<FeedItem> = VecDeque::with_capacity(self.capacity);
        for item in items {
            if seeded.len() == self.capacity {
                break;
            }
            if self.dedup == DedupPolicy::KindAndMessage && seeded.iter().any(|i| i.same_alert(&item)) {
                continue;
            }
            seeded.push_back(item);
        }
        *self.items.lock() = seeded;
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|item| item.id != id);
        items.len() != before
    }

    pub fn clear(&self) {
        self.items.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        self.dedup
    }

    pub fn front(&self) -> Option<FeedItem> {
        self.items.lock().front().cloned()
    }

    /// Copy of the current contents, newest first.
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.lock().iter().cloned().collect(),
        }
    }
}

/// Point-in-time copy of a feed; iterate it as many times as needed.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    items: Vec<FeedItem>,
}

impl FeedSnapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, FeedItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&FeedItem> {
        self.items.first()
    }
}

impl<'a> IntoIterator for &'a FeedSnapshot {
    type Item = &'a FeedItem;
    type IntoIter = std::slice::Iter<'a, FeedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for FeedSnapshot {
    type Item = FeedItem;
    type IntoIter = std::vec::IntoIter<FeedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
