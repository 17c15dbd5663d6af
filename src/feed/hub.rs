use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use crate::config::FeedsConfig;

use super::{ActivityCategory, FeedBuffer, FeedItem, FeedKind};

/// Entry shape of `/api/dashboard/actividad` and `/api/dashboard/alertas`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFeedEntry {
    pub tipo: String,
    pub mensaje: String,
    #[serde(default)]
    pub icono: Option<String>,
    /// ISO 8601 time of the entry, with or without an offset.
    #[serde(default)]
    pub tiempo: Option<String>,
}

impl RemoteFeedEntry {
    fn into_item(self, kind: FeedKind, default_icon: &str) -> FeedItem {
        let icon = self.icono.unwrap_or_else(|| default_icon.to_string());
        let item = FeedItem::new(kind, self.mensaje, icon);
        match self.tiempo.as_deref().and_then(parse_timestamp) {
            Some(at) => item.with_timestamp(at),
            None => item,
        }
    }
}

/// Parse the server's `tiempo`. Naive timestamps are read as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<SystemTime> {
    let raw = raw.trim();
    let millis = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.timestamp_millis(),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()?
            .and_utc()
            .timestamp_millis(),
    };
    let millis = u64::try_from(millis).ok()?;
    Some(UNIX_EPOCH + Duration::from_millis(millis))
}

/// The three feeds of a panel session.
#[derive(Clone)]
pub struct FeedHub {
    /// Stat-check alerts shown on the dashboard, deduplicated.
    pub alerts: FeedBuffer,
    /// Alerts pushed by the server (stock bajo, ...).
    pub panel_alerts: FeedBuffer,
    /// Recent activity.
    pub activity: FeedBuffer,
}

impl FeedHub {
    pub fn new(config: &FeedsConfig) -> Self {
        Self {
            alerts: FeedBuffer::deduplicated(config.alerts_capacity),
            panel_alerts: FeedBuffer::new(config.panel_alerts_capacity),
            activity: FeedBuffer::new(config.activity_capacity),
        }
    }

    /// Badge count next to the notifications bell.
    pub fn notification_count(&self) -> usize {
        self.panel_alerts.len()
    }

    pub fn seed_activity(&self, entries: Vec<RemoteFeedEntry>) {
        self.activity.seed(entries.into_iter().map(|entry| {
            let category = ActivityCategory::from_tag(&entry.tipo);
            entry.into_item(FeedKind::Info, category.icon())
        }));
    }

    pub fn seed_panel_alerts(&self, entries: Vec<RemoteFeedEntry>) {
        self.panel_alerts.seed(entries.into_iter().map(|entry| {
            let kind = FeedKind::from_tag(&entry.tipo);
            entry.into_item(kind, "⚠️")
        }));
    }
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new(&FeedsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::DedupPolicy;
    use crate::markup::relative_time;

    #[test]
    fn capacities_follow_config() {
        let hub = FeedHub::default();
        assert_eq!(hub.alerts.capacity(), 10);
        assert_eq!(hub.panel_alerts.capacity(), 20);
        assert_eq!(hub.activity.capacity(), 50);
        assert_eq!(hub.alerts.dedup_policy(), DedupPolicy::KindAndMessage);
        assert_eq!(hub.activity.dedup_policy(), DedupPolicy::None);
    }

    #[test]
    fn seeding_maps_remote_entries() {
        let hub = FeedHub::default();
        let entries: Vec<RemoteFeedEntry> = serde_json::from_str(
            r#"[{"tipo":"reserva","mensaje":"Nueva reserva para 2026-10-15"},
                {"tipo":"pedido","mensaje":"Nuevo pedido #7","icono":"🍽️"}]"#,
        )
        .unwrap();
        hub.seed_activity(entries);

        let snapshot = hub.activity.snapshot();
        let items: Vec<&FeedItem> = snapshot.iter().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].icon, "📅");
        assert_eq!(items[1].icon, "🍽️");

        let alerts: Vec<RemoteFeedEntry> =
            serde_json::from_str(r#"[{"tipo":"warning","mensaje":"Stock bajo de Arroz: 2 kg"}]"#).unwrap();
        hub.seed_panel_alerts(alerts);
        assert_eq!(hub.notification_count(), 1);
        assert_eq!(hub.panel_alerts.front().unwrap().kind, FeedKind::Warning);
    }

    #[test]
    fn seeding_keeps_server_timestamps() {
        let hub = FeedHub::default();
        let entries: Vec<RemoteFeedEntry> = serde_json::from_str(
            r#"[{"tipo":"pedido","mensaje":"Nuevo pedido #3","tiempo":"2020-01-01T10:00:00"}]"#,
        )
        .unwrap();
        hub.seed_activity(entries);

        let front = hub.activity.front().unwrap();
        let expected = UNIX_EPOCH + Duration::from_secs(1_577_872_800);
        assert_eq!(front.timestamp, expected);
        assert_ne!(relative_time(front.timestamp, SystemTime::now()), "Ahora");
    }

    #[test]
    fn missing_or_bad_timestamps_fall_back_to_now() {
        let hub = FeedHub::default();
        let entries: Vec<RemoteFeedEntry> = serde_json::from_str(
            r#"[{"tipo":"urgent","mensaje":"Pedido #9 atrasado","tiempo":"ayer"},
                {"tipo":"warning","mensaje":"Stock bajo de Sal: 1"}]"#,
        )
        .unwrap();
        hub.seed_panel_alerts(entries);

        let now = SystemTime::now();
        for item in hub.panel_alerts.snapshot().iter() {
            assert_eq!(relative_time(item.timestamp, now), "Ahora");
        }
    }

    #[test]
    fn timestamp_formats() {
        let base = UNIX_EPOCH + Duration::from_secs(1_577_872_800);
        assert_eq!(parse_timestamp("2020-01-01T10:00:00"), Some(base));
        assert_eq!(parse_timestamp("2020-01-01 10:00:00.250"), Some(base + Duration::from_millis(250)));
        assert_eq!(parse_timestamp("2020-01-01T12:00:00+02:00"), Some(base));
        assert_eq!(parse_timestamp("2020-01-01T10:00:00Z"), Some(base));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("1960-01-01T00:00:00"), None);
    }
}
