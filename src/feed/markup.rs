//! Markup for feed lists.
//!
//! Items with an action carry `data-action`/`data-id` attributes picked up by
//! the delegated action table.

use std::time::SystemTime;

use crate::markup::{escape, relative_time};

use super::{FeedItem, FeedSnapshot};

fn action_attributes(item: &FeedItem) -> String {
    match &item.action {
        Some(action) => format!(
            r#" data-action="{}" data-id="{}""#,
            action.name(),
            escape(action.target())
        ),
        None => String::new(),
    }
}

/// Dashboard alert list; an empty feed renders the all-clear entry.
pub fn render_alert_list(alerts: &FeedSnapshot, now: SystemTime) -> String {
    if alerts.is_empty() {
        return concat!(
            r#"<div class="alert-item alert-success">"#,
            r#"<span class="alert-icon">✅</span>"#,
            r#"<span class="alert-text">Sistema funcionando correctamente</span>"#,
            r#"<span class="alert-time">Ahora</span>"#,
            "</div>"
        )
        .to_string();
    }

    alerts
        .iter()
        .map(|alert| {
            format!(
                r#"<div class="alert-item alert-{}"{}><span class="alert-icon">{}</span><span class="alert-text">{}</span><span class="alert-time">{}</span></div>"#,
                alert.kind.as_str(),
                action_attributes(alert),
                escape(&alert.icon),
                escape(&alert.message),
                relative_time(alert.timestamp, now),
            )
        })
        .collect()
}

pub fn render_activity_list(activity: &FeedSnapshot, now: SystemTime) -> String {
    activity
        .iter()
        .map(|item| {
            format!(
                r#"<li class="activity-item"><div class="activity-icon">{}</div><div class="activity-content"><div class="activity-title">{}</div><div class="activity-time">{}</div></div></li>"#,
                escape(&item.icon),
                escape(&item.message),
                relative_time(item.timestamp, now),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedAction, FeedBuffer, FeedKind};

    #[test]
    fn empty_alerts_render_all_clear() {
        let html = render_alert_list(&FeedSnapshot::default(), SystemTime::now());
        assert!(html.contains("Sistema funcionando correctamente"));
        assert!(html.contains("alert-success"));
    }

    #[test]
    fn actions_become_data_attributes() {
        let alerts = FeedBuffer::deduplicated(10);
        alerts.push(
            FeedItem::new(FeedKind::Warning, "2 productos con stock bajo", "⚠️")
                .with_action(FeedAction::navigate("inventario")),
        );
        let html = render_alert_list(&alerts.snapshot(), SystemTime::now());
        assert!(html.contains(r#"data-action="navigate" data-id="inventario""#));
        assert!(html.contains("alert-warning"));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn messages_are_escaped() {
        let activity = FeedBuffer::new(5);
        activity.push(FeedItem::new(FeedKind::Info, "<b>Mesa</b>", "🪑"));
        let html = render_activity_list(&activity.snapshot(), SystemTime::now());
        assert!(html.contains("&lt;b&gt;Mesa&lt;/b&gt;"));
    }
}
