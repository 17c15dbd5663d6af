use std::time::SystemTime;

use async_trait::async_trait;

use crate::feed::markup::{render_activity_list, render_alert_list};
use crate::view::{section, RenderError, ViewContext, ViewModule};

/// Server-pushed alerts and recent activity, straight from the feeds.
pub struct NotificationsView;

#[async_trait]
impl ViewModule for NotificationsView {
    fn name(&self) -> &str {
        "notificaciones"
    }

    async fn init(&self, ctx: &ViewContext) -> Result<(), RenderError> {
        let feeds = &ctx.app.feeds;
        let now = SystemTime::now();
        let count = feeds.notification_count();

        ctx.mount.append(&section(
            "notificaciones-alertas",
            &format!(
                r#"<span id="notification-count" class="badge">{}</span><div id="lista-alertas">{}</div>"#,
                count,
                render_alert_list(&feeds.panel_alerts.snapshot(), now)
            ),
        ));
        ctx.mount.append(&section(
            "notificaciones-actividad",
            &format!(
                r#"<ul id="lista-actividad">{}</ul>"#,
                render_activity_list(&feeds.activity.snapshot(), now)
            ),
        ));
        Ok(())
    }
}
