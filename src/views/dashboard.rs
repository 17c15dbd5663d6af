//! Dashboard: summary counters, stat-check alerts and a periodic refresh
//! that runs only while the dashboard is the active view.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::api::DashboardStats;
use crate::app::AppContext;
use crate::feed::markup::render_alert_list;
use crate::feed::{FeedAction, FeedHub, FeedItem, FeedKind};
use crate::markup::{escape, format_cop};
use crate::view::{section, Mount, RenderError, ViewContext, ViewModule};

pub const SUMMARY_SECTION: &str = "dashboard-resumen";
pub const ALERTS_SECTION: &str = "dashboard-alertas";

const VIEW: &str = "dashboard";
const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

pub struct DashboardView {
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            timer: Mutex::new(None),
        }
    }

    /// Whether a refresh timer is currently installed.
    pub fn has_timer(&self) -> bool {
        self.timer.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn restart_timer(&self, app: Arc<AppContext>, mount: Mount) {
        let interval = app.config().refresh.dashboard_interval();
        let handle = tokio::spawn(async move {
            let session = app.session().clone();
            let mut ticker = interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = session.wait() => break,
                    _ = ticker.tick() => {
                        if app.active_view() == VIEW {
                            refresh_summary(&app, &mount).await;
                        }
                    }
                }
            }
        });

        if let Some(previous) = self.timer.lock().replace(handle) {
            previous.abort();
        }
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl ViewModule for DashboardView {
    fn name(&self) -> &str {
        VIEW
    }

    async fn init(&self, ctx: &ViewContext) -> Result<(), RenderError> {
        let stats = ctx.app.counters.refresh(&ctx.app.api).await?;
        if !ctx.is_current() {
            return Ok(());
        }

        push_stat_alerts(&ctx.app.feeds, &stats);
        ctx.mount.append(&section(SUMMARY_SECTION, &render_summary(&stats)));
        ctx.mount.append(&section(ALERTS_SECTION, &render_alerts(&ctx.app.feeds)));

        self.restart_timer(Arc::clone(&ctx.app), ctx.mount.clone());
        Ok(())
    }
}

async fn refresh_summary(app: &AppContext, mount: &Mount) {
    match app.counters.refresh(&app.api).await {
        Ok(stats) => {
            push_stat_alerts(&app.feeds, &stats);
            // The active view may have changed while the request was in flight.
            if app.active_view() == VIEW {
                mount.replace_section(SUMMARY_SECTION, &render_summary(&stats));
                mount.replace_section(ALERTS_SECTION, &render_alerts(&app.feeds));
            }
        }
        Err(e) => tracing::warn!(error = %e, "Dashboard refresh failed"),
    }
}

/// Alerts derived from the stats: low stock and pending orders.
pub fn stat_alerts(stats: &DashboardStats) -> Vec<FeedItem> {
    let mut alerts = Vec::new();
    if stats.inventario_bajo > 0 {
        alerts.push(
            FeedItem::new(
                FeedKind::Warning,
                format!("{} productos con stock bajo", stats.inventario_bajo),
                "⚠️",
            )
            .with_action(FeedAction::navigate("inventario")),
        );
    }
    if stats.pedidos_pendientes > 0 {
        alerts.push(
            FeedItem::new(
                FeedKind::Info,
                format!("{} pedidos pendientes de atención", stats.pedidos_pendientes),
                "📦",
            )
            .with_action(FeedAction::navigate("pedidos")),
        );
    }
    alerts
}

fn push_stat_alerts(feeds: &FeedHub, stats: &DashboardStats) {
    for alert in stat_alerts(stats) {
        feeds.alerts.push(alert);
    }
}

/// Alerts section body: the deduplicated alerts feed and a clear button.
pub fn render_alerts(feeds: &FeedHub) -> String {
    let snapshot = feeds.alerts.snapshot();
    let clear = if snapshot.is_empty() {
        ""
    } else {
        r#"<button class="btn-link" data-action="clear-alerts">Limpiar</button>"#
    };
    format!(
        r#"<div id="alertas-list">{}</div>{}"#,
        render_alert_list(&snapshot, SystemTime::now()),
        clear
    )
}

fn render_summary(stats: &DashboardStats) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        r#"<div class="stat-card"><span id="ventas-hoy">{}</span></div>"#,
        format_cop(stats.ventas_hoy)
    ));
    html.push_str(&format!(
        r#"<div class="stat-card"><span id="pedidos-hoy">{}</span><span id="pedidos-pendientes-text">{} pendientes</span></div>"#,
        stats.pedidos_hoy, stats.pedidos_pendientes
    ));
    html.push_str(&format!(
        r#"<div class="stat-card"><span id="reservas-hoy">{}</span><span id="pedidos-mes-text">{} pedidos este mes</span></div>"#,
        stats.reservas_hoy, stats.pedidos_mes
    ));
    let occupancy = stats.occupancy_percent();
    html.push_str(&format!(
        r#"<div class="stat-card"><span id="mesas-ocupadas">{}/{}</span><div id="mesas-progress" style="width: {}%"></div><span id="mesas-porcentaje">{}%</span></div>"#,
        stats.mesas_ocupadas, stats.total_mesas, occupancy, occupancy
    ));
    html.push_str(&format!(
        r#"<div class="stat-card"><span id="inventario-bajo">{}</span><span id="total-usuarios">{}</span></div>"#,
        stats.inventario_bajo, stats.total_usuarios
    ));
    html.push_str(&format!(
        r#"<span id="badge-pedidos-pendientes" class="badge">{}</span><span id="badge-inventario" class="badge">{}</span>"#,
        stats.pedidos_pendientes, stats.inventario_bajo
    ));

    if stats.ventas_por_dia.is_empty() {
        html.push_str(r#"<p id="ventas-7d-total" class="empty">No hay datos de ventas</p>"#);
    } else {
        html.push_str(&format!(
            r#"<p id="ventas-7d-total">Total: {}</p>"#,
            format_cop(stats.sales_total())
        ));
    }

    html.push_str(r#"<ol id="top-productos">"#);
    if stats.top_productos.is_empty() {
        html.push_str(r#"<li class="empty">Sin ventas registradas</li>"#);
    }
    for (rank, product) in stats.top_productos.iter().enumerate() {
        let badge = MEDALS
            .get(rank)
            .map(|medal| medal.to_string())
            .unwrap_or_else(|| format!("#{}", rank + 1));
        html.push_str(&format!(
            r#"<li><span class="rank">{}</span><span class="nombre">{}</span><span class="cantidad">{} vendidos</span></li>"#,
            badge,
            escape(&product.nombre),
            product.cantidad
        ));
    }
    html.push_str("</ol>");
    html
}
