use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::markup::format_cop;

use super::client::ApiClient;
use super::error::ApiError;

pub const STATS_PATH: &str = "/api/dashboard/stats";

/// Response of `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub ventas_hoy: f64,
    pub pedidos_hoy: u64,
    pub pedidos_pendientes: u64,
    pub reservas_hoy: u64,
    pub pedidos_mes: u64,
    pub mesas_ocupadas: u64,
    pub total_mesas: u64,
    pub inventario_bajo: u64,
    pub total_usuarios: u64,
    /// Sales per ISO date.
    pub ventas_por_dia: BTreeMap<String, f64>,
    /// Order count per state.
    pub estados_pedidos: BTreeMap<String, u64>,
    pub top_productos: Vec<TopProduct>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopProduct {
    pub nombre: String,
    pub cantidad: u64,
}

impl DashboardStats {
    /// Occupied tables as a whole percentage; 0 when there are no tables.
    pub fn occupancy_percent(&self) -> u64 {
        if self.total_mesas == 0 {
            return 0;
        }
        ((self.mesas_ocupadas as f64 / self.total_mesas as f64) * 100.0).round() as u64
    }

    pub fn sales_total(&self) -> f64 {
        self.ventas_por_dia.values().sum()
    }
}

/// Top-level counters shown in the panel header.
///
/// Refreshed on a timer and after every push event; a failed refresh keeps
/// the previous values.
#[derive(Clone, Default)]
pub struct StatCounters {
    latest: Arc<RwLock<Option<DashboardStats>>>,
    refreshes: Arc<AtomicU64>,
}

impl StatCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&self, api: &ApiClient) -> Result<DashboardStats, ApiError> {
        let stats: DashboardStats = api.get(STATS_PATH).await?;
        self.update(stats.clone());
        Ok(stats)
    }

    pub fn update(&self, stats: DashboardStats) {
        *self.latest.write() = Some(stats);
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn latest(&self) -> Option<DashboardStats> {
        self.latest.read().clone()
    }

    /// Number of successful refreshes so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn render(&self) -> String {
        let Some(stats) = self.latest() else {
            return String::new();
        };
        format!(
            concat!(
                r#"<span id="pedidos-hoy">{}</span>"#,
                r#"<span id="reservas-hoy">{}</span>"#,
                r#"<span id="ventas-hoy">{}</span>"#,
                r#"<span id="mesas-ocupadas">{}/{}</span>"#
            ),
            stats.pedidos_hoy,
            stats.reservas_hoy,
            format_cop(stats.ventas_hoy),
            stats.mesas_ocupadas,
            stats.total_mesas,
        )
    }
}
