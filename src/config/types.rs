use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the view name in path templates.
pub const VIEW_PLACEHOLDER: &str = "{view}";

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub views: ViewsConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Where the panel's server lives and how requests against it behave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Origin of the restaurant server (scheme + host + port).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefix prepended to every REST path (e.g. "/admin").
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Total request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// View mounting conventions and navigation entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// View mounted when the shell starts.
    #[serde(default = "default_initial_view")]
    pub initial: String,
    /// Markup fragment endpoint, `{view}` is replaced by the view name.
    #[serde(default = "default_fragment_path")]
    pub fragment_path: String,
    /// Behavior module resource, `{view}` is replaced by the view name.
    #[serde(default = "default_module_path")]
    pub module_path: String,
    /// Navigation entries in display order.
    #[serde(default = "default_navigation")]
    pub navigation: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub view: String,
    pub label: String,
}

/// Capacities of the bounded feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Deduplicated stat-check alerts shown on the dashboard (default: 10).
    #[serde(default = "default_alerts_capacity")]
    pub alerts_capacity: usize,
    /// Alerts pushed by the server (default: 20).
    #[serde(default = "default_panel_alerts_capacity")]
    pub panel_alerts_capacity: usize,
    /// Recent activity list (default: 50).
    #[serde(default = "default_activity_capacity")]
    pub activity_capacity: usize,
}

/// Periodic refresh intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Dashboard stats refresh while the dashboard is active (default: 30).
    #[serde(default = "default_dashboard_refresh")]
    pub dashboard_seconds: u64,
    /// Top-level stat counters refresh (default: 300).
    #[serde(default = "default_stats_refresh")]
    pub stats_seconds: u64,
}

/// Push channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Server-sent events stream path.
    #[serde(default = "default_events_path")]
    pub events_path: String,
    /// Path receiving outbound events as JSON posts.
    #[serde(default = "default_emit_path")]
    pub emit_path: String,
    /// Table/session identifier appended to the stream URL.
    #[serde(default)]
    pub mesa_id: Option<String>,
    /// Consecutive failed connection attempts before giving up (default: 5).
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// First reconnect delay in milliseconds (default: 1000).
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Reconnect delay ceiling in milliseconds (default: 5000).
    #[serde(default = "default_reconnect_delay_max")]
    pub reconnect_delay_max_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_api_prefix() -> String {
    "/admin".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_initial_view() -> String {
    "dashboard".to_string()
}

fn default_fragment_path() -> String {
    "/admin/{view}-content".to_string()
}

fn default_module_path() -> String {
    "/static/js/admin/{view}.js".to_string()
}

fn default_navigation() -> Vec<NavItem> {
    [
        ("dashboard", "Panel Principal"),
        ("pedidos", "Pedidos"),
        ("reservas", "Reservas"),
        ("mesas", "Mesas"),
        ("menu", "Menú"),
        ("inventario", "Inventario"),
        ("usuarios", "Usuarios"),
        ("notificaciones", "Notificaciones"),
    ]
    .into_iter()
    .map(|(view, label)| NavItem {
        view: view.to_string(),
        label: label.to_string(),
    })
    .collect()
}

fn default_alerts_capacity() -> usize {
    10
}

fn default_panel_alerts_capacity() -> usize {
    20
}

fn default_activity_capacity() -> usize {
    50
}

fn default_dashboard_refresh() -> u64 {
    30
}

fn default_stats_refresh() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_events_path() -> String {
    "/socket/events".to_string()
}

fn default_emit_path() -> String {
    "/socket/emit".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay() -> u64 {
    1000
}

fn default_reconnect_delay_max() -> u64 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            initial: default_initial_view(),
            fragment_path: default_fragment_path(),
            module_path: default_module_path(),
            navigation: default_navigation(),
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            alerts_capacity: default_alerts_capacity(),
            panel_alerts_capacity: default_panel_alerts_capacity(),
            activity_capacity: default_activity_capacity(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            dashboard_seconds: default_dashboard_refresh(),
            stats_seconds: default_stats_refresh(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            events_path: default_events_path(),
            emit_path: default_emit_path(),
            mesa_id: None,
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay(),
            reconnect_delay_max_ms: default_reconnect_delay_max(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_seconds))
    }

    /// Absolute URL for a server path, without the API prefix.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl ViewsConfig {
    pub fn fragment_path_for(&self, view: &str) -> String {
        self.fragment_path.replace(VIEW_PLACEHOLDER, view)
    }

    pub fn module_path_for(&self, view: &str) -> String {
        self.module_path.replace(VIEW_PLACEHOLDER, view)
    }
}

impl RefreshConfig {
    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_seconds)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_seconds)
    }
}
