//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_server;

use comanda::config::Config;
use comanda::feed::FeedKind;
use comanda::notify::Notifier;
use comanda::Shell;
use parking_lot::Mutex;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub use mock_server::{CapturedRequest, MockResponse, MockServer};

pub const STATS_JSON: &str = r#"{
    "ventas_hoy": 150000, "pedidos_hoy": 4, "pedidos_pendientes": 2,
    "reservas_hoy": 3, "pedidos_mes": 87, "mesas_ocupadas": 3, "total_mesas": 10,
    "inventario_bajo": 1, "total_usuarios": 6,
    "ventas_por_dia": {"2026-10-14": 100000, "2026-10-15": 150000},
    "top_productos": [{"nombre": "Bandeja paisa", "cantidad": 12}]
}"#;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

pub fn fragment_path(view: &str) -> String {
    format!("/admin/{}-content", view)
}

pub fn module_path(view: &str) -> String {
    format!("/static/js/admin/{}.js", view)
}

pub fn api_path(path: &str) -> String {
    format!("/admin{}", path)
}

/// Config pointed at `base_url` with short timeouts and no push channel.
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.server.base_url = base_url.to_string();
    config.server.timeout_seconds = 5;
    config.server.connect_timeout_seconds = 1;
    config.realtime.enabled = false;
    config
}

/// Write `content` to a config file in a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Serve fragments and modules for every default view, plus the dashboard
/// and collection endpoints.
pub async fn panel_server() -> MockServer {
    let server = MockServer::start().await;
    for item in Config::default().views.navigation {
        server
            .route(
                &fragment_path(&item.view),
                MockResponse::html(&format!(r#"<h2 class="view-{0}">{0}</h2>"#, item.view)),
            )
            .await;
        server.route(&module_path(&item.view), MockResponse::script()).await;
    }

    server
        .route(&api_path("/api/dashboard/stats"), MockResponse::json(STATS_JSON))
        .await;
    server
        .route(
            &api_path("/api/dashboard/actividad"),
            MockResponse::json(r#"[{"tipo": "pedido", "mensaje": "Pedido #1 creado"}]"#),
        )
        .await;
    server
        .route(&api_path("/api/dashboard/alertas"), MockResponse::json("[]"))
        .await;

    for path in [
        "/api/pedidos",
        "/api/reservas",
        "/api/inventario/lista",
        "/api/menu",
        "/api/mesas",
        "/api/usuarios/lista",
    ] {
        server
            .route(&api_path(path), MockResponse::json(r#"[{"id": 1}, {"id": 2}]"#))
            .await;
    }
    server
}

/// Notifier that records every notice and chime.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(String, FeedKind)>>,
    chimes: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<(String, FeedKind)> {
        self.notices.lock().clone()
    }

    pub fn count_of(&self, message: &str) -> usize {
        self.notices.lock().iter().filter(|(m, _)| m == message).count()
    }

    pub fn chimes(&self) -> usize {
        self.chimes.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str, kind: FeedKind) {
        self.notices.lock().push((message.to_string(), kind));
    }

    fn chime(&self) {
        self.chimes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shell with the built-in views against `server`.
pub fn shell_for(server: &MockServer, notifier: Arc<RecordingNotifier>) -> Shell {
    Shell::with_builtin_views(test_config(&server.base_url()), notifier).expect("shell")
}

/// Poll `check` until it holds or `timeout` passes.
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, check: F) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
