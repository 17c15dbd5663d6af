mod common;

use std::time::Duration;

use comanda::bridge::ConnectionState;
use comanda::feed::FeedKind;
use comanda::Shell;
use common::{api_path, panel_server, test_config, wait_until, MockResponse, RecordingNotifier};

/// Test that the push channel feeds the bridge end to end.
#[tokio::test]
async fn test_realtime_events_reach_the_feeds() {
    let server = panel_server().await;
    server
        .enqueue(
            "/socket/events",
            MockResponse::sse(&[
                ("connection_response", r#"{"status": "connected"}"#),
                ("stock_bajo", r#"{"item": "Papa", "cantidad": 3, "unidad": "kg"}"#),
            ]),
        )
        .await;
    let mut config = test_config(&server.base_url());
    config.realtime.enabled = true;
    config.realtime.reconnect_delay_ms = 5_000;
    let notifier = RecordingNotifier::new();
    let mut shell = Shell::with_builtin_views(config, notifier.clone()).unwrap();
    shell.start().await;

    assert!(shell.connect_realtime().unwrap());

    let app = shell.app().clone();
    assert!(wait_until(Duration::from_secs(3), || app.feeds.panel_alerts.len() == 1).await);
    assert_eq!(
        app.feeds.panel_alerts.front().unwrap().message,
        "Stock bajo de Papa: 3 kg"
    );
    assert!(wait_until(Duration::from_secs(3), || {
        notifier.count_of("Conexión perdida. Reconectando...") == 1
    })
    .await);
    assert_eq!(notifier.notices()[0], ("Conexión establecida".to_string(), FeedKind::Success));

    tokio::time::timeout(Duration::from_secs(5), shell.shutdown())
        .await
        .expect("shutdown should not hang");
}

/// Test that a disabled push channel is not opened.
#[tokio::test]
async fn test_realtime_disabled() {
    let server = panel_server().await;
    let mut shell = Shell::with_builtin_views(test_config(&server.base_url()), RecordingNotifier::new()).unwrap();

    assert!(!shell.connect_realtime().unwrap());
    assert_eq!(server.hits("/socket/events").await, 0);
    assert_eq!(shell.bridge().status().get(), ConnectionState::Disconnected);
}

/// Test that an invalid config is rejected before anything starts.
#[tokio::test]
async fn test_invalid_config_rejected() {
    let mut config = test_config("http://127.0.0.1:1");
    config.views.fragment_path = "/admin/content".to_string();

    let result = Shell::with_builtin_views(config, RecordingNotifier::new());

    assert!(matches!(result, Err(comanda::ShellError::Config(_))));
}

/// Test that shutdown completes promptly with timers running.
#[tokio::test]
async fn test_shutdown_stops_timers() {
    let server = panel_server().await;
    let mut shell = Shell::with_builtin_views(test_config(&server.base_url()), RecordingNotifier::new()).unwrap();
    shell.start().await;
    let session = shell.app().session().clone();

    tokio::time::timeout(Duration::from_secs(3), shell.shutdown())
        .await
        .expect("shutdown should not hang");

    assert!(session.is_ending());
}

/// Test that a failing alerts request keeps the activity already loaded.
#[tokio::test]
async fn test_initial_load_keeps_activity_when_alerts_fail() {
    let server = panel_server().await;
    server
        .route(
            &api_path("/api/dashboard/actividad"),
            MockResponse::json(
                r#"[{"tipo": "pedido", "mensaje": "Nuevo pedido #4", "tiempo": "2020-01-01T10:00:00"}]"#,
            ),
        )
        .await;
    server
        .route(&api_path("/api/dashboard/alertas"), MockResponse::error(500, "fallo"))
        .await;
    let notifier = RecordingNotifier::new();
    let mut shell = Shell::with_builtin_views(test_config(&server.base_url()), notifier.clone()).unwrap();

    shell.start().await;

    let app = shell.app().clone();
    assert_eq!(app.feeds.activity.len(), 1);
    assert_eq!(app.feeds.activity.front().unwrap().message, "Nuevo pedido #4");
    assert!(app.feeds.panel_alerts.is_empty());
    assert_eq!(notifier.count_of(comanda::app::INITIAL_LOAD_FAILED_NOTICE), 1);
    shell.shutdown().await;
}
