mod common;

use comanda::config::{Config, ConfigError};
use common::temp_config;

/// Test that Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
    assert_eq!(config.server.api_prefix, "/admin");
    assert_eq!(config.views.initial, "dashboard");
    assert_eq!(config.views.fragment_path_for("menu"), "/admin/menu-content");
    assert_eq!(config.views.module_path_for("menu"), "/static/js/admin/menu.js");
    assert_eq!(config.views.navigation.len(), 8);
    assert_eq!(config.feeds.alerts_capacity, 10);
    assert_eq!(config.feeds.panel_alerts_capacity, 20);
    assert_eq!(config.feeds.activity_capacity, 50);
    assert_eq!(config.refresh.dashboard_seconds, 30);
    assert_eq!(config.refresh.stats_seconds, 300);
    assert!(config.realtime.enabled);
    assert_eq!(config.realtime.max_reconnect_attempts, 5);
    assert!(config.validate().is_ok());
}

/// Test that Config::config_path() ends with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    assert!(Config::config_path().ends_with("comanda/config.toml"));
}

/// Test that a missing file yields the defaults.
#[test]
fn test_missing_file_uses_defaults() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(&temp.path().join("nope.toml")).unwrap();
    assert_eq!(config.views.initial, "dashboard");
}

/// Test that a partial file keeps defaults for everything it omits.
#[test]
fn test_partial_file_merges_with_defaults() {
    let (_dir, path) = temp_config(
        r#"
[server]
base_url = "https://panel.example.com"

[views]
initial = "pedidos"
navigation = [
    { view = "pedidos", label = "Pedidos" },
    { view = "caja", label = "Caja" },
]

[realtime]
mesa_id = "12"
"#,
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.server.base_url, "https://panel.example.com");
    assert_eq!(config.server.timeout_seconds, 30);
    assert_eq!(config.views.initial, "pedidos");
    assert_eq!(config.views.navigation[1].label, "Caja");
    assert_eq!(config.views.fragment_path, "/admin/{view}-content");
    assert_eq!(config.realtime.mesa_id.as_deref(), Some("12"));
    assert_eq!(config.realtime.reconnect_delay_ms, 1000);
}

/// Test that malformed TOML is a parse error naming the file.
#[test]
fn test_parse_error() {
    let (_dir, path) = temp_config("[server\nbase_url = ");
    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("config.toml"));
}

/// Test validation of URLs, templates, view names and numbers.
#[test]
fn test_validation_failures() {
    let cases = [
        "[server]\nbase_url = \"ftp://panel\"",
        "[views]\nfragment_path = \"/admin/content\"",
        "[views]\nmodule_path = \"/static/app.js\"",
        "[views]\ninitial = \"Dashboard\"",
        "[views]\nnavigation = [{ view = \"../etc\", label = \"x\" }]",
        "[feeds]\nalerts_capacity = 0",
        "[refresh]\nstats_seconds = 0",
    ];

    for content in cases {
        let (_dir, path) = temp_config(content);
        let err = Config::load_from(&path).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { .. }),
            "expected validation error for {content:?}, got {err}"
        );
    }
}
