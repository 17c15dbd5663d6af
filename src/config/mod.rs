//! Panel configuration: TOML file, defaults and validation.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    Config, FeedsConfig, NavItem, RealtimeConfig, RefreshConfig, ServerConfig, ViewsConfig,
    VIEW_PLACEHOLDER,
};
