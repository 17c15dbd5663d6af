//! Headless shell for the restaurant admin panel: view loading and
//! navigation, bounded feeds, stat counters and the real-time event bridge.

pub mod api;
pub mod app;
pub mod bridge;
pub mod config;
pub mod feed;
pub mod logging;
pub mod markup;
pub mod notify;
pub mod shutdown;
pub mod sse;
pub mod view;
pub mod views;

pub use app::{AppContext, Shell, ShellError};
pub use config::Config;
