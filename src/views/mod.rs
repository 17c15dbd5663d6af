//! Built-in view modules.

mod dashboard;
mod notifications;
mod resource;

use std::sync::Arc;

use crate::api::Resource;
use crate::view::ModuleCatalog;

pub use dashboard::{render_alerts, stat_alerts, DashboardView, ALERTS_SECTION, SUMMARY_SECTION};
pub use notifications::NotificationsView;
pub use resource::ResourceView;

/// Catalog with the dashboard, the notifications view and one module per
/// REST collection.
pub fn builtin_catalog() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    catalog.register("dashboard", || Arc::new(DashboardView::new()));
    catalog.register("notificaciones", || Arc::new(NotificationsView));
    for resource in Resource::ALL {
        catalog.register(resource.view(), move || Arc::new(ResourceView::new(resource)));
    }
    catalog
}
