use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::config::NavItem;
use crate::markup::escape;

use super::error::ViewError;
use super::loader::{LoadOutcome, ViewLoader};
use super::module::ViewContext;
use super::ViewName;

pub const LOADING_MARKUP: &str = r#"<div class="card"><div class="card-body">Cargando...</div></div>"#;
pub const UNAVAILABLE_MARKUP: &str = "<p>Vista no disponible</p>";

/// Which view is active and the title shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub active_view: String,
    pub title: String,
}

impl NavigationState {
    pub fn new(view: &str) -> Self {
        Self {
            active_view: view.to_string(),
            title: view_title(view, &[]),
        }
    }
}

/// One navigation affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub view: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Fragment mounted and the module's `init` completed.
    Rendered,
    /// The view has no fragment; the fallback placeholder is shown.
    Unavailable,
    /// Something failed; the mount shows an inline error with this message.
    Failed(String),
    /// A newer render started; this one left the mount alone.
    Superseded,
}

/// Display title for `view`.
pub fn view_title(view: &str, navigation: &[NavEntry]) -> String {
    let known = match view {
        "dashboard" => Some("Panel Principal"),
        "pedidos" => Some("Pedidos"),
        "reservas" => Some("Reservas"),
        "usuarios" => Some("Usuarios"),
        "inventario" => Some("Inventario"),
        "menu" => Some("Menú"),
        "mesas" => Some("Mesas"),
        _ => None,
    };
    match known {
        Some(title) => title.to_string(),
        None => navigation
            .iter()
            .find(|entry| entry.view == view)
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| view.to_string()),
    }
}

/// Inline error block shown in place of a view.
pub fn error_markup(message: &str) -> String {
    format!(
        r#"<div class="card"><div class="card-body"><p class="error">Error: {}</p></div></div>"#,
        escape(message)
    )
}

/// Owns the navigation state and drives renders through the loader.
///
/// Every render gets a fresh cancellation token and cancels the previous
/// one, so a slow render that finishes after a newer navigation never
/// overwrites the newer view.
pub struct Router {
    app: Arc<AppContext>,
    loader: ViewLoader,
    entries: RwLock<Vec<NavEntry>>,
    current: Mutex<CancellationToken>,
}

impl Router {
    pub fn new(app: Arc<AppContext>, loader: ViewLoader, navigation: &[NavItem]) -> Self {
        let active = app.active_view();
        let entries = navigation
            .iter()
            .map(|item| NavEntry {
                view: item.view.clone(),
                label: item.label.clone(),
                active: item.view == active,
            })
            .collect();
        Self {
            app,
            loader,
            entries: RwLock::new(entries),
            current: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn active_view(&self) -> String {
        self.app.active_view()
    }

    pub fn navigation(&self) -> Vec<NavEntry> {
        self.entries.read().clone()
    }

    pub fn loader(&self) -> &ViewLoader {
        &self.loader
    }

    /// Make `view` the active view, highlight its entry and render it.
    ///
    /// An invalid name leaves the state untouched and shows an inline error.
    pub async fn set_active_view(&self, view: &str) -> RenderOutcome {
        if let Err(err) = ViewName::parse(view) {
            tracing::warn!(view = %view, "Refusing to navigate to invalid view");
            self.loader.mount().replace(error_markup(&err.to_string()));
            return RenderOutcome::Failed(err.to_string());
        }

        let title = {
            let mut entries = self.entries.write();
            for entry in entries.iter_mut() {
                entry.active = entry.view == view;
            }
            view_title(view, &entries)
        };
        self.app.set_navigation(NavigationState {
            active_view: view.to_string(),
            title,
        });
        tracing::info!(view = %view, "Active view changed");

        self.render().await
    }

    /// Render the active view. Never fails: errors end up as inline markup.
    pub async fn render(&self) -> RenderOutcome {
        let token = {
            let mut current = self.current.lock();
            current.cancel();
            *current = CancellationToken::new();
            current.clone()
        };

        let view = self.app.active_view();
        let mount = self.loader.mount();
        mount.replace(LOADING_MARKUP);

        match self.try_render(&view, &token).await {
            Ok(outcome) => outcome,
            Err(_) if token.is_cancelled() => RenderOutcome::Superseded,
            Err(err) => {
                tracing::error!(view = %view, error = %err, "View render failed");
                mount.replace(error_markup(&err.to_string()));
                RenderOutcome::Failed(err.to_string())
            }
        }
    }

    async fn try_render(&self, view: &str, token: &CancellationToken) -> Result<RenderOutcome, ViewError> {
        let name = ViewName::parse(view)?;

        let module = match self.loader.load_view_for(&name, token).await? {
            LoadOutcome::Ready(module) => module,
            LoadOutcome::Superseded => return Ok(RenderOutcome::Superseded),
            LoadOutcome::Unavailable => {
                if token.is_cancelled() {
                    return Ok(RenderOutcome::Superseded);
                }
                self.loader.mount().replace(UNAVAILABLE_MARKUP);
                return Ok(RenderOutcome::Unavailable);
            }
        };

        if token.is_cancelled() {
            return Ok(RenderOutcome::Superseded);
        }

        let ctx = ViewContext {
            view: name,
            app: Arc::clone(&self.app),
            mount: self.loader.mount().clone(),
            token: token.clone(),
        };
        module.init(&ctx).await.map_err(|source| ViewError::Render {
            view: view.to_string(),
            source,
        })?;

        if token.is_cancelled() {
            Ok(RenderOutcome::Superseded)
        } else {
            Ok(RenderOutcome::Rendered)
        }
    }
}
