use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Client;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::config::{ServerConfig, ViewsConfig};

use super::catalog::ModuleCatalog;
use super::error::ModuleLoadError;
use super::module::{MissingInit, ViewModule};
use super::mount::Mount;
use super::ViewName;

type ModuleSlot = Arc<OnceCell<Arc<dyn ViewModule>>>;

/// Session-wide record of which behavior modules have been loaded.
///
/// A slot is filled at most once; concurrent loads of the same view wait on
/// the first one instead of fetching again. A failed load leaves the slot
/// empty so a later navigation can retry.
#[derive(Default)]
pub struct ModuleRegistry {
    slots: Mutex<HashMap<ViewName, ModuleSlot>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, view: &ViewName) -> ModuleSlot {
        Arc::clone(self.slots.lock().entry(view.clone()).or_default())
    }

    pub fn is_loaded(&self, view: &str) -> bool {
        self.handle(view).is_some()
    }

    pub fn handle(&self, view: &str) -> Option<Arc<dyn ViewModule>> {
        let slots = self.slots.lock();
        slots
            .iter()
            .find(|(name, _)| name.as_str() == view)
            .and_then(|(_, slot)| slot.get().cloned())
    }

    pub fn loaded_views(&self) -> Vec<String> {
        let slots = self.slots.lock();
        let mut views: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(name, _)| name.to_string())
            .collect();
        views.sort();
        views
    }
}

/// Result of mounting a view.
pub enum LoadOutcome {
    /// Fragment mounted, module ready for `init`.
    Ready(Arc<dyn ViewModule>),
    /// No fragment for this view; nothing was mounted.
    Unavailable,
    /// A newer render started before the fragment could be mounted.
    Superseded,
}

/// Fetches view fragments and behavior modules and mounts them.
pub struct ViewLoader {
    http: Client,
    server: ServerConfig,
    views: ViewsConfig,
    catalog: ModuleCatalog,
    registry: Arc<ModuleRegistry>,
    mount: Mount,
}

impl ViewLoader {
    pub fn new(
        http: Client,
        server: ServerConfig,
        views: ViewsConfig,
        catalog: ModuleCatalog,
        mount: Mount,
    ) -> Self {
        Self {
            http,
            server,
            views,
            catalog,
            registry: Arc::new(ModuleRegistry::new()),
            mount,
        }
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Mount `view` and return its module, or `None` when the view has no
    /// fragment.
    pub async fn load_view(&self, view: &ViewName) -> Result<Option<Arc<dyn ViewModule>>, ModuleLoadError> {
        match self.load_view_for(view, &CancellationToken::new()).await? {
            LoadOutcome::Ready(module) => Ok(Some(module)),
            LoadOutcome::Unavailable | LoadOutcome::Superseded => Ok(None),
        }
    }

    /// Mount `view` on behalf of the render owning `token`.
    ///
    /// 1. Fetch the fragment; an unreachable endpoint or non-success status
    ///    yields [`LoadOutcome::Unavailable`].
    /// 2. Replace the mount's markup with the fragment, unless `token` has
    ///    been cancelled meanwhile.
    /// 3. Return the cached module, or fetch the module resource once and
    ///    resolve it from the catalog. A missing resource fails with
    ///    [`ModuleLoadError`].
    pub async fn load_view_for(
        &self,
        view: &ViewName,
        token: &CancellationToken,
    ) -> Result<LoadOutcome, ModuleLoadError> {
        let Some(fragment) = self.fetch_fragment(view).await else {
            return Ok(LoadOutcome::Unavailable);
        };

        if token.is_cancelled() {
            tracing::debug!(view = %view, "Render superseded, dropping fragment");
            return Ok(LoadOutcome::Superseded);
        }
        self.mount.replace(fragment);

        let slot = self.registry.slot(view);
        if let Some(module) = slot.get() {
            return Ok(LoadOutcome::Ready(Arc::clone(module)));
        }

        let module = slot
            .get_or_try_init(|| self.fetch_module(view))
            .await?;
        Ok(LoadOutcome::Ready(Arc::clone(module)))
    }

    async fn fetch_fragment(&self, view: &ViewName) -> Option<String> {
        let path = self.views.fragment_path_for(view.as_str());
        let response = match self.http.get(self.server.url(&path)).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(view = %view, path = %path, error = %e, "No markup for view, using fallback");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(view = %view, path = %path, status = response.status().as_u16(), "View fragment not available");
            return None;
        }

        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(view = %view, path = %path, error = %e, "Failed to read view fragment");
                None
            }
        }
    }

    async fn fetch_module(&self, view: &ViewName) -> Result<Arc<dyn ViewModule>, ModuleLoadError> {
        let path = self.views.module_path_for(view.as_str());
        let response = self
            .http
            .get(self.server.url(&path))
            .send()
            .await
            .map_err(|e| ModuleLoadError::Transport {
                view: view.to_string(),
                path: path.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModuleLoadError::Unavailable {
                view: view.to_string(),
                path,
                status: status.as_u16(),
            });
        }

        let module = match self.catalog.resolve(view.as_str()) {
            Some(module) => module,
            None => {
                tracing::debug!(view = %view, "No module registered for view");
                Arc::new(MissingInit::new(view.as_str())) as Arc<dyn ViewModule>
            }
        };
        tracing::info!(view = %view, module = module.name(), "View module loaded");
        Ok(module)
    }
}
