use std::collections::HashMap;
use std::sync::Arc;

use super::module::ViewModule;

pub type ModuleFactory = Arc<dyn Fn() -> Arc<dyn ViewModule> + Send + Sync>;

/// Registration table from view name to the module implementing it.
///
/// Consulted by the loader once the module resource has been fetched; a view
/// missing here still mounts, with a [`MissingInit`](super::MissingInit).
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, view: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn ViewModule> + Send + Sync + 'static,
    {
        self.factories.insert(view.into(), Arc::new(factory));
        self
    }

    /// Register an already built module; every resolve returns the same handle.
    pub fn register_module(&mut self, view: impl Into<String>, module: Arc<dyn ViewModule>) -> &mut Self {
        self.register(view, move || Arc::clone(&module))
    }

    pub fn resolve(&self, view: &str) -> Option<Arc<dyn ViewModule>> {
        self.factories.get(view).map(|factory| factory())
    }

    pub fn contains(&self, view: &str) -> bool {
        self.factories.contains_key(view)
    }

    pub fn views(&self) -> Vec<String> {
        let mut views: Vec<String> = self.factories.keys().cloned().collect();
        views.sort();
        views
    }
}
