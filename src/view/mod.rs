//! Single-page view shell: load a view's markup and behavior module, mount
//! it, run its `init`.
//!
//! - [`ViewLoader`] fetches the fragment on every navigation but the behavior
//!   module at most once per session, caching the handle in [`ModuleRegistry`].
//! - [`Router`] owns the active view, highlights navigation and turns every
//!   render-path failure into inline markup.
//! - [`ActionTable`] dispatches `data-action` attributes from rendered markup.

mod actions;
mod catalog;
mod error;
mod loader;
mod module;
mod mount;
mod router;

use std::fmt;

pub use actions::{ActionFuture, ActionHandler, ActionTable, ActionTarget};
pub use catalog::{ModuleCatalog, ModuleFactory};
pub use error::{ActionError, ModuleLoadError, RenderError, ViewError};
pub use loader::{LoadOutcome, ModuleRegistry, ViewLoader};
pub use module::{MissingInit, ViewContext, ViewModule};
pub use mount::{section, Mount};
pub use router::{
    error_markup, view_title, NavEntry, NavigationState, RenderOutcome, Router, LOADING_MARKUP,
    UNAVAILABLE_MARKUP,
};

const MAX_VIEW_NAME_LEN: usize = 64;

/// Name of a mountable view.
///
/// Non-empty, starts with a lowercase letter, then lowercase letters, digits,
/// `_` or `-`. The same name addresses the fragment endpoint and the behavior
/// module resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewName(String);

impl ViewName {
    pub fn parse(name: &str) -> Result<Self, ViewError> {
        let mut chars = name.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_ascii_lowercase());
        let valid_rest =
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if valid_start && valid_rest && name.len() <= MAX_VIEW_NAME_LEN {
            Ok(Self(name.to_string()))
        } else {
            Err(ViewError::InvalidName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ViewName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
