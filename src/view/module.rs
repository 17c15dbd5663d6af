use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;

use super::error::RenderError;
use super::mount::Mount;
use super::ViewName;

/// Everything a module's `init` gets to work with.
#[derive(Clone)]
pub struct ViewContext {
    pub view: ViewName,
    pub app: Arc<AppContext>,
    pub mount: Mount,
    /// Cancelled once a newer render has started; skip writes to `mount`
    /// after that.
    pub token: CancellationToken,
}

impl ViewContext {
    pub fn is_current(&self) -> bool {
        !self.token.is_cancelled()
    }
}

/// Behavior bound to a view. Instantiated once per session and re-initialized
/// on every render of that view.
#[async_trait]
pub trait ViewModule: Send + Sync {
    fn name(&self) -> &str;

    async fn init(&self, ctx: &ViewContext) -> Result<(), RenderError>;
}

/// Stand-in for a view whose module resource exists but registers no
/// behavior.
pub struct MissingInit {
    view: String,
}

impl MissingInit {
    pub fn new(view: impl Into<String>) -> Self {
        Self { view: view.into() }
    }
}

#[async_trait]
impl ViewModule for MissingInit {
    fn name(&self) -> &str {
        &self.view
    }

    async fn init(&self, _ctx: &ViewContext) -> Result<(), RenderError> {
        tracing::info!(view = %self.view, "View module has no init");
        Ok(())
    }
}
