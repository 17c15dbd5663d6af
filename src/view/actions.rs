use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::error::ActionError;

pub type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type ActionHandler = Arc<dyn Fn(ActionTarget) -> ActionFuture + Send + Sync>;

/// What a delegated click resolved to: the `data-action` name and the
/// optional `data-id` of the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTarget {
    pub action: String,
    pub id: Option<String>,
}

impl ActionTarget {
    pub fn new(action: impl Into<String>, id: Option<String>) -> Self {
        Self {
            action: action.into(),
            id,
        }
    }

    /// Build a target from an element's attributes; `None` without a
    /// `data-action`.
    pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Option<Self> {
        let mut action = None;
        let mut id = None;
        for (name, value) in attributes {
            match name {
                "data-action" => action = Some(value.to_string()),
                "data-id" => id = Some(value.to_string()),
                _ => {}
            }
        }
        action.map(|action| Self { action, id })
    }
}

/// Single delegated listener: maps action names to typed handlers.
#[derive(Clone, Default)]
pub struct ActionTable {
    handlers: HashMap<String, ActionHandler>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(&mut self, action: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(ActionTarget) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: ActionHandler = Arc::new(move |target: ActionTarget| -> ActionFuture { Box::pin(f(target)) });
        self.handlers.insert(action.into(), handler);
        self
    }

    pub fn contains(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    pub async fn dispatch(&self, target: ActionTarget) -> Result<(), ActionError> {
        let Some(handler) = self.handlers.get(&target.action).cloned() else {
            tracing::warn!(action = %target.action, "No handler for action");
            return Err(ActionError::Unknown(target.action));
        };
        tracing::debug!(action = %target.action, id = ?target.id, "Dispatching action");
        handler(target).await;
        Ok(())
    }
}
