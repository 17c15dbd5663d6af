use thiserror::Error;

use crate::api::ApiError;

/// A view's behavior module could not be fetched.
#[derive(Debug, Error)]
pub enum ModuleLoadError {
    #[error("No se pudo cargar {path} ({status})")]
    Unavailable { view: String, path: String, status: u16 },

    #[error("No se pudo cargar {path}: {source}")]
    Transport {
        view: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ModuleLoadError {
    pub fn view(&self) -> &str {
        match self {
            ModuleLoadError::Unavailable { view, .. } | ModuleLoadError::Transport { view, .. } => view,
        }
    }
}

/// Failure raised by a module's `init`.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Failed(String),
}

/// Everything that can go wrong on the render path; the router turns each
/// of these into inline markup.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Invalid view name '{0}'")]
    InvalidName(String),

    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    #[error("{source}")]
    Render {
        view: String,
        #[source]
        source: RenderError,
    },
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unknown action '{0}'")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_load_message_names_resource() {
        let err = ViewError::from(ModuleLoadError::Unavailable {
            view: "caja".to_string(),
            path: "/static/js/admin/caja.js".to_string(),
            status: 404,
        });
        assert_eq!(err.to_string(), "No se pudo cargar /static/js/admin/caja.js (404)");
    }

    #[test]
    fn render_error_shows_api_failure() {
        let err = ViewError::Render {
            view: "pedidos".to_string(),
            source: RenderError::Api(ApiError::Request {
                status: 500,
                body: "boom".to_string(),
            }),
        };
        assert_eq!(err.to_string(), "Error 500: boom");
    }
}
