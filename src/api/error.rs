use thiserror::Error;

/// Errors returned by [`ApiClient`](super::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response reached us (connection refused, DNS, timeout, ...).
    #[error("Transport error on '{path}': {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Error {status}: {body}")]
    Request { status: u16, body: String },

    /// The server answered successfully but the body did not decode.
    #[error("Invalid response from '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_message_carries_status_and_body() {
        let err = ApiError::Request {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Error 404: Not Found");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_transport());
    }
}
