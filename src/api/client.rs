use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ServerConfig;

use super::error::ApiError;
use super::resource::Resource;

/// Typed wrapper around GET/POST/PUT/DELETE against the API base.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    /// Build the shared HTTP client from server settings.
    pub fn build_http(server: &ServerConfig) -> reqwest::Result<Client> {
        Client::builder()
            .connect_timeout(server.connect_timeout())
            .timeout(server.timeout())
            .build()
    }

    pub fn new(http: Client, server: &ServerConfig) -> Self {
        let base = format!(
            "{}{}",
            server.base_url.trim_end_matches('/'),
            server.api_prefix.trim_end_matches('/')
        );
        Self { http, base }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path), path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body), path).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body), path).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path), path).await
    }

    pub async fn list(&self, resource: Resource) -> Result<Vec<Value>, ApiError> {
        self.get(resource.list_path()).await
    }

    pub async fn fetch(&self, resource: Resource, id: u64) -> Result<Value, ApiError> {
        self.get(&resource.item_path(id)).await
    }

    pub async fn create(&self, resource: Resource, body: &Value) -> Result<Value, ApiError> {
        self.post(resource.collection_path(), body).await
    }

    pub async fn update(&self, resource: Resource, id: u64, body: &Value) -> Result<Value, ApiError> {
        self.put(&resource.item_path(id), body).await
    }

    pub async fn remove(&self, resource: Resource, id: u64) -> Result<Value, ApiError> {
        self.delete(&resource.item_path(id)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(path = %path, error = %e, "API request failed before a response");
            ApiError::Transport {
                path: path.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if !status.is_success() => {
                tracing::warn!(path = %path, status = status.as_u16(), error = %e, "Failed to read error body");
                String::new()
            }
            Err(e) => {
                return Err(ApiError::Transport {
                    path: path.to_string(),
                    source: e,
                })
            }
        };

        tracing::debug!(path = %path, status = status.as_u16(), "API response");

        if !status.is_success() {
            return Err(ApiError::Request {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            source: e,
        })
    }
}
