//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request with query parameters
    async fn get(&self, url: &str, query: &[(&str, String)]) -> crate::Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse>;

    /// Send a PUT request with a JSON body
    async fn put_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse>;

    /// Send a DELETE request
    async fn delete(&self, url: &str) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::DashboardError::Http(format!("Building HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("{} {}", method, url);
        let response = request.send().await.map_err(|e| {
            crate::DashboardError::Http(format!("{} {} failed: {}", method, url, e))
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::DashboardError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> crate::Result<HttpResponse> {
        self.send("GET", url, self.client.get(url).query(query)).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse> {
        self.send("POST", url, self.client.post(url).json(body)).await
    }

    async fn put_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse> {
        self.send("PUT", url, self.client.put(url).json(body)).await
    }

    async fn delete(&self, url: &str) -> crate::Result<HttpResponse> {
        self.send("DELETE", url, self.client.delete(url)).await
    }
}
