// reqwest implementation of the HttpTransport port
// reason: async-trait needed for dyn dispatch of async fn
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use lecli_core::error::{AppError, Result};
use lecli_core::port::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP transport backed by a shared `reqwest::Client`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(method_of(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        // Sent verbatim: the signature covers these exact bytes
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let url = response.url().to_string();

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        debug!(status = status, bytes = body.len(), "HTTP response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_mapping() {
        assert_eq!(method_of(HttpMethod::Get), Method::GET);
        assert_eq!(method_of(HttpMethod::Patch), Method::PATCH);
        assert_eq!(method_of(HttpMethod::Delete), Method::DELETE);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let request = ApiRequest {
            method: HttpMethod::Get,
            // Port 9 (discard) on loopback is not expected to accept connections
            url: "http://127.0.0.1:9/management/logs".to_string(),
            headers: vec![],
            query: vec![],
            body: None,
        };

        let result = transport.send(request).await;

        assert!(matches!(result, Err(AppError::Transport(_))));
    }
}
