// API Client - URL building, header signing and response checks shared by all services

use crate::domain::{generate_headers, AccountConfig, ApiKeyKind};
use crate::error::{AppError, Result};
use crate::port::{ApiRequest, ApiResponse, Clock, HttpMethod, HttpTransport};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const OWNER_HINT: &str = "Your account may have no owner assigned. \
Please visit www.logentries.com for information on assigning an account owner.";

/// Request pipeline shared by every resource service
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    config: Arc<AccountConfig>,
    clock: Arc<dyn Clock>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: Arc<AccountConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Build the signed path and full url of a resource
    ///
    /// Returns `(path, url)` where `path` has no leading slash.
    pub fn build_url(&self, parts: &[&str]) -> Result<(String, String)> {
        let path = parts.join("/");
        let url = format!("{}/{}", self.config.api_url()?, path);
        Ok((path, url))
    }

    /// Path segments under the configured account
    pub fn account_parts<'a>(&'a self, rest: &[&'a str]) -> Result<Vec<&'a str>> {
        let mut parts = vec![
            "management",
            "accounts",
            self.config.account_resource_id()?,
        ];
        parts.extend_from_slice(rest);
        Ok(parts)
    }

    /// Send a request and return the raw response (unchecked)
    pub async fn request(
        &self,
        method: HttpMethod,
        parts: &[&str],
        kind: ApiKeyKind,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<ApiResponse> {
        let (path, url) = self.build_url(parts)?;

        // Serialize once: the signed bytes must be the bytes on the wire
        let body = match body {
            Some(value) => Some(serde_json::to_string(value)?),
            None if matches!(method, HttpMethod::Get | HttpMethod::Delete) => None,
            None => Some(String::new()),
        };

        let headers = generate_headers(
            kind,
            &self.config,
            method.as_str(),
            &path,
            body.as_deref().unwrap_or(""),
            self.clock.now(),
        )?;

        let request = ApiRequest {
            method,
            url,
            headers,
            query: query.to_vec(),
            body,
        };

        self.dispatch(request).await
    }

    /// Send a request and fail on any error response
    pub async fn call(
        &self,
        method: HttpMethod,
        parts: &[&str],
        kind: ApiKeyKind,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<ApiResponse> {
        let response = self.request(method, parts, kind, body, query).await?;
        check_response(response)
    }

    /// GET an absolute url (continuation links) with the read/write key
    pub async fn fetch(&self, url: &str, query: &[(String, String)]) -> Result<ApiResponse> {
        let headers = generate_headers(
            ApiKeyKind::ReadWrite,
            &self.config,
            HttpMethod::Get.as_str(),
            "",
            "",
            self.clock.now(),
        )?;

        let request = ApiRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers,
            query: query.to_vec(),
            body: None,
        };

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = request.method;
        let url = request.url.clone();

        let mut response = self.transport.send(request).await?;
        response.url = url;

        debug!(
            method = %method,
            url = %response.url,
            status = response.status,
            "API request completed"
        );

        Ok(response)
    }
}

/// Reject rate-limited, failed and non-JSON responses
pub fn check_response(response: ApiResponse) -> Result<ApiResponse> {
    if let Some(remaining) = response.header("x-ratelimit-remaining") {
        if remaining.trim().parse::<i64>().ok() == Some(0) {
            return Err(AppError::RateLimited {
                reset: response
                    .header("x-ratelimit-reset")
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }
    }

    if response.status >= 400 {
        let kind = if response.status < 500 {
            "Client Error"
        } else {
            "Server Error"
        };
        let mut message = format!(
            "{} {}: {} for url: {}",
            response.status,
            kind,
            status_text(response.status),
            response.url
        );
        if let Some(details) = error_details(&response.body) {
            message.push('\n');
            message.push_str(&details);
        }
        if response.status == 500 {
            message.push('\n');
            message.push_str(OWNER_HINT);
        }
        return Err(AppError::Http {
            status: response.status,
            message,
        });
    }

    if response.status == 200 {
        let content_type = response.header("content-type").unwrap_or("");
        if !content_type.starts_with("application/json") {
            return Err(AppError::UnexpectedContentType(content_type.to_string()));
        }
    }

    Ok(response)
}

/// Require the success status an endpoint documents
pub fn expect_status(response: ApiResponse, expected: u16) -> Result<ApiResponse> {
    if response.status == expected {
        Ok(response)
    } else {
        Err(AppError::Http {
            status: response.status,
            message: format!(
                "expected status {} but got {} for url: {}",
                expected, response.status, response.url
            ),
        })
    }
}

/// Parse a response body as JSON, mapping an empty body to `Null`
pub fn body_or_null(response: &ApiResponse) -> Result<Value> {
    if response.body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        response.body_json()
    }
}

/// `fields` / `messages` carried by API error bodies
fn error_details(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let join = |key: &str| {
        value.get(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join(",")
        })
    };

    let mut lines = Vec::new();
    if let Some(fields) = join("fields") {
        lines.push(format!("Invalid field: {}", fields));
    }
    if let Some(messages) = join("messages") {
        lines.push(format!("Message: {}", messages));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unexpected Status",
    }
}
