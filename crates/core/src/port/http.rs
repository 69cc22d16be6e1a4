// HTTP Transport Port
// reason: async-trait needed for dyn dispatch of async fn
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// HTTP verbs used by the REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully prepared request (headers already signed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Serialized body, exactly as signed
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body parsed back into JSON (test helper)
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .filter(|b| !b.is_empty())
            .and_then(|b| serde_json::from_str(b).ok())
    }
}

/// Raw response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
    /// Url the response came from, filled in by the client
    pub url: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
            url: String::new(),
        }
    }

    /// JSON response with `Content-Type: application/json`
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string()).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse the body as JSON
    pub fn body_json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(AppError::from)
    }
}

/// Transport that performs a single HTTP exchange
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the raw response
    ///
    /// Non-2xx statuses are NOT errors at this level; only failures to
    /// complete the exchange are.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport replaying canned responses in order and recording requests
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn push(&self, response: ApiResponse) {
            self.responses.lock().unwrap().push_back(response);
        }

        /// Requests sent so far
        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Responses not consumed yet
        pub fn remaining(&self) -> usize {
            self.responses.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses.lock().unwrap().pop_front().ok_or_else(|| {
                AppError::Transport(format!(
                    "no scripted response for {} {}",
                    request.method, request.url
                ))
            })
        }
    }
}
