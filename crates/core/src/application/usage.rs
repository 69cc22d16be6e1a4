// Usage Service - usage/accounts/<account>

use super::client::ApiClient;
use crate::domain::ApiKeyKind;
use crate::error::Result;
use crate::port::HttpMethod;
use serde_json::Value;

pub struct UsageService {
    client: ApiClient,
}

impl UsageService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Account usage between two `YYYY-MM-DD` dates
    pub async fn get(&self, start: &str, end: &str) -> Result<Value> {
        let account = self.client.config().account_resource_id()?;
        let query = [
            ("from".to_string(), start.to_string()),
            ("to".to_string(), end.to_string()),
        ];
        self.client
            .call(
                HttpMethod::Get,
                &["usage", "accounts", account],
                ApiKeyKind::ReadWrite,
                None,
                &query,
            )
            .await?
            .body_json()
    }
}
