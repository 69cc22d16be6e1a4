// API Key Service - management/accounts/<account>/apikeys

use super::client::{body_or_null, expect_status, ApiClient};
use crate::domain::ApiKeyKind;
use crate::error::Result;
use crate::port::{ApiResponse, HttpMethod};
use serde_json::{json, Value};
use tracing::info;

const APIKEYS: &str = "apikeys";

pub struct ApiKeyService {
    client: ApiClient,
}

impl ApiKeyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: HttpMethod,
        api_key_id: Option<&str>,
        kind: ApiKeyKind,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let mut rest = vec![APIKEYS];
        rest.extend(api_key_id);
        let parts = self.client.account_parts(&rest)?;
        self.client.call(method, &parts, kind, body, &[]).await
    }

    pub async fn get(&self, api_key_id: &str) -> Result<Value> {
        self.send(HttpMethod::Get, Some(api_key_id), ApiKeyKind::ReadWrite, None)
            .await?
            .body_json()
    }

    /// List keys; the rw key cannot see owner keys, so `owner` switches to owner signing
    pub async fn list(&self, owner: bool) -> Result<Value> {
        let kind = if owner {
            ApiKeyKind::Owner
        } else {
            ApiKeyKind::ReadWrite
        };
        self.send(HttpMethod::Get, None, kind, None)
            .await?
            .body_json()
    }

    pub async fn create(&self, payload: &Value) -> Result<Value> {
        let response = self
            .send(HttpMethod::Post, None, ApiKeyKind::Owner, Some(payload))
            .await?;
        body_or_null(&expect_status(response, 201)?)
    }

    pub async fn delete(&self, api_key_id: &str) -> Result<()> {
        let response = self
            .send(HttpMethod::Delete, Some(api_key_id), ApiKeyKind::Owner, None)
            .await?;
        expect_status(response, 204)?;
        info!(api_key_id = %api_key_id, "Deleted api key");
        Ok(())
    }

    /// Enable or disable a key
    pub async fn set_active(&self, api_key_id: &str, active: bool) -> Result<Value> {
        let body = json!({"apikey": {"active": active}});
        let response = self
            .send(
                HttpMethod::Patch,
                Some(api_key_id),
                ApiKeyKind::Owner,
                Some(&body),
            )
            .await?;
        body_or_null(&expect_status(response, 200)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::client;
    use crate::domain::sign;
    use crate::port::http::mocks::ScriptedTransport;
    use std::sync::Arc;

    fn service(responses: Vec<ApiResponse>) -> (ApiKeyService, Arc<ScriptedTransport>) {
        let (client, transport, _) = client(responses);
        (ApiKeyService::new(client), transport)
    }

    #[tokio::test]
    async fn test_list_switches_key_tier() {
        let (service, transport) = service(vec![
            ApiResponse::json(200, &json!({"apikeys": []})),
            ApiResponse::json(200, &json!({"apikeys": []})),
        ]);

        service.list(false).await.unwrap();
        service.list(true).await.unwrap();

        let requests = transport.requests();
        assert!(requests[0].header("x-api-key").is_some());
        assert!(requests[0].header("authorization-api-key").is_none());
        assert!(requests[1].header("authorization-api-key").is_some());
    }

    #[tokio::test]
    async fn test_set_active_signs_exact_body() {
        let (service, transport) = service(vec![ApiResponse::json(
            200,
            &json!({"apikey": {"active": true}}),
        )]);

        service.set_active("k1", true).await.unwrap();

        let request = &transport.requests()[0];
        let body = request.body.clone().unwrap();
        assert_eq!(body, r#"{"apikey":{"active":true}}"#);

        let path = request
            .url
            .trim_start_matches("https://rest.logentries.com/")
            .to_string();
        let expected = sign(
            crate::application::test_support::KEY,
            request.header("Date").unwrap(),
            "application/json",
            "PATCH",
            &path,
            &body,
        );
        let header = request.header("authorization-api-key").unwrap();
        assert!(header.ends_with(&format!(":{}", expected)));
    }

    #[tokio::test]
    async fn test_create_expects_201() {
        let (service, _) = service(vec![ApiResponse::json(200, &json!({}))]);
        assert!(service.create(&json!({"apikey": {}})).await.is_err());
    }
}
