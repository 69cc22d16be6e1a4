// Logset Service - management/logsets resource

use super::client::{body_or_null, expect_status, ApiClient};
use super::logs::NewResource;
use crate::domain::{combine_objects, remove_log_from_logset, ApiKeyKind};
use crate::error::{AppError, Result};
use crate::port::HttpMethod;
use serde_json::{json, Value};
use tracing::info;

const LOGSETS: &str = "logsets";

pub struct LogsetService {
    client: ApiClient,
}

impl LogsetService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value> {
        self.client
            .call(
                HttpMethod::Get,
                &["management", LOGSETS],
                ApiKeyKind::ReadOnly,
                None,
                &[],
            )
            .await?
            .body_json()
    }

    pub async fn get(&self, logset_id: &str) -> Result<Value> {
        self.client
            .call(
                HttpMethod::Get,
                &["management", LOGSETS, logset_id],
                ApiKeyKind::ReadOnly,
                None,
                &[],
            )
            .await?
            .body_json()
    }

    pub async fn create(&self, logset: NewResource) -> Result<Value> {
        let body = logset.into_body("logset");
        let response = self
            .client
            .call(
                HttpMethod::Post,
                &["management", LOGSETS],
                ApiKeyKind::ReadWrite,
                Some(&body),
                &[],
            )
            .await?;
        body_or_null(&expect_status(response, 201)?)
    }

    pub async fn delete(&self, logset_id: &str) -> Result<()> {
        let response = self
            .client
            .call(
                HttpMethod::Delete,
                &["management", LOGSETS, logset_id],
                ApiKeyKind::ReadWrite,
                None,
                &[],
            )
            .await?;
        expect_status(response, 204)?;
        info!(logset_id = %logset_id, "Deleted logset");
        Ok(())
    }

    pub async fn replace(&self, logset_id: &str, params: &Value) -> Result<Value> {
        let response = self
            .client
            .call(
                HttpMethod::Put,
                &["management", LOGSETS, logset_id],
                ApiKeyKind::ReadWrite,
                Some(params),
                &[],
            )
            .await?;
        body_or_null(&expect_status(response, 200)?)
    }

    pub async fn rename(&self, logset_id: &str, name: &str) -> Result<Value> {
        let mut logset = self.get(logset_id).await?;
        let inner = logset
            .get_mut("logset")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| missing_logset_object(logset_id))?;
        inner.insert("name".to_string(), Value::String(name.to_string()));
        self.replace(logset_id, &logset).await
    }

    pub async fn add_log(&self, logset_id: &str, log_id: &str) -> Result<Value> {
        let current = self.get(logset_id).await?;
        let addition = json!({"logset": {"logs_info": [{"id": log_id}]}});
        let merged = combine_objects(current, addition);
        self.replace(logset_id, &merged).await
    }

    pub async fn remove_log(&self, logset_id: &str, log_id: &str) -> Result<Value> {
        let mut logset = self.get(logset_id).await?;
        if !remove_log_from_logset(&mut logset, log_id) {
            return Err(AppError::NotFound(format!(
                "Log {} is not in logset {}",
                log_id, logset_id
            )));
        }
        self.replace(logset_id, &logset).await
    }
}

fn missing_logset_object(logset_id: &str) -> AppError {
    AppError::Internal(format!(
        "response for logset {} has no 'logset' object",
        logset_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::client;
    use crate::port::http::mocks::ScriptedTransport;
    use crate::port::ApiResponse;
    use std::sync::Arc;

    fn service(responses: Vec<ApiResponse>) -> (LogsetService, Arc<ScriptedTransport>) {
        let (client, transport, _) = client(responses);
        (LogsetService::new(client), transport)
    }

    fn logset() -> Value {
        json!({"logset": {"id": "s1", "name": "prod", "logs_info": [{"id": "a"}]}})
    }

    #[tokio::test]
    async fn test_add_log_appends_to_logs_info() {
        let (service, transport) = service(vec![
            ApiResponse::json(200, &logset()),
            ApiResponse::json(200, &logset()),
        ]);

        service.add_log("s1", "b").await.unwrap();

        let put = &transport.requests()[1];
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(
            put.json_body().unwrap()["logset"]["logs_info"],
            json!([{"id": "a"}, {"id": "b"}])
        );
    }

    #[tokio::test]
    async fn test_remove_log_prunes_entry() {
        let (service, transport) = service(vec![
            ApiResponse::json(200, &logset()),
            ApiResponse::json(200, &logset()),
        ]);

        service.remove_log("s1", "a").await.unwrap();

        let put = &transport.requests()[1];
        assert_eq!(put.json_body().unwrap()["logset"]["logs_info"], json!([]));
    }

    #[tokio::test]
    async fn test_remove_unknown_log_does_not_replace() {
        let (service, transport) = service(vec![ApiResponse::json(200, &logset())]);

        let err = service.remove_log("s1", "zzz").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_rename() {
        let (service, transport) = service(vec![
            ApiResponse::json(200, &logset()),
            ApiResponse::json(200, &logset()),
        ]);

        service.rename("s1", "staging").await.unwrap();

        let put = &transport.requests()[1];
        assert_eq!(put.json_body().unwrap()["logset"]["name"], "staging");
        assert!(put.url.ends_with("/management/logsets/s1"));
    }
}
