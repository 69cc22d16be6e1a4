// Log Service - management/logs resource

use super::client::{body_or_null, expect_status, ApiClient};
use crate::domain::{combine_objects, ApiKeyKind};
use crate::error::{AppError, Result};
use crate::port::HttpMethod;
use serde_json::{json, Value};
use tracing::info;

const LOGS: &str = "logs";

/// Body for `create`: either a bare name or a full JSON document
#[derive(Debug, Clone, PartialEq)]
pub enum NewResource {
    Name(String),
    Params(Value),
}

impl NewResource {
    pub(crate) fn into_body(self, key: &str) -> Value {
        match self {
            NewResource::Name(name) => json!({ key: { "name": name } }),
            NewResource::Params(params) => params,
        }
    }
}

pub struct LogService {
    client: ApiClient,
}

impl LogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value> {
        let response = self
            .client
            .call(HttpMethod::Get, &["management", LOGS], ApiKeyKind::ReadOnly, None, &[])
            .await?;
        response.body_json()
    }

    pub async fn get(&self, log_id: &str) -> Result<Value> {
        let response = self
            .client
            .call(
                HttpMethod::Get,
                &["management", LOGS, log_id],
                ApiKeyKind::ReadOnly,
                None,
                &[],
            )
            .await?;
        response.body_json()
    }

    pub async fn create(&self, log: NewResource) -> Result<Value> {
        let body = log.into_body("log");
        let response = self
            .client
            .call(
                HttpMethod::Post,
                &["management", LOGS],
                ApiKeyKind::ReadWrite,
                Some(&body),
                &[],
            )
            .await?;
        body_or_null(&expect_status(response, 201)?)
    }

    pub async fn delete(&self, log_id: &str) -> Result<()> {
        let response = self
            .client
            .call(
                HttpMethod::Delete,
                &["management", LOGS, log_id],
                ApiKeyKind::ReadWrite,
                None,
                &[],
            )
            .await?;
        expect_status(response, 204)?;
        info!(log_id = %log_id, "Deleted log");
        Ok(())
    }

    /// PUT the full log document
    pub async fn replace(&self, log_id: &str, params: &Value) -> Result<Value> {
        let response = self
            .client
            .call(
                HttpMethod::Put,
                &["management", LOGS, log_id],
                ApiKeyKind::ReadWrite,
                Some(params),
                &[],
            )
            .await?;
        body_or_null(&expect_status(response, 200)?)
    }

    pub async fn rename(&self, log_id: &str, name: &str) -> Result<Value> {
        let mut log = self.get(log_id).await?;
        match log.get_mut("log").and_then(Value::as_object_mut) {
            Some(inner) => {
                inner.insert("name".to_string(), Value::String(name.to_string()));
            }
            None => {
                return Err(AppError::Internal(format!(
                    "response for log {} has no 'log' object",
                    log_id
                )))
            }
        }
        self.replace(log_id, &log).await
    }

    /// Merge `params` into the current log, after checking its logsets exist
    pub async fn update(&self, log_id: &str, params: Value) -> Result<Value> {
        for logset_id in referenced_logsets(&params) {
            let response = self
                .client
                .request(
                    HttpMethod::Get,
                    &["management", "logsets", logset_id.as_str()],
                    ApiKeyKind::ReadOnly,
                    None,
                    &[],
                )
                .await?;
            if response.status != 200 {
                return Err(AppError::NotFound(
                    "One or more of the specified logsets does not exist.".to_string(),
                ));
            }
        }

        let current = self.get(log_id).await?;
        let merged = combine_objects(current, params);
        self.replace(log_id, &merged).await
    }
}

/// Logset ids named in `logsets_info`, nested under `log` or at the top level
fn referenced_logsets(params: &Value) -> Vec<String> {
    let infos = params
        .get("log")
        .and_then(|log| log.get("logsets_info"))
        .or_else(|| params.get("logsets_info"))
        .and_then(Value::as_array);

    infos
        .map(|infos| {
            infos
                .iter()
                .filter_map(|info| info.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
