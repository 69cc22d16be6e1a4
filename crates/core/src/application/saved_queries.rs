// Saved Query Service - query/saved_queries

use super::client::{body_or_null, expect_status, ApiClient};
use crate::domain::ApiKeyKind;
use crate::error::{AppError, Result};
use crate::port::{ApiResponse, HttpMethod};
use serde_json::{json, Map, Value};
use tracing::info;

const PARTS: [&str; 2] = ["query", "saved_queries"];

/// Saved query attributes; `None` means "not given"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedQueryFields {
    pub name: Option<String>,
    pub statement: Option<String>,
    /// Epoch timestamp, passed through as given
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub time_range: Option<String>,
    /// Colon separated log keys
    pub logs: Option<String>,
}

impl SavedQueryFields {
    fn log_list(&self) -> Option<Vec<String>> {
        self.logs.as_deref().filter(|l| !l.is_empty()).map(|logs| {
            logs.split(':')
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Body for POST: every attribute present, missing ones as null
    fn create_body(&self) -> Result<Value> {
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| AppError::Validation("saved query name is required".to_string()))?;
        let statement = self.statement.as_deref().ok_or_else(|| {
            AppError::Validation("saved query statement is required".to_string())
        })?;

        Ok(json!({"saved_query": {
            "name": name,
            "leql": {
                "statement": statement,
                "during": {
                    "from": self.from,
                    "to": self.to,
                    "time_range": self.time_range,
                },
            },
            "logs": self.log_list().unwrap_or_default(),
        }}))
    }

    /// Body for PATCH: only given attributes, clearing the ones they supersede
    fn update_body(&self) -> Value {
        let mut saved_query = Map::new();
        if let Some(name) = &self.name {
            saved_query.insert("name".to_string(), json!(name));
        }
        if let Some(logs) = self.log_list() {
            saved_query.insert("logs".to_string(), json!(logs));
        }

        let mut during = Map::new();
        if let Some(from) = self.from {
            during.insert("from".to_string(), json!(from));
            during.insert("to".to_string(), Value::Null);
            during.insert("time_range".to_string(), Value::Null);
        }
        if let Some(to) = self.to {
            during.insert("to".to_string(), json!(to));
            during.insert("time_range".to_string(), Value::Null);
        }
        if let Some(range) = &self.time_range {
            during.insert("time_range".to_string(), json!(range));
            during.insert("from".to_string(), Value::Null);
            during.insert("to".to_string(), Value::Null);
        }

        let mut leql = Map::new();
        if let Some(statement) = &self.statement {
            leql.insert("statement".to_string(), json!(statement));
        }
        if !during.is_empty() {
            leql.insert("during".to_string(), Value::Object(during));
        }
        if !leql.is_empty() {
            saved_query.insert("leql".to_string(), Value::Object(leql));
        }

        json!({ "saved_query": saved_query })
    }
}

pub struct SavedQueryService {
    client: ApiClient,
}

impl SavedQueryService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: HttpMethod,
        query_id: Option<&str>,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let mut parts = PARTS.to_vec();
        parts.extend(query_id);
        self.client
            .call(method, &parts, ApiKeyKind::ReadWrite, body, &[])
            .await
    }

    pub async fn list(&self) -> Result<Value> {
        self.send(HttpMethod::Get, None, None).await?.body_json()
    }

    pub async fn get(&self, query_id: &str) -> Result<Value> {
        self.send(HttpMethod::Get, Some(query_id), None)
            .await?
            .body_json()
    }

    pub async fn create(&self, fields: &SavedQueryFields) -> Result<Value> {
        let body = fields.create_body()?;
        let response = self.send(HttpMethod::Post, None, Some(&body)).await?;
        body_or_null(&expect_status(response, 201)?)
    }

    pub async fn update(&self, query_id: &str, fields: &SavedQueryFields) -> Result<Value> {
        let body = fields.update_body();
        let response = self
            .send(HttpMethod::Patch, Some(query_id), Some(&body))
            .await?;
        body_or_null(&expect_status(response, 200)?)
    }

    pub async fn delete(&self, query_id: &str) -> Result<()> {
        let response = self.send(HttpMethod::Delete, Some(query_id), None).await?;
        expect_status(response, 204)?;
        info!(query_id = %query_id, "Deleted saved query");
        Ok(())
    }
}
