// Team Service - management/accounts/<account>/teams

use super::client::{body_or_null, expect_status, ApiClient};
use crate::domain::ApiKeyKind;
use crate::error::{AppError, Result};
use crate::port::HttpMethod;
use serde_json::{json, Value};
use tracing::info;

const TEAMS: &str = "teams";

pub struct TeamService {
    client: ApiClient,
}

impl TeamService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: HttpMethod,
        team_id: Option<&str>,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<crate::port::ApiResponse> {
        let mut rest = vec![TEAMS];
        rest.extend(team_id);
        let parts = self.client.account_parts(&rest)?;
        self.client
            .call(method, &parts, ApiKeyKind::ReadWrite, body, query)
            .await
    }

    pub async fn list(&self) -> Result<Value> {
        self.send(HttpMethod::Get, None, None, &[]).await?.body_json()
    }

    pub async fn get(&self, team_id: &str) -> Result<Value> {
        let query = [("teamid".to_string(), team_id.to_string())];
        self.send(HttpMethod::Get, Some(team_id), None, &query)
            .await?
            .body_json()
    }

    pub async fn create(&self, name: &str) -> Result<Value> {
        let body = json!({"team": {"name": name, "users": []}});
        let response = self.send(HttpMethod::Post, None, Some(&body), &[]).await?;
        body_or_null(&expect_status(response, 201)?)
    }

    pub async fn delete(&self, team_id: &str) -> Result<()> {
        let response = self
            .send(HttpMethod::Delete, Some(team_id), None, &[])
            .await?;
        expect_status(response, 204)?;
        info!(team_id = %team_id, "Deleted team");
        Ok(())
    }

    /// PATCH only the name; a placeholder user keeps the member list untouched
    pub async fn rename(&self, team_id: &str, name: &str) -> Result<Value> {
        let body = json!({"team": {"name": name, "users": [{"id": ""}]}});
        let response = self
            .send(HttpMethod::Patch, Some(team_id), Some(&body), &[])
            .await?;
        body_or_null(&expect_status(response, 200)?)
    }

    pub async fn add_user(&self, team_id: &str, user_key: &str) -> Result<Value> {
        let team = self.get(team_id).await?;
        let body = json!({"team": {
            "name": team_name(&team, team_id)?,
            "users": [{"id": user_key}],
        }});
        let response = self
            .send(HttpMethod::Patch, Some(team_id), Some(&body), &[])
            .await?;
        body_or_null(&expect_status(response, 200)?)
    }

    pub async fn remove_user(&self, team_id: &str, user_key: &str) -> Result<Value> {
        let team = self.get(team_id).await?;
        let users: Vec<Value> = team["team"]["users"]
            .as_array()
            .map(|users| {
                users
                    .iter()
                    .filter(|user| user.get("id").and_then(Value::as_str) != Some(user_key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let body = json!({"team": {"name": team_name(&team, team_id)?, "users": users}});
        let response = self
            .send(HttpMethod::Put, Some(team_id), Some(&body), &[])
            .await?;
        body_or_null(&expect_status(response, 200)?)
    }
}

fn team_name(team: &Value, team_id: &str) -> Result<String> {
    team["team"]["name"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::NotFound(format!("Cannot find team {}", team_id)))
}
