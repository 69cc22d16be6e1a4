// User Service - owner-signed management/accounts/<account>/users

use super::client::{body_or_null, expect_status, ApiClient};
use crate::domain::ApiKeyKind;
use crate::error::{AppError, Result};
use crate::port::{ApiResponse, HttpMethod};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

const ALREADY_ADDED_HINT: &str =
    "User may have already been added to this account or have a Logentries account";
const OWNER_HINT: &str = "User you attempted to add is the account owner";

/// Details of a user that has no Logentries account yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn owner_call(
        &self,
        method: HttpMethod,
        rest: &[&str],
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let parts = self.client.account_parts(rest)?;
        self.client
            .call(method, &parts, ApiKeyKind::Owner, body, &[])
            .await
    }

    pub async fn list(&self) -> Result<Value> {
        self.owner_call(HttpMethod::Get, &["users"], None)
            .await?
            .body_json()
    }

    /// Owner(s) of the account
    pub async fn owner(&self) -> Result<Value> {
        self.owner_call(HttpMethod::Get, &["owners"], None)
            .await?
            .body_json()
    }

    pub async fn add_new(&self, user: &NewUser) -> Result<Value> {
        let body = json!({ "user": user });
        let response = self
            .owner_call(HttpMethod::Post, &["users"], Some(&body))
            .await
            .map_err(with_add_user_hint)?;
        added(response)
    }

    /// Add a user that already has a Logentries account by user key
    pub async fn add_existing(&self, user_key: &str) -> Result<Value> {
        let response = self
            .owner_call(HttpMethod::Post, &["users", user_key], None)
            .await
            .map_err(with_add_user_hint)?;
        added(response)
    }

    pub async fn delete(&self, user_key: &str) -> Result<()> {
        let response = self
            .owner_call(HttpMethod::Delete, &["users", user_key], None)
            .await?;
        expect_status(response, 204)?;
        info!(user_key = %user_key, "Deleted user");
        Ok(())
    }
}

fn added(response: ApiResponse) -> Result<Value> {
    match response.status {
        200 | 201 => body_or_null(&response),
        _ => expect_status(response, 201).map(|_| Value::Null),
    }
}

fn with_add_user_hint(err: AppError) -> AppError {
    match err {
        AppError::Http { status, message } if (400..500).contains(&status) => {
            let hint = if status == 403 {
                OWNER_HINT
            } else {
                ALREADY_ADDED_HINT
            };
            AppError::Http {
                status,
                message: format!("{}\nFailed to add user - {}", message, hint),
            }
        }
        other => other,
    }
}
