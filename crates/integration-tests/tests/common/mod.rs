//! Shared fixtures for the integration tests

#![allow(dead_code)]

use lecli_core::application::ApiClient;
use lecli_core::domain::AccountConfig;
use lecli_core::port::clock::mocks::FixedClock;
use lecli_core::port::http::mocks::ScriptedTransport;
use lecli_core::port::ApiResponse;
use std::sync::Arc;

pub const KEY: &str = "11111111-2222-3333-4444-555555555555";
pub const LOG_KEY: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";
pub const ACCOUNT: &str = "acc00000-0000-0000-0000-000000000000";

/// 2016-06-08 07:20:00 UTC
pub const NOW: i64 = 1_465_370_400;

/// Fully populated account with one log nickname, group and query nickname
pub fn account(api_url: &str) -> AccountConfig {
    let mut config = AccountConfig::default();
    config.auth.account_resource_id = Some(ACCOUNT.to_string());
    config.auth.owner_api_key_id = Some(KEY.to_string());
    config.auth.owner_api_key = Some(KEY.to_string());
    config.auth.rw_api_key = Some(KEY.to_string());
    config.auth.ro_api_key = Some(KEY.to_string());
    config.url.api_url = api_url.to_string();
    config
        .log_nicknames
        .insert("web".to_string(), LOG_KEY.to_string());
    config.log_groups.insert(
        "frontend".to_string(),
        vec![LOG_KEY.to_string(), KEY.to_string()],
    );
    config
        .query_nicknames
        .insert("errors".to_string(), "where(level=ERROR)".to_string());
    config
}

/// Client over a scripted transport with the clock frozen at `NOW`
pub fn scripted(
    responses: Vec<ApiResponse>,
) -> (ApiClient, Arc<ScriptedTransport>, Arc<FixedClock>) {
    let transport = Arc::new(ScriptedTransport::new(responses));
    let clock = Arc::new(FixedClock::at_epoch_seconds(NOW));
    let client = ApiClient::new(
        transport.clone(),
        Arc::new(account("https://rest.logentries.com")),
        clock.clone(),
    );
    (client, transport, clock)
}
