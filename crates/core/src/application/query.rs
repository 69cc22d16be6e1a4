//! Query Service - LEQL queries, event retrieval and live tail
//!
//! The query endpoint answers asynchronously: a 202 (or a 200 carrying a
//! non-zero `progress`) hands back a continuation link in `links[0].href`
//! which is polled until the final page arrives. Live tail follows the same
//! link chain at a fixed interval.

use super::client::{body_or_null, check_response, ApiClient};
use crate::domain::{
    resolve_log_keys, ApiKeyKind, QueryOptions, TimeRange, ALL_EVENTS_QUERY,
};
use crate::error::{AppError, Result};
use crate::port::{ApiResponse, HttpMethod};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default window of `recent_events`: 20 minutes
pub const DEFAULT_RECENT_SECONDS: i64 = 1200;

/// Upper bound on live tail polls
pub const DEFAULT_MAX_POLLS: usize = 1000;

/// Wait before following a 202 continuation link
const CONTINUE_DELAY: Duration = Duration::from_secs(1);

/// Output port for query results
pub trait QueryObserver {
    /// Completion percentage reported by the server (0..=100)
    fn progress(&mut self, percent: u64);

    /// The query is complete; called once, right before the final page
    fn finished(&mut self);

    /// A page of events or statistics
    fn page(&mut self, page: &Value);
}

/// Which logs to read: explicit keys, or a configured nickname / group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSelection {
    pub log_keys: Vec<String>,
    pub log_nick: Option<String>,
    pub log_group: Option<String>,
}

/// Window for `recent_events`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecentWindow {
    LastSeconds(i64),
    Relative(String),
}

impl Default for RecentWindow {
    fn default() -> Self {
        RecentWindow::LastSeconds(DEFAULT_RECENT_SECONDS)
    }
}

#[derive(Debug, Clone)]
pub struct TailOptions {
    pub logs: LogSelection,
    pub leql: Option<String>,
    pub poll_interval: Duration,
    pub saved_query_id: Option<String>,
    pub max_polls: usize,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            logs: LogSelection::default(),
            leql: None,
            poll_interval: Duration::from_secs(1),
            saved_query_id: None,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

pub struct QueryService {
    client: ApiClient,
}

impl QueryService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Run a LEQL or saved query and drive it to completion
    pub async fn query(
        &self,
        options: QueryOptions,
        observer: &mut dyn QueryObserver,
    ) -> Result<()> {
        let resolved = options.resolve(self.client.config())?;

        let response = match &resolved.saved_query_id {
            Some(saved_query_id) => {
                let params = resolved
                    .time_range
                    .as_ref()
                    .map(TimeRange::to_query_params)
                    .unwrap_or_default();
                self.run_saved_query(saved_query_id, &resolved.log_keys, &params)
                    .await?
            }
            None => {
                let range = resolved.time_range.as_ref().ok_or_else(|| {
                    AppError::Validation("a time range is required".to_string())
                })?;
                self.post_query(&resolved.log_keys, &resolved.statement, range)
                    .await?
            }
        };

        self.follow(response, observer).await
    }

    /// All events of the selected logs within `range`
    pub async fn events(
        &self,
        logs: LogSelection,
        range: TimeRange,
        observer: &mut dyn QueryObserver,
    ) -> Result<()> {
        let log_keys = self.resolve_logs(logs)?;
        let response = self.post_query(&log_keys, ALL_EVENTS_QUERY, &range).await?;
        self.follow(response, observer).await
    }

    /// Events of the selected logs leading up to now
    pub async fn recent_events(
        &self,
        logs: LogSelection,
        window: RecentWindow,
        observer: &mut dyn QueryObserver,
    ) -> Result<()> {
        let range = match window {
            RecentWindow::LastSeconds(seconds) => {
                TimeRange::last_seconds(self.client.clock().now(), seconds)?
            }
            RecentWindow::Relative(range) => TimeRange::Relative(range),
        };
        self.events(logs, range, observer).await
    }

    /// Follow the live endpoint, handing every page to the observer
    pub async fn tail(&self, options: TailOptions, observer: &mut dyn QueryObserver) -> Result<()> {
        let log_keys = {
            let logs = options.logs;
            resolve_log_keys(
                logs.log_keys,
                logs.log_nick.as_deref(),
                logs.log_group.as_deref(),
                self.client.config(),
            )?
        };

        let mut response = match &options.saved_query_id {
            Some(saved_query_id) => {
                let joined = log_keys.join(":");
                let parts: Vec<&str> = if log_keys.is_empty() {
                    vec!["query", "live", "saved_query", saved_query_id.as_str()]
                } else {
                    vec!["query", "live", "logs", joined.as_str(), saved_query_id.as_str()]
                };
                self.client
                    .request(HttpMethod::Get, &parts, ApiKeyKind::ReadWrite, None, &[])
                    .await?
            }
            None => {
                if log_keys.is_empty() {
                    return Err(missing_logs());
                }
                let mut payload = json!({ "logs": log_keys });
                if let Some(statement) = &options.leql {
                    payload["leql"] = json!({ "statement": statement });
                }
                self.client
                    .request(
                        HttpMethod::Post,
                        &["query", "live", "logs"],
                        ApiKeyKind::ReadWrite,
                        Some(&payload),
                        &[],
                    )
                    .await?
            }
        };

        for poll in 0..options.max_polls {
            let checked = check_response(response)?;
            let body = body_or_null(&checked)?;

            if checked.status == 200 {
                observer.page(&body);
            }

            match next_link(&body) {
                Some(url) => {
                    debug!(poll = poll, url = %url, "Following live tail link");
                    self.client.clock().sleep(options.poll_interval).await;
                    response = self.client.fetch(&url, &[]).await?;
                }
                None => {
                    warn!("No continue link found in the received response.");
                    return Ok(());
                }
            }
        }

        debug!(max_polls = options.max_polls, "Live tail poll limit reached");
        Ok(())
    }

    fn resolve_logs(&self, logs: LogSelection) -> Result<Vec<String>> {
        let log_keys = resolve_log_keys(
            logs.log_keys,
            logs.log_nick.as_deref(),
            logs.log_group.as_deref(),
            self.client.config(),
        )?;
        if log_keys.is_empty() {
            return Err(missing_logs());
        }
        Ok(log_keys)
    }

    async fn post_query(
        &self,
        log_keys: &[String],
        statement: &str,
        range: &TimeRange,
    ) -> Result<ApiResponse> {
        let payload = json!({
            "logs": log_keys,
            "leql": {"statement": statement, "during": range.to_json()},
        });
        self.client
            .request(
                HttpMethod::Post,
                &["query", "logs"],
                ApiKeyKind::ReadWrite,
                Some(&payload),
                &[],
            )
            .await
    }

    async fn run_saved_query(
        &self,
        saved_query_id: &str,
        log_keys: &[String],
        params: &[(String, String)],
    ) -> Result<ApiResponse> {
        let joined = log_keys.join(":");
        let parts: Vec<&str> = if log_keys.is_empty() {
            vec!["query", "saved_query", saved_query_id]
        } else {
            vec!["query", "logs", joined.as_str(), saved_query_id]
        };
        self.client
            .request(HttpMethod::Get, &parts, ApiKeyKind::ReadWrite, None, params)
            .await
    }

    /// Continuation loop: poll until a final page with no further link
    async fn follow(&self, mut response: ApiResponse, observer: &mut dyn QueryObserver) -> Result<()> {
        loop {
            let checked = check_response(response)?;
            let body = body_or_null(&checked)?;

            match checked.status {
                202 => {
                    observer.progress(0);
                    self.client.clock().sleep(CONTINUE_DELAY).await;
                }
                200 => match progress_of(&body) {
                    Some(percent) => {
                        debug!(progress = percent, "Query in progress");
                        observer.progress(percent);
                    }
                    None => {
                        observer.progress(100);
                        observer.finished();
                        observer.page(&body);
                    }
                },
                status => {
                    debug!(status = status, "Query finished with no content");
                    return Ok(());
                }
            }

            match next_link(&body) {
                Some(url) => response = self.client.fetch(&url, &[]).await?,
                None => return Ok(()),
            }
        }
    }
}

/// `links[0].href` of a query response
fn next_link(body: &Value) -> Option<String> {
    body.get("links")?
        .get(0)?
        .get("href")?
        .as_str()
        .map(str::to_string)
}

/// Percentage of a still running query; absent or zero `progress` means done
fn progress_of(body: &Value) -> Option<u64> {
    let progress = body.get("progress")?.as_f64().filter(|p| *p > 0.0)?;
    Some(progress.min(100.0) as u64)
}

fn missing_logs() -> AppError {
    AppError::Validation(
        "Either of log keys, log nick or log group must be supplied.".to_string(),
    )
}
