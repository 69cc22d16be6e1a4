// Query Options - validation and resolution of `lecli query` style inputs

use super::config::AccountConfig;
use super::error::{DomainError, Result};
use super::time_range::TimeRange;

/// Statement matching every event
pub const ALL_EVENTS_QUERY: &str = "where(/.*/)";

/// Raw query options as given on the command line
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub log_keys: Vec<String>,
    pub log_nick: Option<String>,
    pub log_group: Option<String>,
    pub leql: Option<String>,
    pub query_nick: Option<String>,
    pub saved_query_id: Option<String>,
    pub time_from: Option<i64>,
    pub time_to: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub relative_range: Option<String>,
}

/// Query ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub log_keys: Vec<String>,
    pub statement: String,
    /// None only for saved queries, which carry their own range
    pub time_range: Option<TimeRange>,
    pub saved_query_id: Option<String>,
}

impl QueryOptions {
    /// Check option combinations, reporting every violation at once
    ///
    /// Conflicting options win over missing ones; options that merely lack
    /// input fail with `IncompleteOptions`.
    pub fn validate(&self) -> Result<()> {
        let has_logs = !self.log_keys.is_empty();
        let has_nick_or_group = self.log_nick.is_some() || self.log_group.is_some();
        let has_start = self.time_from.is_some() || self.date_from.is_some();
        let leql_is_custom = self
            .leql
            .as_deref()
            .map(|q| q != ALL_EVENTS_QUERY)
            .unwrap_or(false);

        let mut errors = Vec::new();
        let mut missing = Vec::new();

        if has_nick_or_group && has_logs {
            errors.push(
                "Cannot define lognicks or loggroups and logkeys together in the same query request."
                    .to_string(),
            );
        }
        if self.time_from.is_some() && self.date_from.is_some() {
            errors.push(
                "Cannot define start time(epoch) and start date(ISO-8601) in the same query request."
                    .to_string(),
            );
        }
        if self.saved_query_id.is_some() && (leql_is_custom || self.query_nick.is_some()) {
            errors.push(
                "Cannot define saved query and LEQL/query nickname in the same query request."
                    .to_string(),
            );
        }
        if self.leql.is_some() && self.query_nick.is_some() {
            errors.push(
                "Cannot define a LEQL query and query nickname in the same query request."
                    .to_string(),
            );
        }
        if self.log_nick.is_some() && self.log_group.is_some() {
            errors.push(
                "Cannot define a log nickname and a log group in the same query request."
                    .to_string(),
            );
        }
        if self.relative_range.is_some() && has_start {
            errors.push(
                "Cannot define relative time range and start time/date in the same query request."
                    .to_string(),
            );
        }
        if !(has_logs || has_nick_or_group || self.saved_query_id.is_some()) {
            missing.push(
                "Either of log keys, log nick, log group or saved query must be supplied."
                    .to_string(),
            );
        }
        if !(has_start || self.relative_range.is_some() || self.saved_query_id.is_some()) {
            missing.push(
                "Either of start time, start date or relative time range must be supplied."
                    .to_string(),
            );
        }
        if self.time_from.is_some() != self.time_to.is_some() {
            missing.push("Start time and end time must be supplied together.".to_string());
        }
        if self.date_from.is_some() != self.date_to.is_some() {
            missing.push("Start date and end date must be supplied together.".to_string());
        }

        if !errors.is_empty() {
            errors.extend(missing);
            Err(DomainError::ConflictingOptions(errors))
        } else if !missing.is_empty() {
            Err(DomainError::IncompleteOptions(missing))
        } else {
            Ok(())
        }
    }

    /// Time range selected by the options (options must be validated)
    pub fn time_range(&self) -> Result<Option<TimeRange>> {
        if let Some(range) = &self.relative_range {
            return Ok(Some(TimeRange::Relative(range.clone())));
        }
        if let (Some(from), Some(to)) = (self.time_from, self.time_to) {
            return TimeRange::from_epoch_seconds(from, to).map(Some);
        }
        if let (Some(from), Some(to)) = (&self.date_from, &self.date_to) {
            return TimeRange::from_dates(from, to).map(Some);
        }
        Ok(None)
    }

    /// Validate, then resolve nicknames and groups against the config
    pub fn resolve(self, config: &AccountConfig) -> Result<ResolvedQuery> {
        self.validate()?;

        let time_range = self.time_range()?;

        let statement = match (&self.leql, &self.query_nick) {
            (Some(leql), _) => leql.clone(),
            (None, Some(nick)) => config.named_query(nick)?,
            (None, None) => ALL_EVENTS_QUERY.to_string(),
        };

        let log_keys = resolve_log_keys(
            self.log_keys,
            self.log_nick.as_deref(),
            self.log_group.as_deref(),
            config,
        )?;

        Ok(ResolvedQuery {
            log_keys,
            statement,
            time_range,
            saved_query_id: self.saved_query_id,
        })
    }
}

/// Replace explicit keys with a nickname or group lookup when one is given
pub fn resolve_log_keys(
    log_keys: Vec<String>,
    log_nick: Option<&str>,
    log_group: Option<&str>,
    config: &AccountConfig,
) -> Result<Vec<String>> {
    if let Some(nick) = log_nick {
        config.named_log_key(nick)
    } else if let Some(group) = log_group {
        config.named_log_group(group)
    } else {
        Ok(log_keys)
    }
}
