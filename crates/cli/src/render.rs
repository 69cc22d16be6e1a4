//! Terminal rendering of API responses
//!
//! Formatting functions return lines so they can be tested without a
//! terminal; the `print_*` wrappers write them to stdout.

use chrono::{Local, TimeZone};
use colored::Colorize;
use lecli_core::application::QueryObserver;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use tabled::{builder::Builder, settings::Style};

const SAVED_QUERY_SEPARATOR: &str = "**********************************************";
const PROGRESS_WIDTH: usize = 36;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// JSON with a 4-space indent and sorted keys
pub fn pretty_json(value: &Value) -> String {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    // serde_json's default map is ordered by key
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => value.to_string(),
    }
}

pub fn print_json(value: &Value) {
    println!("{}", pretty_json(value));
}

/// Scalar as plain text (strings unquoted)
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Local `YYYY-MM-DD HH:MM:SS` for an epoch in milliseconds
fn local_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .earliest()
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Table of JSON objects, one column per key
pub fn object_table(rows: &[Value], style_pipe: bool) -> String {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        if let Some(object) = row.as_object() {
            for key in object.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        builder.push_record(headers.iter().map(|key| plain(&row[key.as_str()])));
    }

    let mut table = builder.build();
    if style_pipe {
        table.with(Style::markdown());
    } else {
        table.with(Style::blank());
    }
    table.to_string()
}

// ============================================================================
// Query results
// ============================================================================

/// One line per event: red local timestamp, tab, message
pub fn event_lines(page: &Value) -> Vec<String> {
    let Some(events) = page.get("events").and_then(Value::as_array) else {
        return Vec::new();
    };

    events
        .iter()
        .map(|event| {
            let timestamp = event
                .get("timestamp")
                .and_then(Value::as_i64)
                .map(local_timestamp)
                .unwrap_or_default();
            let raw = event.get("message").map(plain).unwrap_or_default();
            let message = match serde_json::from_str::<Value>(&raw) {
                Ok(parsed) => pretty_json(&parsed),
                Err(_) => raw,
            };
            format!("{}\t{}", timestamp.red(), message)
        })
        .collect()
}

/// Statistics as totals + timeseries, groups, or raw JSON
pub fn statistics_lines(page: &Value) -> Vec<String> {
    let stats = &page["statistics"];
    let empty = Map::new();
    let timeseries = stats["timeseries"].as_object().unwrap_or(&empty);
    let groups = stats["groups"].as_array().map(Vec::as_slice).unwrap_or(&[]);

    if let Some(series) = timeseries.values().next().and_then(Value::as_array) {
        if !series.is_empty() {
            return timeseries_lines(stats, series);
        }
    }

    if !groups.is_empty() {
        let mut lines = Vec::new();
        for group in groups {
            let Some(group) = group.as_object() else {
                continue;
            };
            for (key, value) in group {
                lines.push(format!("{}:", key));
                if let Some(inner) = value.as_object() {
                    for (inner_key, inner_value) in inner {
                        lines.push(format!("\t{}: {}", inner_key, plain(inner_value)));
                    }
                }
            }
        }
        return lines;
    }

    vec![pretty_json(page)]
}

fn timeseries_lines(stats: &Value, series: &[Value]) -> Vec<String> {
    let total = stats["stats"]
        .as_object()
        .and_then(|s| s.values().next())
        .and_then(Value::as_object)
        .and_then(|calc| calc.values().next())
        .map(plain)
        .unwrap_or_else(|| "0".to_string());

    let from = stats["from"].as_f64().unwrap_or(0.0);
    let to = stats["to"].as_f64().unwrap_or(0.0);
    let step = (to - from) / series.len() as f64;

    let mut lines = vec![format!("Total: {}", total), "Timeseries: ".to_string()];
    for (index, bucket) in series.iter().enumerate() {
        let millis = from + step * (index + 1) as f64;
        let value = bucket
            .as_object()
            .and_then(|b| b.values().next())
            .map(plain)
            .unwrap_or_default();
        lines.push(format!("{}: {}", local_timestamp(millis as i64), value));
    }
    lines
}

pub fn page_lines(page: &Value) -> Vec<String> {
    if page.get("events").is_some() {
        event_lines(page)
    } else if page.get("statistics").is_some() {
        statistics_lines(page)
    } else {
        Vec::new()
    }
}

fn progress_bar(percent: u64) -> String {
    let percent = percent.min(100) as usize;
    let filled = PROGRESS_WIDTH * percent / 100;
    format!(
        "Progress\t[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        percent
    )
}

/// Query observer drawing a progress bar on stderr and pages on stdout
#[derive(Default)]
pub struct TerminalObserver {
    show_progress: bool,
}

impl TerminalObserver {
    /// Observer for `query` / `events` (with progress bar)
    pub fn with_progress() -> Self {
        Self {
            show_progress: true,
        }
    }

    /// Observer for live tail (pages only)
    pub fn pages_only() -> Self {
        Self {
            show_progress: false,
        }
    }
}

impl QueryObserver for TerminalObserver {
    fn progress(&mut self, percent: u64) {
        if self.show_progress {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "\r{}", progress_bar(percent));
            let _ = stderr.flush();
        }
    }

    fn finished(&mut self) {
        if self.show_progress {
            eprintln!();
        }
    }

    fn page(&mut self, page: &Value) {
        for line in page_lines(page) {
            println!("{}", line);
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

fn team_lines(team: &Value) -> Vec<String> {
    let users = team["users"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    vec![
        format!("ID: {}", plain(&team["id"])),
        format!("Name: {}", plain(&team["name"])),
        format!("Users: {}", object_table(users, false)),
    ]
}

/// `{"teams": [...]}` or `{"team": {...}}`
pub fn teams_lines(body: &Value) -> Vec<String> {
    if let Some(teams) = body.get("teams").and_then(Value::as_array) {
        teams.iter().flat_map(team_lines).collect()
    } else if let Some(team) = body.get("team") {
        team_lines(team)
    } else {
        Vec::new()
    }
}

/// `{"users": [...]}` or `{"owners": [...]}` as a table
pub fn users_table(body: &Value) -> Option<String> {
    ["users", "owners"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .map(|rows| object_table(rows, false))
}

/// Summary printed after a user was added
pub fn added_user_lines(body: &Value) -> Vec<String> {
    let user = &body["user"];
    vec![
        "Added user to account:".to_string(),
        format!(
            "Name: {} {}",
            plain(&user["first_name"]),
            plain(&user["last_name"])
        ),
        format!("Login: {}", plain(&user["login_name"])),
        format!("Email: {}", plain(&user["email"])),
        format!("User Key: {}", plain(&user["id"])),
    ]
}

fn saved_query_lines(query: &Value) -> Vec<String> {
    let logs = query["logs"]
        .as_array()
        .map(|logs| logs.iter().map(plain).collect::<Vec<_>>().join(","))
        .unwrap_or_default();
    let during = &query["leql"]["during"];
    let or_none = |value: &Value| {
        if value.is_null() {
            "None".to_string()
        } else {
            plain(value)
        }
    };

    vec![
        format!("Name: \t{}", plain(&query["name"])),
        format!("Logs: \t{}", logs),
        format!("ID: \t{}", plain(&query["id"])),
        format!("LEQL \tStatement: \t{}", plain(&query["leql"]["statement"])),
        format!("\tTime range: \t{}", or_none(&during["time_range"])),
        format!("\tFrom: \t\t{}", or_none(&during["from"])),
        format!("\tTo: \t\t{}", or_none(&during["to"])),
        SAVED_QUERY_SEPARATOR.to_string(),
    ]
}

/// `{"saved_queries": [...]}` or `{"saved_query": {...}}`
pub fn saved_queries_lines(body: &Value) -> Vec<String> {
    if let Some(queries) = body.get("saved_queries").and_then(Value::as_array) {
        queries.iter().flat_map(saved_query_lines).collect()
    } else if let Some(query) = body.get("saved_query") {
        saved_query_lines(query)
    } else {
        Vec::new()
    }
}

/// Daily usage table sorted by day, then account totals
pub fn usage_lines(body: &Value) -> Vec<String> {
    let mut daily: Vec<Value> = body["daily_usage"].as_array().cloned().unwrap_or_default();
    daily.sort_by(|a, b| plain(&a["day"]).cmp(&plain(&b["day"])));

    vec![
        object_table(&daily, true),
        format!("Total usage:\t{}", plain(&body["period_usage"])),
        format!("Account name:\t{}", plain(&body["name"])),
        format!("Account ID:\t{}", plain(&body["id"])),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
