//! Query, events and live tail scenarios over a scripted transport

mod common;

use common::{scripted, KEY, LOG_KEY, NOW};
use lecli_core::application::{
    LogSelection, QueryObserver, QueryService, RecentWindow, TailOptions,
};
use lecli_core::domain::{DomainError, QueryOptions};
use lecli_core::error::AppError;
use lecli_core::port::{ApiResponse, HttpMethod};
use serde_json::{json, Value};
use std::time::Duration;

/// Observer recording every callback in order
#[derive(Default)]
struct Transcript {
    progress: Vec<u64>,
    finished: usize,
    pages: Vec<Value>,
}

impl QueryObserver for Transcript {
    fn progress(&mut self, percent: u64) {
        self.progress.push(percent);
    }

    fn finished(&mut self) {
        self.finished += 1;
    }

    fn page(&mut self, page: &Value) {
        self.pages.push(page.clone());
    }
}

fn link(href: &str) -> Value {
    json!([{"rel": "Next", "href": href}])
}

#[tokio::test]
async fn test_query_follows_continuation_links_to_the_final_page() {
    let (client, transport, clock) = scripted(vec![
        ApiResponse::json(202, &json!({"id": "q1", "links": link("https://rest.logentries.com/query/q1")})),
        ApiResponse::json(
            200,
            &json!({"progress": 50, "links": link("https://rest.logentries.com/query/q1?p=2")}),
        ),
        ApiResponse::json(
            200,
            &json!({"events": [{"timestamp": 1_465_370_400_000_i64, "message": "hello"}]}),
        ),
    ]);

    let options = QueryOptions {
        log_keys: vec![LOG_KEY.to_string()],
        leql: Some("where(method=GET)".to_string()),
        time_from: Some(NOW),
        time_to: Some(NOW + 100),
        ..QueryOptions::default()
    };
    let mut transcript = Transcript::default();

    QueryService::new(client)
        .query(options, &mut transcript)
        .await
        .unwrap();

    assert_eq!(transcript.progress, vec![0, 50, 100]);
    assert_eq!(transcript.finished, 1);
    assert_eq!(transcript.pages.len(), 1);
    assert_eq!(transcript.pages[0]["events"][0]["message"], "hello");

    // Only the 202 waits before polling
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, "https://rest.logentries.com/query/logs");
    assert_eq!(
        requests[0].json_body().unwrap(),
        json!({
            "logs": [LOG_KEY],
            "leql": {
                "statement": "where(method=GET)",
                "during": {"from": NOW * 1000, "to": (NOW + 100) * 1000},
            },
        })
    );
    assert_eq!(requests[1].url, "https://rest.logentries.com/query/q1");
    assert_eq!(requests[2].url, "https://rest.logentries.com/query/q1?p=2");
    for request in &requests[1..] {
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.header("x-api-key"), Some(KEY));
    }
}

#[tokio::test]
async fn test_saved_query_with_log_nickname_and_relative_range() {
    let (client, transport, _) = scripted(vec![ApiResponse::json(
        200,
        &json!({"statistics": {"groups": [{"GET": {"count": 3.0}}]}}),
    )]);

    let options = QueryOptions {
        log_nick: Some("WEB".to_string()),
        saved_query_id: Some("sq1".to_string()),
        relative_range: Some("last 3 days".to_string()),
        ..QueryOptions::default()
    };
    let mut transcript = Transcript::default();

    QueryService::new(client)
        .query(options, &mut transcript)
        .await
        .unwrap();

    assert_eq!(transcript.pages.len(), 1);
    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(
        request.url,
        format!("https://rest.logentries.com/query/logs/{}/sq1", LOG_KEY)
    );
    assert_eq!(
        request.query,
        vec![("time_range".to_string(), "last 3 days".to_string())]
    );
}

#[tokio::test]
async fn test_query_nickname_resolves_the_statement() {
    let (client, transport, _) = scripted(vec![ApiResponse::json(200, &json!({"events": []}))]);

    let options = QueryOptions {
        log_group: Some("frontend".to_string()),
        query_nick: Some("errors".to_string()),
        relative_range: Some("yesterday".to_string()),
        ..QueryOptions::default()
    };

    QueryService::new(client)
        .query(options, &mut Transcript::default())
        .await
        .unwrap();

    let body = transport.requests()[0].json_body().unwrap();
    assert_eq!(body["logs"], json!([LOG_KEY, KEY]));
    assert_eq!(body["leql"]["statement"], "where(level=ERROR)");
    assert_eq!(body["leql"]["during"], json!({"time_range": "yesterday"}));
}

#[tokio::test]
async fn test_conflicting_options_send_nothing() {
    let (client, transport, _) = scripted(vec![]);

    let options = QueryOptions {
        log_keys: vec![LOG_KEY.to_string()],
        log_nick: Some("web".to_string()),
        leql: Some("where(x)".to_string()),
        query_nick: Some("errors".to_string()),
        relative_range: Some("today".to_string()),
        ..QueryOptions::default()
    };

    let err = QueryService::new(client)
        .query(options, &mut Transcript::default())
        .await
        .unwrap_err();

    match err {
        AppError::Domain(DomainError::ConflictingOptions(messages)) => {
            assert_eq!(messages.len(), 2)
        }
        other => panic!("expected conflicting options, got {:?}", other),
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_recent_events_window_ends_now() {
    let (client, transport, _) = scripted(vec![ApiResponse::json(200, &json!({"events": []}))]);

    QueryService::new(client)
        .recent_events(
            LogSelection {
                log_keys: vec![LOG_KEY.to_string()],
                ..LogSelection::default()
            },
            RecentWindow::LastSeconds(600),
            &mut Transcript::default(),
        )
        .await
        .unwrap();

    let body = transport.requests()[0].json_body().unwrap();
    assert_eq!(body["leql"]["statement"], "where(/.*/)");
    assert_eq!(
        body["leql"]["during"],
        json!({"from": (NOW - 600) * 1000, "to": NOW * 1000})
    );
}

#[tokio::test]
async fn test_rate_limited_query_reports_reset() {
    let (client, _, _) = scripted(vec![ApiResponse::json(200, &json!({"events": []}))
        .with_header("X-RateLimit-Remaining", "0")
        .with_header("X-RateLimit-Reset", "42")]);

    let err = QueryService::new(client)
        .recent_events(
            LogSelection {
                log_nick: Some("web".to_string()),
                ..LogSelection::default()
            },
            RecentWindow::default(),
            &mut Transcript::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Rate Limit Reached, will reset in 42 seconds");
}

#[tokio::test]
async fn test_tail_renders_every_page_until_links_stop() {
    let (client, transport, clock) = scripted(vec![
        ApiResponse::json(
            200,
            &json!({"events": [{"message": "a"}], "links": link("https://rest.logentries.com/live/1")}),
        ),
        ApiResponse::json(
            200,
            &json!({"events": [{"message": "b"}], "links": link("https://rest.logentries.com/live/2")}),
        ),
        ApiResponse::json(200, &json!({"events": [{"message": "c"}]})),
    ]);

    let options = TailOptions {
        logs: LogSelection {
            log_keys: vec![LOG_KEY.to_string()],
            ..LogSelection::default()
        },
        leql: Some("where(level=ERROR)".to_string()),
        poll_interval: Duration::from_millis(2500),
        ..TailOptions::default()
    };
    let mut transcript = Transcript::default();

    QueryService::new(client)
        .tail(options, &mut transcript)
        .await
        .unwrap();

    let messages: Vec<&str> = transcript
        .pages
        .iter()
        .map(|page| page["events"][0]["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["a", "b", "c"]);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(2500); 2]);

    let requests = transport.requests();
    assert_eq!(requests[0].url, "https://rest.logentries.com/query/live/logs");
    assert_eq!(
        requests[0].json_body().unwrap(),
        json!({"logs": [LOG_KEY], "leql": {"statement": "where(level=ERROR)"}})
    );
    assert_eq!(requests[2].url, "https://rest.logentries.com/live/2");
}

#[tokio::test]
async fn test_tail_stops_after_max_polls() {
    let (client, transport, _) = scripted(vec![
        ApiResponse::json(200, &json!({"events": [], "links": link("https://rest.logentries.com/live/1")})),
        ApiResponse::json(200, &json!({"events": [], "links": link("https://rest.logentries.com/live/2")})),
        ApiResponse::json(200, &json!({"events": [], "links": link("https://rest.logentries.com/live/3")})),
    ]);

    let options = TailOptions {
        saved_query_id: Some("sq1".to_string()),
        max_polls: 2,
        ..TailOptions::default()
    };
    let mut transcript = Transcript::default();

    QueryService::new(client)
        .tail(options, &mut transcript)
        .await
        .unwrap();

    assert_eq!(transcript.pages.len(), 2);
    let requests = transport.requests();
    assert_eq!(
        requests[0].url,
        "https://rest.logentries.com/query/live/saved_query/sq1"
    );
    assert_eq!(transport.remaining(), 0);
}
