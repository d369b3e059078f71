// ABOUTME: Tests the Discord REST client and channel mirror against a local fake API.
// ABOUTME: The fake records each request's path, auth header and JSON body.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swarmdeck_core::LogHub;
use swarmdeck_discord::commands::definitions;
use swarmdeck_discord::mirror::run_mirror;
use swarmdeck_discord::DiscordRest;

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    auth: String,
    body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn record(State(log): State<Log>, uri: Uri, headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    log.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        auth,
        body,
    });
    StatusCode::OK
}

async fn fake_discord() -> (String, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/applications/:id/commands", put(record))
        .route("/channels/:id/messages", post(record))
        .with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), log)
}

#[tokio::test]
async fn registers_commands_with_bot_auth() {
    let (base, log) = fake_discord().await;
    let rest = DiscordRest::new("secret-bot").with_base_url(base);

    rest.register_commands("app-1", &definitions()).await.unwrap();

    let recorded = log.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].path, "/applications/app-1/commands");
    assert_eq!(recorded[0].auth, "Bot secret-bot");
    assert_eq!(recorded[0].body, definitions());
}

#[tokio::test]
async fn posts_messages() {
    let (base, log) = fake_discord().await;
    let rest = DiscordRest::new("t").with_base_url(base);

    rest.post_message("chan-9", "hello").await.unwrap();

    let recorded = log.lock().unwrap().clone();
    assert_eq!(recorded[0].path, "/channels/chan-9/messages");
    assert_eq!(recorded[0].body["content"], "hello");
}

#[tokio::test]
async fn api_errors_surface() {
    let (base, _log) = fake_discord().await;
    let rest = DiscordRest::new("t").with_base_url(format!("{}/missing", base));
    assert!(rest.post_message("c", "x").await.is_err());
}

#[tokio::test]
async fn mirror_batches_lines_into_one_message() {
    let (base, log) = fake_discord().await;
    let rest = DiscordRest::new("t").with_base_url(base);
    let hub = LogHub::new();
    let sub = hub.subscribe();

    let task = tokio::spawn(run_mirror(rest, "logs".into(), sub, Duration::from_millis(100)));

    hub.publish("12:00:00 first");
    hub.publish("12:00:01 second");
    hub.publish("12:00:02 third");

    let mut messages = Vec::new();
    for _ in 0..50 {
        messages = log.lock().unwrap().clone();
        if !messages.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    task.abort();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].path, "/channels/logs/messages");
    assert_eq!(
        messages[0].body["content"],
        "12:00:00 first\n12:00:01 second\n12:00:02 third"
    );
}
