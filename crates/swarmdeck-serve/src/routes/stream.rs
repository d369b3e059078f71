// ABOUTME: Live log streaming over Server-Sent Events and WebSocket.
// ABOUTME: Each connection holds one hub subscription for its lifetime.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::time::Duration;
use swarmdeck_core::Subscription;
use tracing::debug;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

pub async fn logs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.panel.feed().subscribe();
    debug!(subscriber = subscription.id(), "SSE subscriber connected");

    let events = stream::unfold(subscription, |mut sub| async move {
        let line = sub.recv().await?;
        Some((Ok::<_, Infallible>(Event::default().data(line)), sub))
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("keep-alive"))
}

pub async fn ws(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    let subscription = state.panel.feed().subscribe();
    upgrade.on_upgrade(move |socket| pump(socket, subscription))
}

async fn pump(mut socket: WebSocket, mut subscription: Subscription) {
    let id = subscription.id();
    debug!(subscriber = id, "WebSocket subscriber connected");
    loop {
        tokio::select! {
            line = subscription.recv() => match line {
                Some(line) => {
                    if socket.send(Message::Text(line)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!(subscriber = id, "WebSocket subscriber disconnected");
}
