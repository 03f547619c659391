use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use std::sync::Arc;
use tokio::select;
use tokio::time::{interval_at, Duration, Instant};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamMap;
use tracing::{debug, error, info, warn};

use super::{
    broadcaster::{topics, Broadcaster},
    messages::{Channel, ClientMessage, WsMessage},
};
use crate::auth::AuthService;
use crate::library::{CommunityService, LibraryService};

const HEARTBEAT: Duration = Duration::from_secs(30);

type WsSender = SplitSink<WebSocket, Message>;

/// WebSocket connection state
pub struct WsState {
    pub broadcaster: Broadcaster,
    pub auth: Arc<AuthService>,
    pub library: Arc<LibraryService>,
    pub community: Arc<CommunityService>,
}

/// Handle WebSocket upgrade request
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriptions: StreamMap<Channel, BroadcastStream<WsMessage>> = StreamMap::new();
    let mut heartbeat = interval_at(Instant::now() + HEARTBEAT, HEARTBEAT);

    info!("WebSocket client connected");

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if handle_client_message(&text, &mut subscriptions, &mut sender, &state)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            Some((channel, update)) = subscriptions.next(), if !subscriptions.is_empty() => {
                match update {
                    Ok(message) => {
                        if send(&mut sender, &message).await.is_err() {
                            break;
                        }
                    }
                    // Every update is a full snapshot, the next one catches up
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        debug!("Client lagged {} updates on {:?}", skipped, channel);
                    }
                }
            }

            _ = heartbeat.tick() => {
                let ping = WsMessage::Ping { timestamp: chrono::Utc::now() };
                if send(&mut sender, &ping).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(subscriptions);
    state.broadcaster.cleanup_empty_channels();
    info!("WebSocket connection closed");
}

/// Handle one client message; only socket failures are returned
async fn handle_client_message(
    text: &str,
    subscriptions: &mut StreamMap<Channel, BroadcastStream<WsMessage>>,
    sender: &mut WsSender,
    state: &WsState,
) -> Result<(), axum::Error> {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => return send(sender, &WsMessage::error(format!("Invalid message: {}", e))).await,
    };

    match client_msg {
        ClientMessage::Subscribe { channel, token } => {
            let topic = match resolve_topic(state, channel, token.as_deref()).await {
                Ok(topic) => topic,
                Err(message) => return send(sender, &WsMessage::error(message)).await,
            };

            // Subscribe before the snapshot so no update falls in between
            subscriptions.insert(
                channel,
                BroadcastStream::new(state.broadcaster.subscribe(&topic)),
            );
            send(sender, &WsMessage::Subscribed { channel }).await?;

            match snapshot(state, &topic).await {
                Ok(message) => send(sender, &message).await?,
                Err(message) => send(sender, &WsMessage::error(message)).await?,
            }
            info!("Client subscribed to: {}", topic);
        }
        ClientMessage::Unsubscribe { channel } => {
            subscriptions.remove(&channel);
            send(sender, &WsMessage::Unsubscribed { channel }).await?;
            info!("Client unsubscribed from: {:?}", channel);
        }
        ClientMessage::Ping => {
            let pong = WsMessage::Pong {
                timestamp: chrono::Utc::now(),
            };
            send(sender, &pong).await?;
        }
    }

    Ok(())
}

/// Topic for a subscription request; `saved` needs a valid session token
async fn resolve_topic(
    state: &WsState,
    channel: Channel,
    token: Option<&str>,
) -> Result<String, String> {
    match channel {
        Channel::Community => Ok(topics::COMMUNITY.to_string()),
        Channel::Saved => {
            let token = token.ok_or_else(|| "saved channel requires a token".to_string())?;
            let user = state
                .auth
                .authenticate(token)
                .await
                .map_err(|e| e.to_string())?;
            Ok(topics::saved(&user.uid))
        }
    }
}

/// Current state of a topic, sent right after subscribing
async fn snapshot(state: &WsState, topic: &str) -> Result<WsMessage, String> {
    let result = match topic.strip_prefix("saved:") {
        Some(uid) => state.library.snapshot(uid).await,
        None => state.community.snapshot().await,
    };
    result.map_err(|e| e.to_string())
}

async fn send(sender: &mut WsSender, message: &WsMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            error!("Failed to encode WebSocket message: {}", e);
            Ok(())
        }
    }
}
