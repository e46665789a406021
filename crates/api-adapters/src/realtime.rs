//! # Websocket chat gateway
//!
//! Owns the conversation rooms and the online-presence map. Constructed
//! once at process start and handed to whatever needs to emit events;
//! there is no module-level registry. Presence is local to this process,
//! so sharding across instances would need a shared store.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use domains::{ChatMessage, ChatNotifier};

use crate::envelope::ApiResult;
use crate::AppState;

const ROOM_BUFFER: usize = 64;

/// Events pushed over the wire, JSON-encoded.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ChatEvent {
    NewMessage(ChatMessage),
    #[serde(rename_all = "camelCase")]
    MessageDeleted {
        conversation_id: String,
        message_id: Uuid,
    },
}

/// Frames a connected client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    JoinRoom { conversation_id: String },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { conversation_id: String },
}

pub struct ChatGateway {
    /// conversation id → broadcast channel for everyone in the room.
    rooms: DashMap<String, broadcast::Sender<ChatEvent>>,
    /// account id → that account's live connection. One connection per
    /// account; a newer connection replaces the older one.
    online: DashMap<Uuid, mpsc::UnboundedSender<ChatEvent>>,
}

impl ChatGateway {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            online: DashMap::new(),
        }
    }

    pub fn is_online(&self, account_id: Uuid) -> bool {
        self.online.contains_key(&account_id)
    }

    fn room(&self, conversation_id: &str) -> broadcast::Sender<ChatEvent> {
        self.rooms
            .entry(conversation_id.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_BUFFER).0)
            .clone()
    }

    fn connect(&self, account_id: Uuid, tx: mpsc::UnboundedSender<ChatEvent>) {
        self.online.insert(account_id, tx);
    }

    /// Removes the presence entry only when it still belongs to this
    /// connection; a reconnect may have replaced it already.
    fn disconnect(&self, account_id: Uuid, tx: &mpsc::UnboundedSender<ChatEvent>) {
        self.online
            .remove_if(&account_id, |_, current| current.same_channel(tx));
    }

    /// Drops the room entry once nobody subscribes to it, so idle
    /// conversations do not accumulate for the life of the process.
    fn prune_room(&self, conversation_id: &str) {
        self.rooms
            .remove_if(conversation_id, |_, room| room.receiver_count() == 0);
    }
}

/// A client may only join rooms for conversations it is a party to;
/// the conversation id is the two participant ids joined with `_`.
fn is_participant(conversation_id: &str, account_id: Uuid) -> bool {
    let id = account_id.to_string();
    conversation_id.split('_').any(|part| part == id)
}

impl Default for ChatGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatNotifier for ChatGateway {
    /// Room broadcast plus direct delivery to each participant's own
    /// connection (multi-device echo for the sender). Offline parties
    /// are simply skipped.
    fn message_created(&self, message: &ChatMessage) {
        let event = ChatEvent::NewMessage(message.clone());

        if let Some(room) = self.rooms.get(&message.conversation_id) {
            let _ = room.send(event.clone());
        }
        for account_id in [message.receiver.id, message.sender.id] {
            if let Some(connection) = self.online.get(&account_id) {
                let _ = connection.send(event.clone());
            }
        }
    }

    fn message_deleted(&self, conversation_id: &str, message_id: Uuid) {
        if let Some(room) = self.rooms.get(conversation_id) {
            let _ = room.send(ChatEvent::MessageDeleted {
                conversation_id: conversation_id.to_string(),
                message_id,
            });
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WsAuth {
    token: String,
}

/// `GET /ws/chat?token=...`. Browsers cannot set an Authorization header
/// on a websocket handshake, so the token rides in the query string.
pub async fn chat_ws(
    State(state): State<AppState>,
    Query(auth): Query<WsAuth>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let account = state.auth.authenticate(&auth.token).await?;
    let gateway = state.gateway.clone();
    Ok(ws.on_upgrade(move |socket| client_session(gateway, account.id, socket)))
}

async fn client_session(gateway: Arc<ChatGateway>, account_id: Uuid, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();

    // Everything destined for this client funnels through one channel:
    // direct deliveries and whichever rooms it joins.
    let (tx, mut rx) = mpsc::unbounded_channel::<ChatEvent>();
    gateway.connect(account_id, tx.clone());
    tracing::debug!(account = %account_id, "chat client connected");

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut room_tasks: HashMap<String, JoinHandle<()>> = HashMap::new();
    while let Some(Ok(frame)) = stream.next().await {
        let Message::Text(text) = frame else {
            continue;
        };
        let Ok(frame) = serde_json::from_str::<ClientFrame>(&text) else {
            continue;
        };
        match frame {
            ClientFrame::JoinRoom { conversation_id } => {
                if !is_participant(&conversation_id, account_id) {
                    tracing::debug!(
                        account = %account_id,
                        conversation = %conversation_id,
                        "join refused, not a participant"
                    );
                    continue;
                }
                if room_tasks.contains_key(&conversation_id) {
                    continue;
                }
                let mut room_rx = gateway.room(&conversation_id).subscribe();
                let forward = tx.clone();
                let handle = tokio::spawn(async move {
                    while let Ok(event) = room_rx.recv().await {
                        if forward.send(event).is_err() {
                            break;
                        }
                    }
                });
                room_tasks.insert(conversation_id, handle);
            }
            ClientFrame::LeaveRoom { conversation_id } => {
                if let Some(handle) = room_tasks.remove(&conversation_id) {
                    // await the aborted task so its room receiver is
                    // dropped before the prune check runs
                    handle.abort();
                    let _ = handle.await;
                }
                gateway.prune_room(&conversation_id);
            }
        }
    }

    for (conversation_id, handle) in room_tasks {
        handle.abort();
        let _ = handle.await;
        gateway.prune_room(&conversation_id);
    }
    send_task.abort();
    gateway.disconnect(account_id, &tx);
    tracing::debug!(account = %account_id, "chat client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{conversation_id, AccountKind, AccountRef};

    fn message(sender: Uuid, receiver: Uuid) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: conversation_id(sender, receiver),
            sender: AccountRef {
                kind: AccountKind::Traveler,
                id: sender,
            },
            receiver: AccountRef {
                kind: AccountKind::Guide,
                id: receiver,
            },
            body: "hello".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn online_receiver_gets_direct_delivery() {
        let gateway = ChatGateway::new();
        let receiver = Uuid::now_v7();
        let (tx, mut rx) = mpsc::unbounded_channel();
        gateway.connect(receiver, tx);

        gateway.message_created(&message(Uuid::now_v7(), receiver));
        assert!(matches!(rx.recv().await, Some(ChatEvent::NewMessage(_))));
    }

    #[tokio::test]
    async fn offline_parties_are_skipped_silently() {
        let gateway = ChatGateway::new();
        // nobody online, no room joined; must not panic or block
        gateway.message_created(&message(Uuid::now_v7(), Uuid::now_v7()));
    }

    #[tokio::test]
    async fn room_subscribers_see_deletions() {
        let gateway = ChatGateway::new();
        let mut room_rx = gateway.room("a_b").subscribe();

        let deleted_id = Uuid::now_v7();
        gateway.message_deleted("a_b", deleted_id);

        match room_rx.recv().await.unwrap() {
            ChatEvent::MessageDeleted { message_id, .. } => assert_eq!(message_id, deleted_id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rooms_are_pruned_once_the_last_subscriber_leaves() {
        let gateway = ChatGateway::new();
        let room_rx = gateway.room("a_b").subscribe();

        // an occupied room survives pruning
        gateway.prune_room("a_b");
        assert!(gateway.rooms.contains_key("a_b"));

        drop(room_rx);
        gateway.prune_room("a_b");
        assert!(!gateway.rooms.contains_key("a_b"));
    }

    #[test]
    fn only_parties_to_a_conversation_may_join_its_room() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let room = conversation_id(a, b);

        assert!(is_participant(&room, a));
        assert!(is_participant(&room, b));
        assert!(!is_participant(&room, Uuid::now_v7()));
    }

    #[tokio::test]
    async fn reconnect_replaces_presence_and_stale_disconnect_is_ignored() {
        let gateway = ChatGateway::new();
        let account = Uuid::now_v7();

        let (old_tx, _old_rx) = mpsc::unbounded_channel();
        gateway.connect(account, old_tx.clone());

        let (new_tx, _new_rx) = mpsc::unbounded_channel();
        gateway.connect(account, new_tx);

        // the old connection's teardown must not evict the new one
        gateway.disconnect(account, &old_tx);
        assert!(gateway.is_online(account));
    }
}
