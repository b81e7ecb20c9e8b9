//! In-process room hub.
//!
//! Tracks connected clients, the rooms each has joined, and the channel used
//! to push envelopes to its socket task.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::broadcaster::Broadcaster;
use crate::channel::Channel;
use crate::error::{BroadcastError, BroadcastResult};
use crate::event::{Envelope, RealtimeEvent};

/// A registered connection.
struct Subscriber {
    rooms: HashSet<Channel>,
    sender: mpsc::Sender<Envelope>,
}

/// Manages all live connections and their room memberships.
#[derive(Default)]
pub struct RoomHub {
    subscribers: RwLock<HashMap<Uuid, Subscriber>>,
}

impl RoomHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. It starts in no rooms.
    pub async fn register(&self, connection_id: Uuid, sender: mpsc::Sender<Envelope>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(
            connection_id,
            Subscriber {
                rooms: HashSet::new(),
                sender,
            },
        );
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Remove a connection and all of its memberships.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Add a connection to a room.
    pub async fn join(&self, connection_id: Uuid, channel: Channel) -> BroadcastResult<()> {
        let mut subscribers = self.subscribers.write().await;
        let subscriber = subscribers
            .get_mut(&connection_id)
            .ok_or(BroadcastError::UnknownConnection(connection_id))?;
        if subscriber.rooms.insert(channel) {
            tracing::info!(connection_id = %connection_id, room = %channel, "Joined room");
        }
        Ok(())
    }

    /// Remove a connection from a room.
    pub async fn leave(&self, connection_id: Uuid, channel: Channel) -> BroadcastResult<()> {
        let mut subscribers = self.subscribers.write().await;
        let subscriber = subscribers
            .get_mut(&connection_id)
            .ok_or(BroadcastError::UnknownConnection(connection_id))?;
        if subscriber.rooms.remove(&channel) {
            tracing::info!(connection_id = %connection_id, room = %channel, "Left room");
        }
        Ok(())
    }

    /// Rooms a connection has joined.
    pub async fn rooms_of(&self, connection_id: Uuid) -> Vec<Channel> {
        let subscribers = self.subscribers.read().await;
        subscribers
            .get(&connection_id)
            .map(|s| s.rooms.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of connections in a room.
    pub async fn room_size(&self, channel: Channel) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers
            .values()
            .filter(|s| s.rooms.contains(&channel))
            .count()
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn deliver(
        &self,
        channel: Option<Channel>,
        event: &RealtimeEvent,
    ) -> BroadcastResult<usize> {
        let envelope = event.envelope()?;
        let subscribers = self.subscribers.read().await;
        let mut delivered = 0;
        for (connection_id, subscriber) in subscribers.iter() {
            if channel.is_some_and(|c| !subscriber.rooms.contains(&c)) {
                continue;
            }
            match subscriber.sender.try_send(envelope.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "Failed to queue event"
                    );
                }
            }
        }
        Ok(delivered)
    }
}

#[async_trait]
impl Broadcaster for RoomHub {
    async fn emit(&self, channel: Channel, event: RealtimeEvent) -> BroadcastResult<usize> {
        let delivered = self.deliver(Some(channel), &event).await?;
        tracing::debug!(room = %channel, event = event.name(), delivered, "Emitted");
        Ok(delivered)
    }

    async fn emit_all(&self, event: RealtimeEvent) -> BroadcastResult<usize> {
        let delivered = self.deliver(None, &event).await?;
        tracing::debug!(event = event.name(), delivered, "Emitted to all");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_dice::{DiceResponse, DiceSpec};

    async fn connect(hub: &RoomHub) -> (Uuid, mpsc::Receiver<Envelope>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(8);
        hub.register(id, tx).await;
        (id, rx)
    }

    #[tokio::test]
    async fn emits_only_to_room_members() {
        let hub = RoomHub::new();
        let (gm, mut gm_rx) = connect(&hub).await;
        let (player, mut player_rx) = connect(&hub).await;
        hub.join(gm, Channel::Admin).await.unwrap();
        hub.join(player, Channel::portrait(7)).await.unwrap();

        let delivered = hub
            .emit(Channel::portrait(7), RealtimeEvent::DiceRoll)
            .await
            .unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(player_rx.recv().await.unwrap().event, "diceRoll");
        assert!(gm_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn emit_all_reaches_everyone() {
        let hub = RoomHub::new();
        let (_, mut a) = connect(&hub).await;
        let (_, mut b) = connect(&hub).await;
        let delivered = hub
            .emit_all(RealtimeEvent::EnvironmentChange {
                value: "combat".into(),
            })
            .await
            .unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(a.recv().await.unwrap().args, vec![serde_json::json!("combat")]);
        assert_eq!(b.recv().await.unwrap().event, "environmentChange");
    }

    #[tokio::test]
    async fn dice_result_payload_is_copied_to_each_member() {
        let hub = RoomHub::new();
        let (a, mut a_rx) = connect(&hub).await;
        let (b, mut b_rx) = connect(&hub).await;
        hub.join(a, Channel::portrait(2)).await.unwrap();
        hub.join(b, Channel::portrait(2)).await.unwrap();

        let event = RealtimeEvent::DiceResult {
            subject_id: 2,
            results: vec![DiceResponse::new(5)],
            dices: DiceSpec::new(1, 6).into(),
        };
        hub.emit(Channel::portrait(2), event).await.unwrap();
        let first = a_rx.recv().await.unwrap();
        let second = b_rx.recv().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.args[0], serde_json::json!(2));
    }

    #[tokio::test]
    async fn leave_and_unregister() {
        let hub = RoomHub::new();
        let (id, _rx) = connect(&hub).await;
        hub.join(id, Channel::Admin).await.unwrap();
        assert_eq!(hub.room_size(Channel::Admin).await, 1);
        assert_eq!(hub.rooms_of(id).await, vec![Channel::Admin]);

        hub.leave(id, Channel::Admin).await.unwrap();
        assert_eq!(hub.room_size(Channel::Admin).await, 0);

        hub.unregister(id).await;
        assert_eq!(hub.connection_count().await, 0);
        assert_eq!(
            hub.join(id, Channel::Admin).await,
            Err(BroadcastError::UnknownConnection(id))
        );
    }

    #[tokio::test]
    async fn full_queue_is_skipped_not_fatal() {
        let hub = RoomHub::new();
        let id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(1);
        hub.register(id, tx).await;
        hub.join(id, Channel::Admin).await.unwrap();

        assert_eq!(hub.emit(Channel::Admin, RealtimeEvent::DiceRoll).await, Ok(1));
        assert_eq!(hub.emit(Channel::Admin, RealtimeEvent::DiceRoll).await, Ok(0));
    }
}
