//! Session handler: bridges one bidirectional client stream to the room
//! engine.
//!
//! The spec frames this as a recv task, a send task, and a supervisor.
//! This implementation collapses the three roles into one structured
//! `tokio::select!` loop over the two event sources (inbound client
//! commands, and the current room entry's event queue) — the multiplexing
//! approach the design notes themselves recommend over per-role channels,
//! and it sidesteps handing the current `RoomEntry` back and forth between
//! tasks every time a join/leave changes it.

use std::future::pending;
use std::sync::Arc;

use relaycore_protocol::{ActorId, ClientMessage, CommandKind, ServerMessage};
use relaycore_room::{RoomEntry, RoomEvent, RoomRegistry};
use relaycore_transport::Connection;

use crate::SessionError;

/// One client's bridge between its stream and the room it's currently in,
/// if any. Owns exactly one [`ActorId`] for its whole lifetime.
pub struct Session<C> {
    actor_id: ActorId,
    registry: Arc<RoomRegistry>,
    connection: C,
}

impl<C, E> Session<C>
where
    C: Connection<ClientMessage, ServerMessage, Error = E>,
    E: std::error::Error + Send + Sync,
{
    /// Starts a session over an already-accepted connection, minting a
    /// fresh [`ActorId`] for it.
    pub fn new(registry: Arc<RoomRegistry>, connection: C) -> Self {
        Self { actor_id: ActorId(rand::random()), registry, connection }
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// Drives the session until the stream is cancelled (the
    /// authoritative shutdown trigger) or a transport error occurs. On
    /// return, whatever room the session is currently in is left.
    pub async fn run(self) -> Result<(), SessionError> {
        let actor_id = self.actor_id;
        tracing::info!(%actor_id, "session started");

        let mut current: Option<RoomEntry> = None;
        let result = self.drive(&mut current).await;

        if let Some(entry) = current.take() {
            if let Some(room) = self.registry.get(entry.room_id()) {
                let _ = room.leave(&entry).await;
            }
        }

        tracing::info!(%actor_id, ?result, "session ended");
        result
    }

    async fn drive(&self, current: &mut Option<RoomEntry>) -> Result<(), SessionError> {
        loop {
            tokio::select! {
                incoming = self.connection.recv() => {
                    match incoming.map_err(|e| SessionError::Transport(e.to_string()))? {
                        None => return Ok(()),
                        Some(cmd) => self.handle_client_message(cmd, current).await?,
                    }
                }
                event = Self::next_room_event(current) => {
                    match event {
                        Some(event) => self.handle_room_event(event).await?,
                        None => {
                            tracing::warn!(actor_id = %self.actor_id, "room dropped this session, treating as involuntary leave");
                            *current = None;
                        }
                    }
                }
            }
        }
    }

    async fn next_room_event(current: &mut Option<RoomEntry>) -> Option<RoomEvent> {
        match current {
            Some(entry) => entry.recv().await,
            None => pending().await,
        }
    }

    async fn handle_client_message(
        &self,
        cmd: ClientMessage,
        current: &mut Option<RoomEntry>,
    ) -> Result<(), SessionError> {
        match cmd {
            ClientMessage::JoinRoom { room_id } => {
                if let Some(old) = current.take() {
                    self.leave_entry(&old).await;
                }

                let Some(room) = self.registry.get(room_id) else {
                    return self.fail(CommandKind::JoinRoom, "room does not exist").await;
                };

                match room.new_entry(self.actor_id).await {
                    Ok(entry) => {
                        self.send(ServerMessage::OnJoinRoomSuccess { actor_id: self.actor_id }).await?;
                        *current = Some(entry);
                    }
                    Err(_) => {
                        self.fail(CommandKind::JoinRoom, "room does not exist").await?;
                    }
                }
                Ok(())
            }
            ClientMessage::LeaveRoom => match current.take() {
                Some(entry) => {
                    self.leave_entry(&entry).await;
                    self.send(ServerMessage::OnLeaveRoomSuccess).await
                }
                None => self.fail(CommandKind::LeaveRoom, "not currently in a room").await,
            },
            ClientMessage::SendMessage { code, payload } => match current.as_ref() {
                Some(entry) => {
                    if let Some(room) = self.registry.get(entry.room_id()) {
                        let _ = room.send(entry, code, payload).await;
                    }
                    Ok(())
                }
                None => self.fail(CommandKind::SendMessage, "not currently in a room").await,
            },
        }
    }

    async fn handle_room_event(&self, event: RoomEvent) -> Result<(), SessionError> {
        match event {
            RoomEvent::Joined { members, new_actor } => {
                self.send(ServerMessage::OnJoinRoom { actor_id_list: members, new_actor_id: new_actor }).await
            }
            RoomEvent::Left { members, removed_actor } => {
                self.send(ServerMessage::OnLeaveRoom { actor_id_list: members, removed_actor_id: removed_actor }).await
            }
            RoomEvent::Message { sender, code, payload } => {
                if sender == self.actor_id {
                    // Self-message suppression: clients represent their
                    // own sends locally.
                    return Ok(());
                }
                self.send(ServerMessage::OnMessageReceived { sender_id: sender, code, payload }).await
            }
        }
    }

    async fn leave_entry(&self, entry: &RoomEntry) {
        if let Some(room) = self.registry.get(entry.room_id()) {
            let _ = room.leave(entry).await;
        }
    }

    async fn fail(&self, command: CommandKind, detail: &str) -> Result<(), SessionError> {
        self.send(ServerMessage::room_not_found(command, detail)).await
    }

    async fn send(&self, msg: ServerMessage) -> Result<(), SessionError> {
        self.connection.send(msg).await.map_err(|e| SessionError::Transport(e.to_string()))
    }
}
