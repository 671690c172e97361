//! Room broadcast engine: a single-owner actor that serializes joins,
//! leaves, and sends, and fans member events out to every current member.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use relaycore_protocol::{ActorId, RoomId};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError, RoomState};

/// An event delivered to one member's private inbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Another actor joined. `members` is the full post-join member list.
    Joined { members: Vec<ActorId>, new_actor: ActorId },
    /// Another actor left (or was dropped). `members` is the full
    /// post-leave member list.
    Left { members: Vec<ActorId>, removed_actor: ActorId },
    /// A broadcast message, delivered to every member including the
    /// sender (self-message suppression, if wanted, is a session-layer
    /// concern — see `relaycore-session`).
    Message { sender: ActorId, code: u32, payload: Vec<u8> },
}

/// A handle binding one actor to its membership in one room.
///
/// This is the single source of truth a caller should hold for "am I in a
/// room, and which one" — never a bare boolean or room-id flag. Dropping
/// the entry does *not* remove the member; only an explicit `leave` (or
/// the room stopping) does, since the entry itself does not own a
/// connection back to the room's mailbox.
pub struct RoomEntry {
    actor_id: ActorId,
    room_id: RoomId,
    token: u64,
    events: mpsc::Receiver<RoomEvent>,
}

impl RoomEntry {
    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Receives the next event destined for this member.
    ///
    /// Returns `None` once the room has dropped this member — an explicit
    /// leave, a room `stop()`, or an internal failure of the room task.
    /// Callers must treat `None` as an involuntary leave.
    pub async fn recv(&mut self) -> Option<RoomEvent> {
        self.events.recv().await
    }
}

/// A snapshot of a room's lifecycle and membership size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: RoomState,
    pub member_count: usize,
}

enum RoomCommand {
    NewEntry {
        actor_id: ActorId,
        reply: oneshot::Sender<Result<(u64, mpsc::Receiver<RoomEvent>), RoomError>>,
    },
    Leave {
        actor_id: ActorId,
        token: u64,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Send {
        actor_id: ActorId,
        token: u64,
        code: u32,
        payload: Vec<u8>,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running room actor. Cheap to clone; every clone shares the
/// same underlying mailbox.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    commands: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Admits a new member, returning a [`RoomEntry`] bound to it.
    ///
    /// Every other current member observes a [`RoomEvent::Joined`]
    /// carrying the full post-join member list.
    pub async fn new_entry(&self, actor_id: ActorId) -> Result<RoomEntry, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(RoomCommand::NewEntry { actor_id, reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        let (token, events) = reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))??;
        Ok(RoomEntry { actor_id, room_id: self.room_id, token, events })
    }

    /// Removes the member bound to `entry`. Idempotent: leaving an
    /// already-left (or superseded, e.g. by a later `new_entry` for the
    /// same actor) entry is a no-op.
    pub async fn leave(&self, entry: &RoomEntry) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(RoomCommand::Leave { actor_id: entry.actor_id, token: entry.token, reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx.await.map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Broadcasts `(code, payload)` to every current member, including the
    /// sender, in the order the room processes sends.
    pub async fn send(&self, entry: &RoomEntry, code: u32, payload: Vec<u8>) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(RoomCommand::Send { actor_id: entry.actor_id, token: entry.token, code, payload, reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx.await.map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Returns a snapshot of the room's lifecycle state and member count.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx.await.map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Drains pending operations, closes every member's queue, and stops
    /// the room task. Further operations on this handle return
    /// [`RoomError::Unavailable`].
    pub async fn stop(&self) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(RoomCommand::Stop { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        let _ = reply_rx.await;
        Ok(())
    }
}

struct Member {
    token: u64,
    sender: mpsc::Sender<RoomEvent>,
}

struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    state: RoomState,
    members: HashMap<ActorId, Member>,
    next_token: AtomicU64,
    commands: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room started");

        while let Some(cmd) = self.commands.recv().await {
            match cmd {
                RoomCommand::NewEntry { actor_id, reply } => {
                    let result = self.handle_new_entry(actor_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { actor_id, token, reply } => {
                    self.handle_leave(actor_id, token);
                    let _ = reply.send(Ok(()));
                }
                RoomCommand::Send { actor_id, token, code, payload, reply } => {
                    self.handle_send(actor_id, token, code, payload);
                    let _ = reply.send(Ok(()));
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Stop { reply } => {
                    self.handle_stop();
                    let _ = reply.send(());
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room stopped");
    }

    fn handle_new_entry(
        &mut self,
        actor_id: ActorId,
    ) -> Result<(u64, mpsc::Receiver<RoomEvent>), RoomError> {
        let (tx, rx) = mpsc::channel(self.config.outbound_queue_capacity);
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.members.insert(actor_id, Member { token, sender: tx });

        tracing::info!(room_id = %self.room_id, %actor_id, members = self.members.len(), "actor joined");

        let member_list = self.member_list();
        self.broadcast_except(actor_id, RoomEvent::Joined { members: member_list, new_actor: actor_id });

        Ok((token, rx))
    }

    fn handle_leave(&mut self, actor_id: ActorId, token: u64) {
        let still_current = matches!(self.members.get(&actor_id), Some(m) if m.token == token);
        if !still_current {
            // Already left, or superseded by a newer entry for the same
            // actor — leave is idempotent.
            return;
        }
        self.members.remove(&actor_id);

        tracing::info!(room_id = %self.room_id, %actor_id, members = self.members.len(), "actor left");

        let member_list = self.member_list();
        self.broadcast_all(RoomEvent::Left { members: member_list, removed_actor: actor_id });
    }

    fn handle_send(&mut self, actor_id: ActorId, token: u64, code: u32, payload: Vec<u8>) {
        let still_current = matches!(self.members.get(&actor_id), Some(m) if m.token == token);
        if !still_current {
            tracing::warn!(room_id = %self.room_id, %actor_id, "send from stale or departed entry, ignoring");
            return;
        }
        self.broadcast_all(RoomEvent::Message { sender: actor_id, code, payload });
    }

    fn handle_stop(&mut self) {
        self.state = RoomState::Stopping;
        // Dropping every member's sender closes their queue, which is the
        // queue-closed signal §4.1 requires on stop.
        self.members.clear();
        self.state = RoomState::Stopped;
    }

    fn member_list(&self) -> Vec<ActorId> {
        self.members.keys().copied().collect()
    }

    fn broadcast_all(&self, event: RoomEvent) {
        for (actor_id, member) in &self.members {
            self.deliver(*actor_id, member, event.clone());
        }
    }

    fn broadcast_except(&self, excluded: ActorId, event: RoomEvent) {
        for (actor_id, member) in &self.members {
            if *actor_id == excluded {
                continue;
            }
            self.deliver(*actor_id, member, event.clone());
        }
    }

    fn deliver(&self, actor_id: ActorId, member: &Member, event: RoomEvent) {
        if member.sender.try_send(event).is_err() {
            tracing::warn!(room_id = %self.room_id, %actor_id, "member outbound queue full, dropping delivery");
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo { room_id: self.room_id, state: self.state, member_count: self.members.len() }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub fn spawn_room(room_id: RoomId, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_queue_capacity);
    let actor = RoomActor {
        room_id,
        config,
        state: RoomState::Running,
        members: HashMap::new(),
        next_token: AtomicU64::new(0),
        commands: rx,
    };
    tokio::spawn(actor.run());
    RoomHandle { room_id, commands: tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(n: u128) -> ActorId {
        ActorId(n)
    }

    #[tokio::test]
    async fn join_broadcasts_to_existing_members_only() {
        let room = spawn_room(RoomId(1), RoomConfig::default());
        let mut e1 = room.new_entry(actor(1)).await.unwrap();
        let _e2 = room.new_entry(actor(2)).await.unwrap();

        let event = e1.recv().await.unwrap();
        assert_eq!(
            event,
            RoomEvent::Joined { members: vec![actor(1), actor(2)], new_actor: actor(2) }
        );
    }

    #[tokio::test]
    async fn send_reaches_every_member_including_sender() {
        let room = spawn_room(RoomId(1), RoomConfig::default());
        let mut e1 = room.new_entry(actor(1)).await.unwrap();
        let mut e2 = room.new_entry(actor(2)).await.unwrap();
        e1.recv().await.unwrap(); // join event for actor(2)

        room.send(&e1, 7, b"hi".to_vec()).await.unwrap();

        let on1 = e1.recv().await.unwrap();
        let on2 = e2.recv().await.unwrap();
        let expected = RoomEvent::Message { sender: actor(1), code: 7, payload: b"hi".to_vec() };
        assert_eq!(on1, expected);
        assert_eq!(on2, expected);
    }

    #[tokio::test]
    async fn leave_removes_member_and_notifies_remaining() {
        let room = spawn_room(RoomId(1), RoomConfig::default());
        let e1 = room.new_entry(actor(1)).await.unwrap();
        let mut e2 = room.new_entry(actor(2)).await.unwrap();

        room.leave(&e1).await.unwrap();
        let event = e2.recv().await.unwrap();
        assert_eq!(event, RoomEvent::Left { members: vec![actor(2)], removed_actor: actor(1) });

        let info = room.info().await.unwrap();
        assert_eq!(info.member_count, 1);
    }

    #[tokio::test]
    async fn leave_is_idempotent() {
        let room = spawn_room(RoomId(1), RoomConfig::default());
        let e1 = room.new_entry(actor(1)).await.unwrap();
        room.leave(&e1).await.unwrap();
        room.leave(&e1).await.unwrap();
    }

    #[tokio::test]
    async fn joiner_does_not_receive_messages_sent_before_it_joined() {
        let room = spawn_room(RoomId(1), RoomConfig::default());
        let e1 = room.new_entry(actor(1)).await.unwrap();
        room.send(&e1, 1, b"before".to_vec()).await.unwrap();

        let mut e2 = room.new_entry(actor(2)).await.unwrap();
        room.send(&e1, 2, b"after".to_vec()).await.unwrap();

        let event = e2.recv().await.unwrap();
        assert_eq!(event, RoomEvent::Message { sender: actor(1), code: 2, payload: b"after".to_vec() });
    }

    #[tokio::test]
    async fn stop_closes_every_members_queue() {
        let room = spawn_room(RoomId(1), RoomConfig::default());
        let mut e1 = room.new_entry(actor(1)).await.unwrap();
        room.stop().await.unwrap();
        assert_eq!(e1.recv().await, None);
    }

    #[tokio::test]
    async fn full_outbound_queue_drops_only_that_members_delivery() {
        let config = RoomConfig { outbound_queue_capacity: 1, ..RoomConfig::default() };
        let room = spawn_room(RoomId(1), config);
        let e1 = room.new_entry(actor(1)).await.unwrap();
        let mut e2 = room.new_entry(actor(2)).await.unwrap(); // fills e1's queue with the Joined event

        // e1's outbound queue (capacity 1) already holds the Joined event
        // for actor(2); this send is dropped for e1 but still delivered to
        // e2, whose queue is empty.
        room.send(&e1, 1, b"x".to_vec()).await.unwrap();

        let event = e2.recv().await.unwrap();
        assert_eq!(event, RoomEvent::Message { sender: actor(1), code: 1, payload: b"x".to_vec() });
    }
}
