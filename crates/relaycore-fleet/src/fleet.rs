//! Fleet allocator and allocation event bus.
//!
//! The fleet tracks every registered game node, picks a node for each new
//! room, and fans out an event each time it does. State lives behind one
//! `RwLock`: lookups take the read side, registration/allocation/status
//! updates take the write side. Allocation publishes its event *while
//! still holding the write lock* (see `allocate_room`) — subscriber sinks
//! are bounded channels reached only through `try_send`, so a slow or
//! stalled subscriber can never block an allocation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use relaycore_protocol::{GameServerAddr, GameServerId, RoomId, RoomListEntry, RoomStatus};
use tokio::sync::mpsc;

use crate::{FleetConfig, FleetError};

/// Published each time a room is placed on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAllocatedEvent {
    pub game_server_addr: GameServerAddr,
    pub room_status: RoomStatus,
}

/// Opaque handle for an allocation-event subscription, returned by
/// [`Fleet::subscribe`] and required by [`Fleet::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct GameNode {
    id: GameServerId,
    addr: GameServerAddr,
    capacity: u32,
    rooms: HashMap<RoomId, RoomStatus>,
    n_actors: u32,
}

impl GameNode {
    fn has_capacity(&self) -> bool {
        self.rooms.len() < self.capacity as usize
    }

    fn remaining_capacity(&self) -> i64 {
        self.capacity as i64 - self.rooms.len() as i64
    }
}

struct Inner {
    nodes: Vec<GameNode>,
    room_owner: HashMap<RoomId, GameServerId>,
    room_status: HashMap<RoomId, RoomStatus>,
    subscribers: HashMap<SubscriptionId, mpsc::Sender<RoomAllocatedEvent>>,
}

/// The master's view of every registered game node and the rooms placed
/// on them. See §4.4: node registration, capacity-ordered placement,
/// status-driven re-sort, lookup, and the allocation event bus.
pub struct Fleet {
    inner: RwLock<Inner>,
    config: FleetConfig,
    next_subscription: AtomicU64,
}

impl Fleet {
    pub fn new(config: FleetConfig) -> Self {
        Self {
            inner: RwLock::new(Inner {
                nodes: Vec::new(),
                room_owner: HashMap::new(),
                room_status: HashMap::new(),
                subscribers: HashMap::new(),
            }),
            config,
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Registers a game node, assigning it a fresh [`GameServerId`].
    pub fn register_game_server(&self, addr: GameServerAddr, capacity: u32) -> GameServerId {
        let mut inner = self.inner.write().unwrap();
        let id = GameServerId(rand::random());
        inner.nodes.push(GameNode { id, addr: addr.clone(), capacity, rooms: HashMap::new(), n_actors: 0 });
        tracing::info!(game_server_id = %id, %addr, capacity, "game server registered");
        id
    }

    /// True if `id` currently names a registered game node. Used to
    /// authorize the `Update` RPC.
    pub fn is_registered_game_server(&self, id: GameServerId) -> bool {
        self.inner.read().unwrap().nodes.iter().any(|n| n.id == id)
    }

    /// Places a new room on the first node in list order with spare
    /// capacity, records it in both fleet indices, and publishes a
    /// [`RoomAllocatedEvent`] to every current subscriber before releasing
    /// the write lock.
    pub fn allocate_room(&self, room_id: RoomId, room_name: impl Into<String>) -> Result<GameServerAddr, FleetError> {
        let status = RoomStatus { room_id, room_name: room_name.into(), actor_count: 0 };
        status.validate()?;

        let mut inner = self.inner.write().unwrap();

        if inner.nodes.is_empty() {
            return Err(FleetError::NotEnoughGameServers);
        }
        if inner.room_owner.contains_key(&room_id) {
            return Err(FleetError::RoomAlreadyAllocated(room_id));
        }

        let Some(idx) = inner.nodes.iter().position(|n| n.has_capacity()) else {
            return Err(FleetError::NotEnoughGameServers);
        };

        let node = &mut inner.nodes[idx];
        node.rooms.insert(room_id, status.clone());
        let addr = node.addr.clone();
        let node_id = node.id;

        inner.room_owner.insert(room_id, node_id);
        inner.room_status.insert(room_id, status.clone());

        tracing::info!(%room_id, game_server_id = %node_id, %addr, "room allocated");

        let event = RoomAllocatedEvent { game_server_addr: addr.clone(), room_status: status };
        for (sub_id, sender) in &inner.subscribers {
            if sender.try_send(event.clone()).is_err() {
                tracing::warn!(?sub_id, %room_id, "allocation subscriber lagging or gone, dropping event for it");
            }
        }

        Ok(addr)
    }

    /// Applies a status update from a game node: updates both fleet
    /// indices, recomputes the owning node's aggregate actor count, then
    /// stably re-sorts the node list by non-increasing remaining room
    /// capacity so the next `allocate_room` scan stays biased toward
    /// emptier nodes.
    pub fn update_room_status(&self, status: RoomStatus) -> Result<(), FleetError> {
        status.validate()?;

        let mut inner = self.inner.write().unwrap();
        let room_id = status.room_id;

        if !inner.room_status.contains_key(&room_id) {
            return Err(FleetError::RoomStatusNotFound(room_id));
        }
        inner.room_status.insert(room_id, status.clone());

        let node_id = *inner
            .room_owner
            .get(&room_id)
            .expect("room_status and room_owner indices are kept in lockstep");
        let node = inner
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .expect("room_owner never names a node absent from the node list");
        node.rooms.insert(room_id, status);
        node.n_actors = node.rooms.values().map(|s| s.actor_count).sum();

        // `sort_by` is a stable sort: ties keep their prior relative order,
        // which is what lets "first node with capacity" double as "most
        // remaining capacity" across repeated rebalances.
        inner.nodes.sort_by(|a, b| b.remaining_capacity().cmp(&a.remaining_capacity()));

        Ok(())
    }

    /// Returns the address of the node currently hosting `room_id`, or
    /// `None` if no node owns it. Presence is checked before any
    /// dereference of the looked-up node, so a miss never surfaces a
    /// stale or default address.
    pub fn lookup_game_server_addr(&self, room_id: RoomId) -> Option<GameServerAddr> {
        let inner = self.inner.read().unwrap();
        let node_id = inner.room_owner.get(&room_id)?;
        inner.nodes.iter().find(|n| n.id == *node_id).map(|n| n.addr.clone())
    }

    /// Snapshot of every room currently tracked, for the lobby's room list.
    pub fn room_list(&self) -> Vec<RoomListEntry> {
        self.inner
            .read()
            .unwrap()
            .room_status
            .values()
            .map(|s| RoomListEntry { room_id: s.room_id, room_name: s.room_name.clone() })
            .collect()
    }

    /// Registers a new allocation-event subscriber and returns its handle
    /// plus the receiving half of its bounded channel.
    pub fn subscribe(&self) -> (SubscriptionId, mpsc::Receiver<RoomAllocatedEvent>) {
        let (tx, rx) = mpsc::channel(self.config.subscriber_queue_capacity);
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.inner.write().unwrap().subscribers.insert(id, tx);
        (id, rx)
    }

    /// Removes a subscriber. The fleet never closes a subscriber's sink on
    /// its own; this is the only way one is removed.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.write().unwrap().subscribers.remove(&id);
    }

    /// Number of currently registered game nodes. Test/diagnostic helper.
    pub fn node_count(&self) -> usize {
        self.inner.read().unwrap().nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(host: &str, port: u16) -> GameServerAddr {
        GameServerAddr { host: host.to_string(), port }
    }

    #[test]
    fn allocation_fills_nodes_in_list_order_while_capacity_remains() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 1);
        fleet.register_game_server(addr("a2", 2), 2);
        fleet.register_game_server(addr("a3", 3), 3);

        let a1 = fleet.allocate_room(RoomId(1), "r1").unwrap();
        let a2 = fleet.allocate_room(RoomId(2), "r2").unwrap();
        let a3 = fleet.allocate_room(RoomId(3), "r3").unwrap();

        assert_eq!(a1, addr("a1", 1));
        assert_eq!(a2, addr("a2", 2));
        assert_eq!(a3, addr("a2", 2));

        assert_eq!(fleet.lookup_game_server_addr(RoomId(1)), Some(addr("a1", 1)));
        assert_eq!(fleet.lookup_game_server_addr(RoomId(2)), Some(addr("a2", 2)));
        assert_eq!(fleet.lookup_game_server_addr(RoomId(3)), Some(addr("a2", 2)));
    }

    #[test]
    fn status_update_rebalances_the_node_list_toward_emptier_nodes() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 1);
        fleet.register_game_server(addr("a2", 2), 2);
        fleet.register_game_server(addr("a3", 3), 3);

        fleet.allocate_room(RoomId(1), "r1").unwrap();
        fleet.allocate_room(RoomId(2), "r2").unwrap();

        fleet
            .update_room_status(RoomStatus { room_id: RoomId(2), room_name: "r2".into(), actor_count: 2 })
            .unwrap();

        let a3 = fleet.allocate_room(RoomId(3), "r3").unwrap();
        assert_eq!(a3, addr("a3", 3));
    }

    #[test]
    fn allocate_room_on_empty_fleet_fails() {
        let fleet = Fleet::new(FleetConfig::default());
        let err = fleet.allocate_room(RoomId(1), "r1").unwrap_err();
        assert!(matches!(err, FleetError::NotEnoughGameServers));
    }

    #[test]
    fn allocate_room_rejects_an_empty_room_name() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 5);
        let err = fleet.allocate_room(RoomId(1), "").unwrap_err();
        assert!(matches!(err, FleetError::Protocol(_)));
        // A rejected request must not have consumed the room id.
        assert_eq!(fleet.lookup_game_server_addr(RoomId(1)), None);
    }

    #[test]
    fn update_room_status_rejects_an_empty_room_name() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 5);
        fleet.allocate_room(RoomId(1), "r1").unwrap();

        let err = fleet
            .update_room_status(RoomStatus { room_id: RoomId(1), room_name: String::new(), actor_count: 1 })
            .unwrap_err();
        assert!(matches!(err, FleetError::Protocol(_)));
    }

    #[test]
    fn allocate_room_fails_when_every_node_is_full() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 1);
        fleet.allocate_room(RoomId(1), "r1").unwrap();

        let err = fleet.allocate_room(RoomId(2), "r2").unwrap_err();
        assert!(matches!(err, FleetError::NotEnoughGameServers));
    }

    #[test]
    fn allocating_the_same_room_id_twice_fails() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 5);
        fleet.allocate_room(RoomId(1), "r1").unwrap();

        let err = fleet.allocate_room(RoomId(1), "r1-again").unwrap_err();
        assert!(matches!(err, FleetError::RoomAlreadyAllocated(id) if id == RoomId(1)));
    }

    #[test]
    fn lookup_of_unallocated_room_is_none_not_a_default_address() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 5);
        assert_eq!(fleet.lookup_game_server_addr(RoomId(999)), None);
    }

    #[test]
    fn update_room_status_on_untracked_room_fails() {
        let fleet = Fleet::new(FleetConfig::default());
        let err = fleet
            .update_room_status(RoomStatus { room_id: RoomId(1), room_name: "r1".into(), actor_count: 1 })
            .unwrap_err();
        assert!(matches!(err, FleetError::RoomStatusNotFound(id) if id == RoomId(1)));
    }

    #[test]
    fn registering_two_nodes_at_the_same_address_is_permitted_and_independent() {
        let fleet = Fleet::new(FleetConfig::default());
        let id1 = fleet.register_game_server(addr("a1", 1), 1);
        let id2 = fleet.register_game_server(addr("a1", 1), 1);
        assert_ne!(id1, id2);

        fleet.allocate_room(RoomId(1), "r1").unwrap();
        // The second node at the same address still has spare capacity.
        fleet.allocate_room(RoomId(2), "r2").unwrap();
        assert_eq!(fleet.node_count(), 2);
    }

    #[tokio::test]
    async fn subscribers_receive_allocation_events_and_can_unsubscribe() {
        let fleet = Fleet::new(FleetConfig::default());
        fleet.register_game_server(addr("a1", 1), 5);

        let (sub_id, mut events) = fleet.subscribe();
        fleet.allocate_room(RoomId(1), "r1").unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.room_status.room_id, RoomId(1));
        assert_eq!(event.game_server_addr, addr("a1", 1));

        fleet.unsubscribe(sub_id);
        fleet.allocate_room(RoomId(2), "r2").unwrap();
        assert!(events.recv().await.is_none());
    }

    #[test]
    fn a_full_subscriber_queue_does_not_block_or_fail_an_allocation() {
        let config = FleetConfig { subscriber_queue_capacity: 1 };
        let fleet = Fleet::new(config);
        fleet.register_game_server(addr("a1", 1), 5);

        let (_sub_id, _events) = fleet.subscribe();
        // Fills the subscriber's queue (capacity 1).
        fleet.allocate_room(RoomId(1), "r1").unwrap();
        // This allocation's event is dropped for the lagging subscriber,
        // but the allocation itself still succeeds.
        fleet.allocate_room(RoomId(2), "r2").unwrap();

        assert_eq!(fleet.lookup_game_server_addr(RoomId(2)), Some(addr("a1", 1)));
    }
}
