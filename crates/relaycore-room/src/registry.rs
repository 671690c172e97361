//! Room registry: idempotent name → id mapping, id → handle lookup.

use std::collections::HashMap;
use std::sync::Mutex;

use relaycore_protocol::RoomId;

use crate::{spawn_room, RoomConfig, RoomHandle};

struct Inner {
    names: HashMap<String, RoomId>,
    rooms: HashMap<RoomId, RoomHandle>,
}

/// Name-to-room and id-to-room maps, guarded by a single mutex so that
/// "does this name already have a room" and "create one if not" happen
/// atomically — the whole point of the idempotent-creation guarantee.
pub struct RoomRegistry {
    inner: Mutex<Inner>,
    room_config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(room_config: RoomConfig) -> Self {
        Self {
            inner: Mutex::new(Inner { names: HashMap::new(), rooms: HashMap::new() }),
            room_config,
        }
    }

    /// Idempotent creation: an existing non-empty name returns its room id
    /// with `already_exists = true`. An empty name always creates a fresh
    /// room under a synthetic, never-collidable name, so distinct no-name
    /// rooms are never merged into one another.
    pub fn create_room(&self, name: &str) -> (RoomId, bool) {
        let mut inner = self.inner.lock().unwrap();

        if !name.is_empty() {
            if let Some(&id) = inner.names.get(name) {
                return (id, true);
            }
        }

        let id = Self::fresh_room_id(&inner.rooms);
        let handle = spawn_room(id, self.room_config);
        let key = if name.is_empty() { Self::synthetic_name(id) } else { name.to_string() };
        inner.names.insert(key, id);
        inner.rooms.insert(id, handle);

        tracing::info!(room_id = %id, room_name = %name, "room created");
        (id, false)
    }

    /// Looks up a room by id.
    pub fn get(&self, id: RoomId) -> Option<RoomHandle> {
        self.inner.lock().unwrap().rooms.get(&id).cloned()
    }

    /// Looks up a room id by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<RoomId> {
        self.inner.lock().unwrap().names.get(name).copied()
    }

    /// Removes a room from the registry. Does not itself stop the room's
    /// task — callers that want that should `RoomHandle::stop` the handle
    /// returned here (or obtained via `get` beforehand) before or after
    /// removing it from the registry.
    pub fn remove(&self, id: RoomId) -> Option<RoomHandle> {
        let mut inner = self.inner.lock().unwrap();
        let handle = inner.rooms.remove(&id);
        inner.names.retain(|_, v| *v != id);
        handle
    }

    pub fn room_count(&self) -> usize {
        self.inner.lock().unwrap().rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.inner.lock().unwrap().rooms.keys().copied().collect()
    }

    fn synthetic_name(id: RoomId) -> String {
        // A NUL prefix keeps this out of the space of names a client can
        // type, so it can never collide with a later explicit create.
        format!("\0anon:{}", id.0)
    }

    fn fresh_room_id(existing: &HashMap<RoomId, RoomHandle>) -> RoomId {
        Self::fresh_room_id_from(existing, rand::random::<u64>)
    }

    /// Retries `next_candidate` until it produces a non-zero id not already
    /// present in `existing`. Split out from [`fresh_room_id`](Self::fresh_room_id)
    /// so the collision-retry path is exercisable with a deterministic
    /// generator in tests, independent of `fresh_room_id`'s real `rand`
    /// source.
    fn fresh_room_id_from(
        existing: &HashMap<RoomId, RoomHandle>,
        mut next_candidate: impl FnMut() -> u64,
    ) -> RoomId {
        loop {
            let candidate = next_candidate();
            if candidate == 0 {
                continue;
            }
            let id = RoomId(candidate);
            if !existing.contains_key(&id) {
                return id;
            }
        }
    }
}
