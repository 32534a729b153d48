//! Sled-backed persistence for world topology and session state.
//!
//! Everything lives in one tree so that a player action persists as a single
//! atomic batch. Keys are string prefixes over bincode-encoded records:
//!
//! ```text
//! rooms:<id>                      -> RoomRecord
//! doors:<source>:<NNNN>           -> DoorRecord     (authored order)
//! items:room:<room>:<NNNN>        -> ItemRecord     (authored order)
//! items:session:<slot>:<NNNN>     -> ItemRecord     (pickup order)
//! sessions:<slot>                 -> SessionRecord
//! ```
//!
//! The `<NNNN>` indexes are zero-padded so prefix scans come back in insert
//! order. An item is owned by exactly one key at a time: picking it up moves
//! its record from the room prefix to the session prefix in the same batch.
//!
//! The in-memory [`Session`] is authoritative during play. [`record_outcome`]
//! mirrors each mutation after the fact; a failure there is reported to the
//! caller and never rolls the session back.
//!
//! Room item lists and door lock state are world-level records shared by
//! every slot in a store, matching the one-session-per-process model. Keep
//! distinct playthroughs in distinct store paths.
//!
//! [`record_outcome`]: GameStore::record_outcome

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use sled::IVec;
use thiserror::Error;

use crate::world::{
    normalize_id, ChoiceOutcome, Door, Inventory, Item, ItemKind, Room, Session, World,
};

pub const ROOM_RECORD_VERSION: u8 = 1;
pub const DOOR_RECORD_VERSION: u8 = 1;
pub const ITEM_RECORD_VERSION: u8 = 1;
pub const SESSION_RECORD_VERSION: u8 = 1;

const TREE_GAME: &str = "adventure";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("schema mismatch for {entity}: expected v{expected}, found v{found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Stored records contradict each other; the store needs rebuilding.
    #[error("corrupt store: {0}")]
    Corrupt(String),
}

/// A room's fixed identity. Doors and items live in their own records so
/// they can change owner or state without rewriting the room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub starting: bool,
    pub schema_version: u8,
}

impl RoomRecord {
    fn from_room(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            title: room.title.clone(),
            description: room.description.clone(),
            starting: room.starting,
            schema_version: ROOM_RECORD_VERSION,
        }
    }
}

/// One directed edge, keyed under its source room by authored index so
/// restore rebuilds the menu in the same order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoorRecord {
    pub source: String,
    pub index: usize,
    pub destination: String,
    pub requires: Vec<String>,
    pub unlocked: bool,
    pub schema_version: u8,
}

impl DoorRecord {
    fn from_door(source: &str, index: usize, door: &Door) -> Self {
        Self {
            source: source.to_string(),
            index,
            destination: door.destination.clone(),
            requires: door.requires.clone(),
            unlocked: door.unlocked,
            schema_version: DOOR_RECORD_VERSION,
        }
    }

    fn into_door(self) -> Door {
        Door {
            destination: self.destination,
            requires: self.requires,
            unlocked: self.unlocked,
        }
    }
}

/// A pickupable item. The key prefix says whether a room or a session
/// currently owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub id: String,
    pub kind: ItemKind,
    pub find_phrase: Option<String>,
    pub schema_version: u8,
}

impl ItemRecord {
    fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind,
            find_phrase: item.find_phrase.clone(),
            schema_version: ITEM_RECORD_VERSION,
        }
    }

    fn into_item(self) -> Item {
        Item {
            id: self.id,
            kind: self.kind,
            find_phrase: self.find_phrase,
        }
    }
}

/// The player's mutable state for one slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub slot: String,
    pub current_room: String,
    /// Next key index for session-owned item records. Only ever grows, so
    /// inventory order survives interleaved pickups and key consumption.
    pub item_seq: u64,
    pub saved_at: DateTime<Utc>,
    pub schema_version: u8,
}

/// Builder so tests and tools can open throwaway stores with custom options.
pub struct GameStoreBuilder {
    path: PathBuf,
    temporary: bool,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: false,
        }
    }

    /// Open in sled's temporary mode; the files are removed when the store
    /// is dropped.
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn open(self) -> Result<GameStore, StoreError> {
        GameStore::open_with_options(&self.path, self.temporary)
    }
}

/// Handle to the game database. All methods take `&self`.
pub struct GameStore {
    _db: sled::Db,
    game: sled::Tree,
}

impl GameStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_options(path.as_ref(), false)
    }

    fn open_with_options(path: &Path, temporary: bool) -> Result<Self, StoreError> {
        if !temporary {
            std::fs::create_dir_all(path)?;
        }
        let db = sled::Config::new()
            .path(path)
            .temporary(temporary)
            .open()?;
        let game = db.open_tree(TREE_GAME)?;
        debug!("game store opened at {}", path.display());
        Ok(Self { _db: db, game })
    }

    // ========================================================================
    // Key builders
    // ========================================================================

    /// Escape a room id or slot for embedding between `:` separators. Ids
    /// may legally contain `:`, so the separator and the escape character
    /// are both escaped; every prefix scan then stays within one segment.
    fn key_segment(raw: &str) -> String {
        raw.replace('\\', "\\\\").replace(':', "\\:")
    }

    fn room_key(id: &str) -> Vec<u8> {
        format!("rooms:{}", Self::key_segment(id)).into_bytes()
    }

    fn door_key(source: &str, index: usize) -> Vec<u8> {
        format!("doors:{}:{:020}", Self::key_segment(source), index).into_bytes()
    }

    fn door_prefix(source: &str) -> Vec<u8> {
        format!("doors:{}:", Self::key_segment(source)).into_bytes()
    }

    fn room_item_key(room: &str, index: usize) -> Vec<u8> {
        format!("items:room:{}:{:020}", Self::key_segment(room), index).into_bytes()
    }

    fn room_item_prefix(room: &str) -> Vec<u8> {
        format!("items:room:{}:", Self::key_segment(room)).into_bytes()
    }

    fn session_key(slot: &str) -> Vec<u8> {
        format!("sessions:{}", Self::key_segment(slot)).into_bytes()
    }

    fn session_item_key(slot: &str, seq: u64) -> Vec<u8> {
        format!("items:session:{}:{:020}", Self::key_segment(slot), seq).into_bytes()
    }

    fn session_item_prefix(slot: &str) -> Vec<u8> {
        format!("items:session:{}:", Self::key_segment(slot)).into_bytes()
    }

    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, StoreError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    // ========================================================================
    // World records
    // ========================================================================

    /// Bulk-insert the world's rooms, doors, and items unless room records
    /// already exist. Returns the number of rooms written, 0 when skipped,
    /// so repeated startups are idempotent.
    pub fn import_world_if_empty(&self, world: &World) -> Result<usize, StoreError> {
        if self.game.scan_prefix(b"rooms:").next().is_some() {
            debug!("world records already present; skipping import");
            return Ok(0);
        }
        let mut batch = sled::Batch::default();
        let mut imported = 0usize;
        for room in world.rooms() {
            batch.insert(
                Self::room_key(&room.id),
                Self::serialize(&RoomRecord::from_room(room))?,
            );
            for (index, door) in room.doors.iter().enumerate() {
                batch.insert(
                    Self::door_key(&room.id, index),
                    Self::serialize(&DoorRecord::from_door(&room.id, index, door))?,
                );
            }
            for (index, item) in room.items.iter().enumerate() {
                batch.insert(
                    Self::room_item_key(&room.id, index),
                    Self::serialize(&ItemRecord::from_item(item))?,
                );
            }
            imported += 1;
        }
        self.game.apply_batch(batch)?;
        self.game.flush()?;
        debug!("imported {} rooms", imported);
        Ok(imported)
    }

    /// Rebuild the world graph exactly as stored, including door lock state
    /// and whatever items remain in each room.
    pub fn restore_world(&self) -> Result<World, StoreError> {
        let mut rooms = Vec::new();
        for entry in self.game.scan_prefix(b"rooms:") {
            let (_, bytes) = entry?;
            let record: RoomRecord = Self::deserialize(bytes)?;
            if record.schema_version != ROOM_RECORD_VERSION {
                return Err(StoreError::SchemaMismatch {
                    entity: "room",
                    expected: ROOM_RECORD_VERSION,
                    found: record.schema_version,
                });
            }
            let mut room = Room::new(&record.id, &record.title, &record.description);
            room.starting = record.starting;
            for entry in self.game.scan_prefix(&Self::door_prefix(&record.id)) {
                let (_, bytes) = entry?;
                let door: DoorRecord = Self::deserialize(bytes)?;
                room.doors.push(door.into_door());
            }
            for entry in self.game.scan_prefix(&Self::room_item_prefix(&record.id)) {
                let (_, bytes) = entry?;
                let item: ItemRecord = Self::deserialize(bytes)?;
                room.items.push(item.into_item());
            }
            rooms.push(room);
        }
        if rooms.is_empty() {
            return Err(StoreError::NotFound(
                "no world records; import a world first".to_string(),
            ));
        }
        World::from_rooms(rooms).map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    /// Number of room records currently stored.
    pub fn room_count(&self) -> Result<usize, StoreError> {
        let mut count = 0;
        for entry in self.game.scan_prefix(b"rooms:") {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Delete a room record and every door and item the room owns. Items
    /// already transferred to a session inventory are untouched; the cascade
    /// never reaches upward into player state.
    pub fn delete_room(&self, id: &str) -> Result<(), StoreError> {
        let id = normalize_id(id);
        let mut batch = sled::Batch::default();
        batch.remove(Self::room_key(&id));
        for entry in self.game.scan_prefix(&Self::door_prefix(&id)) {
            let (key, _) = entry?;
            batch.remove(key);
        }
        for entry in self.game.scan_prefix(&Self::room_item_prefix(&id)) {
            let (key, _) = entry?;
            batch.remove(key);
        }
        self.game.apply_batch(batch)?;
        self.game.flush()?;
        debug!("deleted room '{}' and its owned records", id);
        Ok(())
    }

    /// Delete exactly one door record. No cascade in either direction.
    pub fn delete_door(&self, source: &str, index: usize) -> Result<(), StoreError> {
        let key = Self::door_key(&normalize_id(source), index);
        if self.game.remove(key)?.is_none() {
            return Err(StoreError::NotFound(format!("door: {}:{}", source, index)));
        }
        self.game.flush()?;
        Ok(())
    }

    /// Delete exactly one of a room's item records, first match by id. No
    /// cascade in either direction.
    pub fn delete_item(&self, room: &str, item_id: &str) -> Result<(), StoreError> {
        let room = normalize_id(room);
        let item_id = normalize_id(item_id);
        let Some(key) = self.find_room_item(&room, &item_id)? else {
            return Err(StoreError::NotFound(format!(
                "item: '{}' in room '{}'",
                item_id, room
            )));
        };
        self.game.remove(key)?;
        self.game.flush()?;
        Ok(())
    }

    // ========================================================================
    // Session records
    // ========================================================================

    pub fn has_session(&self, slot: &str) -> Result<bool, StoreError> {
        Ok(self
            .game
            .contains_key(Self::session_key(&normalize_slot(slot)))?)
    }

    /// Create a fresh session record positioned at the world's starting
    /// room. Overwrites any previous record under the same slot.
    pub fn create_session(&self, slot: &str, world: &World) -> Result<SessionRecord, StoreError> {
        let slot = normalize_slot(slot);
        let record = SessionRecord {
            slot: slot.clone(),
            current_room: world.starting_room().to_string(),
            item_seq: 0,
            saved_at: Utc::now(),
            schema_version: SESSION_RECORD_VERSION,
        };
        self.game
            .insert(Self::session_key(&slot), Self::serialize(&record)?)?;
        self.game.flush()?;
        debug!("created session slot '{}'", slot);
        Ok(record)
    }

    pub fn session(&self, slot: &str) -> Result<SessionRecord, StoreError> {
        let slot = normalize_slot(slot);
        let Some(bytes) = self.game.get(Self::session_key(&slot))? else {
            return Err(StoreError::NotFound(format!("session: {}", slot)));
        };
        let record: SessionRecord = Self::deserialize(bytes)?;
        if record.schema_version != SESSION_RECORD_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "session",
                expected: SESSION_RECORD_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Item records a session's inventory currently owns, in pickup order.
    pub fn session_items(&self, slot: &str) -> Result<Vec<ItemRecord>, StoreError> {
        let slot = normalize_slot(slot);
        let mut items = Vec::new();
        for entry in self.game.scan_prefix(&Self::session_item_prefix(&slot)) {
            let (_, bytes) = entry?;
            items.push(Self::deserialize(bytes)?);
        }
        Ok(items)
    }

    /// Rebuild the full session (world graph plus player state) exactly as
    /// last persisted.
    pub fn restore(&self, slot: &str) -> Result<Session, StoreError> {
        let record = self.session(slot)?;
        let world = self.restore_world()?;
        let inventory: Inventory = self
            .session_items(&record.slot)?
            .into_iter()
            .map(ItemRecord::into_item)
            .collect();
        debug!(
            "restoring slot '{}' in room '{}'",
            record.slot, record.current_room
        );
        Session::resume(world, &record.current_room, inventory)
            .map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    /// Mirror one state-changing outcome as a single atomic batch.
    ///
    /// Outcomes that changed nothing ([`ChoiceOutcome::mutated`] is false)
    /// are accepted and ignored, so callers can forward every outcome.
    pub fn record_outcome(&self, slot: &str, outcome: &ChoiceOutcome) -> Result<(), StoreError> {
        if !outcome.mutated() {
            return Ok(());
        }
        let slot = normalize_slot(slot);
        let mut session = self.session(&slot)?;
        let mut batch = sled::Batch::default();

        match outcome {
            ChoiceOutcome::Moved { to } => {
                session.current_room = to.clone();
            }
            ChoiceOutcome::UnlockedAndMoved {
                from,
                to,
                door_index,
                consumed,
            } => {
                let mut door = self.door(from, *door_index)?;
                door.unlocked = true;
                batch.insert(Self::door_key(from, *door_index), Self::serialize(&door)?);
                // Each consumed item retires one stored record; skip keys
                // already claimed so duplicates retire distinct records.
                let mut taken: Vec<Vec<u8>> = Vec::new();
                for item in consumed {
                    let Some(key) = self.find_session_item(&slot, &item.id, &taken)? else {
                        return Err(StoreError::Corrupt(format!(
                            "session '{}' holds no stored item '{}' to consume",
                            slot, item.id
                        )));
                    };
                    batch.remove(key.clone());
                    taken.push(key);
                }
                session.current_room = to.clone();
            }
            ChoiceOutcome::PickedUp { room, item } => {
                let Some(key) = self.find_room_item(room, &item.id)? else {
                    return Err(StoreError::Corrupt(format!(
                        "room '{}' holds no stored item '{}'",
                        room, item.id
                    )));
                };
                batch.remove(key);
                batch.insert(
                    Self::session_item_key(&slot, session.item_seq),
                    Self::serialize(&ItemRecord::from_item(item))?,
                );
                session.item_seq += 1;
            }
            ChoiceOutcome::DoorLocked { .. } | ChoiceOutcome::Nothing => {}
        }

        session.saved_at = Utc::now();
        batch.insert(Self::session_key(&slot), Self::serialize(&session)?);
        self.game.apply_batch(batch)?;
        self.game.flush()?;
        Ok(())
    }

    fn door(&self, source: &str, index: usize) -> Result<DoorRecord, StoreError> {
        let key = Self::door_key(source, index);
        let Some(bytes) = self.game.get(key)? else {
            return Err(StoreError::NotFound(format!("door: {}:{}", source, index)));
        };
        Self::deserialize(bytes)
    }

    fn find_room_item(&self, room: &str, item_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        for entry in self.game.scan_prefix(&Self::room_item_prefix(room)) {
            let (key, bytes) = entry?;
            let record: ItemRecord = Self::deserialize(bytes)?;
            if record.id == item_id {
                return Ok(Some(key.to_vec()));
            }
        }
        Ok(None)
    }

    fn find_session_item(
        &self,
        slot: &str,
        item_id: &str,
        skip: &[Vec<u8>],
    ) -> Result<Option<Vec<u8>>, StoreError> {
        for entry in self.game.scan_prefix(&Self::session_item_prefix(slot)) {
            let (key, bytes) = entry?;
            if skip.iter().any(|taken| taken.as_slice() == key.as_ref()) {
                continue;
            }
            let record: ItemRecord = Self::deserialize(bytes)?;
            if record.id == item_id {
                return Ok(Some(key.to_vec()));
            }
        }
        Ok(None)
    }
}

fn normalize_slot(slot: &str) -> String {
    slot.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Door, Item, Room};
    use tempfile::TempDir;

    fn test_world() -> World {
        World::from_rooms(vec![
            Room::new("room_a", "Room A", "First.")
                .with_door(Door::to("room_b").requiring("key"))
                .with_item(Item::key("key").with_find_phrase("Found a key."))
                .as_starting(),
            Room::new("room_b", "Room B", "Second.").with_door(Door::to("room_a")),
        ])
        .expect("test world")
    }

    fn create_test_store() -> (GameStore, TempDir) {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStoreBuilder::new(dir.path().join("db"))
            .open()
            .expect("open store");
        (store, dir)
    }

    #[test]
    fn import_is_idempotent() {
        let (store, _dir) = create_test_store();
        let world = test_world();

        assert_eq!(store.import_world_if_empty(&world).expect("first"), 2);
        assert_eq!(store.import_world_if_empty(&world).expect("second"), 0);
        assert_eq!(store.room_count().expect("count"), 2);
    }

    #[test]
    fn restore_world_round_trips_topology() {
        let (store, _dir) = create_test_store();
        store.import_world_if_empty(&test_world()).expect("import");

        let world = store.restore_world().expect("restore");
        assert_eq!(world.room_count(), 2);
        assert_eq!(world.starting_room(), "room_a");
        let room = world.room("room_a").expect("room_a");
        assert_eq!(room.doors[0].requires, vec!["key"]);
        assert_eq!(room.items[0].find_phrase.as_deref(), Some("Found a key."));
    }

    #[test]
    fn temporary_mode_needs_no_cleanup() {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStoreBuilder::new(dir.path().join("db"))
            .temporary()
            .open()
            .expect("open");
        store.import_world_if_empty(&test_world()).expect("import");
        assert_eq!(store.room_count().expect("count"), 2);
    }

    #[test]
    fn play_sequence_persists_and_restores() {
        let (store, _dir) = create_test_store();
        let world = test_world();
        store.import_world_if_empty(&world).expect("import");
        store.create_session("default", &world).expect("create");

        let mut session = Session::start(world);
        for choice in ["key", "room_b"] {
            let outcome = session.choose(choice);
            assert!(outcome.mutated());
            store.record_outcome("default", &outcome).expect("record");
        }

        let restored = store.restore("default").expect("restore");
        assert_eq!(restored.current_room_id(), "room_b");
        assert!(restored.inventory().is_empty(), "the key was consumed");
        let room_a = restored.world().room("room_a").expect("room_a");
        assert!(room_a.doors[0].unlocked, "lock state survives restart");
        assert!(room_a.items.is_empty(), "the key record left the room");
    }

    #[test]
    fn pickup_moves_the_item_record_to_the_session() {
        let (store, _dir) = create_test_store();
        let world = test_world();
        store.import_world_if_empty(&world).expect("import");
        store.create_session("default", &world).expect("create");

        let mut session = Session::start(world);
        let outcome = session.choose("key");
        store.record_outcome("default", &outcome).expect("record");

        let items = store.session_items("default").expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "key");
        let restored_world = store.restore_world().expect("world");
        assert!(restored_world.room("room_a").expect("room").items.is_empty());
    }

    #[test]
    fn non_mutating_outcomes_change_nothing() {
        let (store, _dir) = create_test_store();
        let world = test_world();
        store.import_world_if_empty(&world).expect("import");
        store.create_session("default", &world).expect("create");
        let before = store.session("default").expect("session");

        store
            .record_outcome("default", &ChoiceOutcome::Nothing)
            .expect("nothing");
        store
            .record_outcome(
                "default",
                &ChoiceOutcome::DoorLocked {
                    to: "room_b".to_string(),
                    missing: vec!["key".to_string()],
                },
            )
            .expect("locked");

        assert_eq!(store.session("default").expect("session"), before);
    }

    #[test]
    fn delete_room_cascades_to_owned_records_only() {
        let (store, _dir) = create_test_store();
        let world = test_world();
        store.import_world_if_empty(&world).expect("import");
        store.create_session("default", &world).expect("create");

        // Move the key into the session inventory first.
        let mut session = Session::start(world);
        let outcome = session.choose("key");
        store.record_outcome("default", &outcome).expect("record");

        store.delete_room("room_a").expect("delete");

        assert_eq!(store.room_count().expect("count"), 1);
        assert!(matches!(
            store.door("room_a", 0).unwrap_err(),
            StoreError::NotFound(_)
        ));
        let items = store.session_items("default").expect("items");
        assert_eq!(items.len(), 1, "session-owned items survive the cascade");
    }

    #[test]
    fn delete_door_and_item_touch_single_records() {
        let (store, _dir) = create_test_store();
        let world = test_world();
        store.import_world_if_empty(&world).expect("import");

        store.delete_door("room_a", 0).expect("delete door");
        assert!(matches!(
            store.delete_door("room_a", 0).unwrap_err(),
            StoreError::NotFound(_)
        ));

        store.delete_item("room_a", "key").expect("delete item");
        assert!(matches!(
            store.delete_item("room_a", "key").unwrap_err(),
            StoreError::NotFound(_)
        ));

        // The room record itself is untouched either way.
        assert_eq!(store.room_count().expect("count"), 2);
    }

    #[test]
    fn missing_session_is_not_found() {
        let (store, _dir) = create_test_store();
        store.import_world_if_empty(&test_world()).expect("import");

        assert!(!store.has_session("ghost").expect("has_session"));
        assert!(matches!(
            store.restore("ghost").unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn slot_names_are_normalized() {
        let (store, _dir) = create_test_store();
        let world = test_world();
        store.import_world_if_empty(&world).expect("import");
        store.create_session("  Default ", &world).expect("create");

        assert!(store.has_session("default").expect("has_session"));
        assert_eq!(store.session("DEFAULT").expect("session").slot, "default");
    }

    #[test]
    fn key_segments_escape_separators() {
        assert_eq!(GameStore::key_segment("plain"), "plain");
        assert_eq!(GameStore::key_segment("a:b"), "a\\:b");
        assert_eq!(GameStore::key_segment("a\\b"), "a\\\\b");
        // Room `a`'s door prefix must not reach room `a:b`'s keys.
        let plain = GameStore::door_prefix("a");
        assert!(!GameStore::door_key("a:b", 0).starts_with(&plain));
    }

    #[test]
    fn colon_ids_keep_their_records_apart() {
        let (store, _dir) = create_test_store();
        let world = World::from_rooms(vec![
            Room::new("a", "A", "Plain.")
                .with_door(Door::to("a:b"))
                .as_starting(),
            Room::new("a:b", "Annex", "Off to the side.")
                .with_door(Door::to("a"))
                .with_item(Item::key("key")),
        ])
        .expect("world");
        store.import_world_if_empty(&world).expect("import");

        let restored = store.restore_world().expect("restore");
        let plain = restored.room("a").expect("room a");
        assert_eq!(plain.doors.len(), 1, "only the room's own door comes back");
        assert_eq!(plain.doors[0].destination, "a:b");
        assert!(plain.items.is_empty());
        let annex = restored.room("a:b").expect("room a:b");
        assert_eq!(annex.doors.len(), 1);
        assert_eq!(annex.items.len(), 1);

        store.delete_room("a").expect("delete");
        assert!(store.door("a:b", 0).is_ok(), "the annex keeps its own door");
        assert_eq!(store.room_count().expect("count"), 1);
    }

    #[test]
    fn sequence_keys_keep_numeric_order() {
        assert!(GameStore::door_key("a", 9999) < GameStore::door_key("a", 10000));
        let low = GameStore::session_item_key("slot", 9999);
        let high = GameStore::session_item_key("slot", 10000);
        assert!(low < high, "item keys sort in pickup order");
    }
}
