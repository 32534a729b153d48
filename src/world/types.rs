use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::world::errors::WorldError;
use crate::world::inventory::Inventory;

/// Normalize a room/door/item identifier for case-insensitive lookups.
///
/// Lowercases, trims, and collapses internal whitespace so that `"Room  A"`
/// and `"room a"` name the same thing.
pub fn normalize_id(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Item kinds recognized by definition files.
///
/// Adding a kind means adding a variant here plus a row in
/// [`ItemKind::from_name`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Key,
}

impl ItemKind {
    /// Resolve a kind name as written in a definition file.
    pub fn from_name(name: &str) -> Option<Self> {
        match normalize_id(name).as_str() {
            "key" => Some(Self::Key),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Key => "key",
        }
    }
}

/// A pickupable object. Owned by a room until picked up, then by the player;
/// never by both at once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    /// Shown to the player when the item is picked up.
    pub find_phrase: Option<String>,
}

impl Item {
    pub fn new(id: &str, kind: ItemKind) -> Self {
        Self {
            id: normalize_id(id),
            kind,
            find_phrase: None,
        }
    }

    /// Shorthand for the only kind currently in the registry.
    pub fn key(id: &str) -> Self {
        Self::new(id, ItemKind::Key)
    }

    pub fn with_find_phrase(mut self, phrase: &str) -> Self {
        self.find_phrase = Some(phrase.to_string());
        self
    }
}

/// Outcome of a single unlock attempt against a door.
#[derive(Debug, Clone, PartialEq)]
pub enum UnlockOutcome {
    /// The door was already passable; nothing to do, not an error.
    NotLocked,
    /// Every requirement was met. The listed items left the inventory and
    /// the door is open for good.
    Unlocked { consumed: Vec<Item> },
    /// At least one requirement is unmet; nothing changed. `missing` holds
    /// one entry per item still needed.
    StillLocked { missing: Vec<String> },
}

/// One-directional edge to another room, optionally gated by required items.
///
/// A passable door A -> B implies nothing about B -> A; the reverse edge must
/// be authored separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    pub destination: String,
    /// Item ids the player must hold to unlock. Empty means never locked.
    pub requires: Vec<String>,
    /// Set once by a successful unlock, never cleared.
    pub unlocked: bool,
}

impl Door {
    pub fn to(destination: &str) -> Self {
        Self {
            destination: normalize_id(destination),
            requires: Vec::new(),
            unlocked: false,
        }
    }

    pub fn requiring(mut self, item_id: &str) -> Self {
        self.requires.push(normalize_id(item_id));
        self
    }

    /// Whether the player can walk through right now.
    pub fn is_passable(&self) -> bool {
        self.requires.is_empty() || self.unlocked
    }

    /// Whether the presentation layer should annotate this door as locked.
    pub fn requires_unlock(&self) -> bool {
        !self.is_passable()
    }

    /// Try to unlock using the player's inventory.
    ///
    /// All-or-nothing: requirements are verified before anything is removed.
    /// On success exactly one matching item per requirement occurrence is
    /// consumed, even when the inventory holds duplicates, and the door stays
    /// unlocked permanently. On failure no mutation occurs.
    pub fn attempt_unlock(&mut self, inventory: &mut Inventory) -> UnlockOutcome {
        if self.is_passable() {
            return UnlockOutcome::NotLocked;
        }

        // Requirements may repeat ("key", "key"), so tally per id first.
        let mut needed: Vec<(&str, usize)> = Vec::new();
        for req in &self.requires {
            match needed.iter_mut().find(|(id, _)| *id == req.as_str()) {
                Some((_, count)) => *count += 1,
                None => needed.push((req.as_str(), 1)),
            }
        }

        let mut missing = Vec::new();
        for (id, count) in &needed {
            let held = inventory.count(id);
            for _ in held..*count {
                missing.push((*id).to_string());
            }
        }
        if !missing.is_empty() {
            return UnlockOutcome::StillLocked { missing };
        }

        let requirements = self.requires.clone();
        let mut consumed = Vec::with_capacity(requirements.len());
        for req in &requirements {
            if let Some(item) = inventory.take(req) {
                consumed.push(item);
            }
        }
        self.unlocked = true;
        UnlockOutcome::Unlocked { consumed }
    }
}

/// A named location: description text, outbound doors, and the items the
/// player has not picked up yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub title: String,
    pub description: String,
    pub doors: Vec<Door>,
    pub items: Vec<Item>,
    /// Marks the room the session begins in. Exactly one per world.
    pub starting: bool,
}

impl Room {
    pub fn new(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: normalize_id(id),
            title: title.to_string(),
            description: description.to_string(),
            doors: Vec::new(),
            items: Vec::new(),
            starting: false,
        }
    }

    pub fn with_door(mut self, door: Door) -> Self {
        self.doors.push(door);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn as_starting(mut self) -> Self {
        self.starting = true;
        self
    }

    /// Index of the first door leading to `destination`, by authored order.
    pub fn door_to(&self, destination: &str) -> Option<usize> {
        let target = normalize_id(destination);
        self.doors.iter().position(|door| door.destination == target)
    }

    /// Remove and return the first item matching `name`, case-insensitively.
    pub fn take_item(&mut self, name: &str) -> Option<Item> {
        let target = normalize_id(name);
        let index = self.items.iter().position(|item| item.id == target)?;
        Some(self.items.remove(index))
    }
}

/// A door requirement naming an item that exists in no room. Such a door can
/// never be unlocked; `validate` reports these as authoring warnings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnsatisfiableRequirement {
    pub room: String,
    pub destination: String,
    pub item: String,
}

/// The complete room graph, keyed by normalized identifier.
///
/// Topology is immutable after construction: items move between rooms and the
/// inventory and doors unlock, but rooms and doors are never added or removed
/// during play.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    rooms: HashMap<String, Room>,
    start: String,
}

impl World {
    /// Assemble a world from parsed rooms, validating the graph invariants:
    /// every door destination must name an existing room, and exactly one
    /// room must carry the starting marker.
    ///
    /// Ids are expected to be unique; [`crate::world::load_world`] rejects
    /// duplicates naming the offending files. When constructing directly, a
    /// repeated id replaces the earlier room.
    pub fn from_rooms(rooms: Vec<Room>) -> Result<Self, WorldError> {
        let mut map = HashMap::with_capacity(rooms.len());
        let mut start: Option<String> = None;
        for room in rooms {
            if room.starting {
                if let Some(first) = &start {
                    return Err(WorldError::MultipleStartingRooms {
                        first: first.clone(),
                        second: room.id.clone(),
                    });
                }
                start = Some(room.id.clone());
            }
            map.insert(room.id.clone(), room);
        }
        let start = start.ok_or(WorldError::NoStartingRoom)?;

        for room in map.values() {
            for door in &room.doors {
                if !map.contains_key(&door.destination) {
                    return Err(WorldError::DanglingDoor {
                        room: room.id.clone(),
                        destination: door.destination.clone(),
                    });
                }
            }
        }

        Ok(Self { rooms: map, start })
    }

    /// Look up a room by identifier, case-insensitively. O(1) expected.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(&normalize_id(id))
    }

    pub fn room_mut(&mut self, id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(&normalize_id(id))
    }

    /// Identifier of the room marked as starting.
    pub fn starting_room(&self) -> &str {
        &self.start
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Iterate rooms in an unspecified order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Door requirements naming items that exist in no room, sorted for
    /// deterministic reporting.
    pub fn unsatisfiable_requirements(&self) -> Vec<UnsatisfiableRequirement> {
        let available: HashSet<&str> = self
            .rooms
            .values()
            .flat_map(|room| room.items.iter().map(|item| item.id.as_str()))
            .collect();
        let mut found = Vec::new();
        for room in self.rooms.values() {
            for door in &room.doors {
                for req in &door.requires {
                    if !available.contains(req.as_str()) {
                        found.push(UnsatisfiableRequirement {
                            room: room.id.clone(),
                            destination: door.destination.clone(),
                            item: req.clone(),
                        });
                    }
                }
            }
        }
        found.sort();
        found
    }
}
