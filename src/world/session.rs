//! The running game: current room, player inventory, and the dispatch of
//! player choices. All play-time mutation funnels through [`Session::choose`].

use log::debug;

use crate::world::errors::WorldError;
use crate::world::inventory::Inventory;
use crate::world::types::{normalize_id, Item, UnlockOutcome, World};

/// What a single player choice did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceOutcome {
    /// Walked through an open door.
    Moved { to: String },
    /// Unlocked a door, consuming the listed items, and walked through it.
    /// `door_index` is the door's position in the source room's list.
    UnlockedAndMoved {
        from: String,
        to: String,
        door_index: usize,
        consumed: Vec<Item>,
    },
    /// The chosen door is locked and the player lacks what it needs.
    /// Nothing changed.
    DoorLocked { to: String, missing: Vec<String> },
    /// Moved an item from the current room into the inventory.
    PickedUp { room: String, item: Item },
    /// The input named neither an exit nor an item. Nothing changed.
    Nothing,
}

impl ChoiceOutcome {
    /// Whether this outcome mutated the session, and so is worth persisting.
    pub fn mutated(&self) -> bool {
        !matches!(self, Self::DoorLocked { .. } | Self::Nothing)
    }
}

/// One selectable entry on a room screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    Exit {
        to: String,
        locked: bool,
        requires: Vec<String>,
    },
    Item {
        name: String,
    },
    Quit,
}

/// Render model for the current room: everything the presentation layer
/// needs, with no reference back into the world.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomView {
    pub title: String,
    pub description: String,
    /// Exits in authored order, then items in authored order, then quit.
    pub choices: Vec<Choice>,
    pub inventory: Vec<String>,
}

/// A single player's run through a [`World`].
///
/// The session owns the world: door lock state and room item lists mutate in
/// place as the player acts. One process, one session; nothing here is
/// shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    world: World,
    current_room: String,
    inventory: Inventory,
}

impl Session {
    /// Begin a fresh run at the world's starting room with an empty
    /// inventory.
    pub fn start(world: World) -> Self {
        let current_room = world.starting_room().to_string();
        debug!("session started in '{}'", current_room);
        Self {
            world,
            current_room,
            inventory: Inventory::new(),
        }
    }

    /// Rebuild a run restored from persistence.
    pub fn resume(
        world: World,
        current_room: &str,
        inventory: Inventory,
    ) -> Result<Self, WorldError> {
        let current_room = normalize_id(current_room);
        if world.room(&current_room).is_none() {
            return Err(WorldError::RoomNotFound(current_room));
        }
        debug!(
            "session resumed in '{}' carrying {} items",
            current_room,
            inventory.len()
        );
        Ok(Self {
            world,
            current_room,
            inventory,
        })
    }

    pub fn current_room_id(&self) -> &str {
        &self.current_room
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Dispatch one player-chosen target string.
    ///
    /// Exits are checked before items, so a name that is both an exit and an
    /// item in the same room always resolves to the exit. Input matching
    /// neither is a no-op, never an error.
    pub fn choose(&mut self, input: &str) -> ChoiceOutcome {
        let target = normalize_id(input);
        if target.is_empty() {
            return ChoiceOutcome::Nothing;
        }
        if let Some(outcome) = self.try_move(&target) {
            return outcome;
        }
        if let Some(outcome) = self.try_pick_up(&target) {
            return outcome;
        }
        debug!("choice '{}' matched nothing in '{}'", target, self.current_room);
        ChoiceOutcome::Nothing
    }

    /// Build the render model for the current room.
    pub fn view(&self) -> RoomView {
        let mut title = String::new();
        let mut description = String::new();
        let mut choices = Vec::new();
        if let Some(room) = self.world.room(&self.current_room) {
            title = room.title.clone();
            description = room.description.clone();
            for door in &room.doors {
                choices.push(Choice::Exit {
                    to: door.destination.clone(),
                    locked: door.requires_unlock(),
                    requires: door.requires.clone(),
                });
            }
            for item in &room.items {
                choices.push(Choice::Item {
                    name: item.id.clone(),
                });
            }
        }
        choices.push(Choice::Quit);
        RoomView {
            title,
            description,
            choices,
            inventory: self
                .inventory
                .items()
                .iter()
                .map(|item| item.id.clone())
                .collect(),
        }
    }

    /// Walk through the first door whose destination matches, unlocking it
    /// first when needed. `None` when no exit matches, so item pickup gets
    /// its turn.
    fn try_move(&mut self, target: &str) -> Option<ChoiceOutcome> {
        let from = self.current_room.clone();
        let room = self.world.room_mut(&from)?;
        let door_index = room.door_to(target)?;
        let door = &mut room.doors[door_index];

        if door.is_passable() {
            let to = door.destination.clone();
            self.current_room = to.clone();
            debug!("moved '{}' -> '{}'", from, to);
            return Some(ChoiceOutcome::Moved { to });
        }

        match door.attempt_unlock(&mut self.inventory) {
            UnlockOutcome::Unlocked { consumed } => {
                let to = door.destination.clone();
                self.current_room = to.clone();
                debug!(
                    "unlocked '{}' -> '{}', consumed {} items",
                    from,
                    to,
                    consumed.len()
                );
                Some(ChoiceOutcome::UnlockedAndMoved {
                    from,
                    to,
                    door_index,
                    consumed,
                })
            }
            UnlockOutcome::StillLocked { missing } => {
                debug!("door '{}' -> '{}' stays locked", from, door.destination);
                Some(ChoiceOutcome::DoorLocked {
                    to: door.destination.clone(),
                    missing,
                })
            }
            // The door reported passable after we saw it locked; walk
            // through rather than stall the player.
            UnlockOutcome::NotLocked => {
                let to = door.destination.clone();
                self.current_room = to.clone();
                Some(ChoiceOutcome::Moved { to })
            }
        }
    }

    /// Transfer the first matching item from the current room into the
    /// inventory. `None` when nothing matches.
    fn try_pick_up(&mut self, target: &str) -> Option<ChoiceOutcome> {
        let room_id = self.current_room.clone();
        let room = self.world.room_mut(&room_id)?;
        let item = room.take_item(target)?;
        self.inventory.add(item.clone());
        debug!("picked up '{}' in '{}'", item.id, room_id);
        Some(ChoiceOutcome::PickedUp {
            room: room_id,
            item,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::types::{Door, Item, Room};

    /// room_a holds a key and a locked door to room_b; room_b leads back.
    fn test_world() -> World {
        World::from_rooms(vec![
            Room::new("room_a", "Room A", "First.")
                .with_door(Door::to("room_b").requiring("key"))
                .with_item(Item::key("key"))
                .as_starting(),
            Room::new("room_b", "Room B", "Second.").with_door(Door::to("room_a")),
        ])
        .expect("test world")
    }

    #[test]
    fn starts_in_the_starting_room() {
        let session = Session::start(test_world());
        assert_eq!(session.current_room_id(), "room_a");
        assert!(session.inventory().is_empty());
    }

    #[test]
    fn resume_rejects_unknown_rooms() {
        let err = Session::resume(test_world(), "void", Inventory::new()).unwrap_err();
        assert!(matches!(err, WorldError::RoomNotFound(_)));
    }

    #[test]
    fn locked_door_blocks_until_the_key_is_held() {
        let mut session = Session::start(test_world());

        match session.choose("room_b") {
            ChoiceOutcome::DoorLocked { to, missing } => {
                assert_eq!(to, "room_b");
                assert_eq!(missing, vec!["key"]);
            }
            other => panic!("expected DoorLocked, got {:?}", other),
        }
        assert_eq!(session.current_room_id(), "room_a", "no movement");

        assert!(matches!(
            session.choose("key"),
            ChoiceOutcome::PickedUp { .. }
        ));
        match session.choose("room_b") {
            ChoiceOutcome::UnlockedAndMoved { from, to, consumed, .. } => {
                assert_eq!(from, "room_a");
                assert_eq!(to, "room_b");
                assert_eq!(consumed.len(), 1);
            }
            other => panic!("expected UnlockedAndMoved, got {:?}", other),
        }
        assert_eq!(session.current_room_id(), "room_b");
        assert!(session.inventory().is_empty(), "the key was consumed");
    }

    #[test]
    fn unlocked_door_stays_open_on_return_trips() {
        let mut session = Session::start(test_world());
        session.choose("key");
        session.choose("room_b");
        session.choose("room_a");
        assert_eq!(session.current_room_id(), "room_a");

        // No key held anymore, but the lock is already sprung.
        match session.choose("room_b") {
            ChoiceOutcome::Moved { to } => assert_eq!(to, "room_b"),
            other => panic!("expected Moved, got {:?}", other),
        }
    }

    #[test]
    fn pickup_moves_the_item_out_of_the_room() {
        let mut session = Session::start(test_world());

        match session.choose("key") {
            ChoiceOutcome::PickedUp { room, item } => {
                assert_eq!(room, "room_a");
                assert_eq!(item.id, "key");
            }
            other => panic!("expected PickedUp, got {:?}", other),
        }
        assert!(session.inventory().contains("key"));
        assert_eq!(
            session.choose("key"),
            ChoiceOutcome::Nothing,
            "a picked-up item is gone from the room"
        );
    }

    #[test]
    fn choice_matching_is_case_insensitive() {
        let mut session = Session::start(test_world());
        assert!(matches!(
            session.choose("  KEY "),
            ChoiceOutcome::PickedUp { .. }
        ));
        assert!(matches!(
            session.choose("ROOM_B"),
            ChoiceOutcome::UnlockedAndMoved { .. }
        ));
    }

    #[test]
    fn unmatched_input_changes_nothing() {
        let mut session = Session::start(test_world());
        let before = session.clone();

        assert_eq!(session.choose("teleport"), ChoiceOutcome::Nothing);
        assert_eq!(session.choose(""), ChoiceOutcome::Nothing);
        assert_eq!(session, before, "no-ops leave the session untouched");
    }

    #[test]
    fn exits_shadow_items_with_the_same_name() {
        let world = World::from_rooms(vec![
            Room::new("hall", "Hall", "x")
                .with_door(Door::to("garden"))
                .with_item(Item::key("garden"))
                .as_starting(),
            Room::new("garden", "Garden", "y"),
        ])
        .expect("world");
        let mut session = Session::start(world);

        match session.choose("garden") {
            ChoiceOutcome::Moved { to } => assert_eq!(to, "garden"),
            other => panic!("expected the exit to win, got {:?}", other),
        }
    }

    #[test]
    fn first_door_wins_among_duplicate_destinations() {
        let world = World::from_rooms(vec![
            Room::new("hall", "Hall", "x")
                .with_door(Door::to("vault").requiring("gem"))
                .with_door(Door::to("vault"))
                .as_starting(),
            Room::new("vault", "Vault", "y"),
        ])
        .expect("world");
        let mut session = Session::start(world);

        // The locked first door shadows the open second one.
        assert!(matches!(
            session.choose("vault"),
            ChoiceOutcome::DoorLocked { .. }
        ));
    }

    #[test]
    fn view_lists_exits_then_items_then_quit() {
        let session = Session::start(test_world());
        let view = session.view();

        assert_eq!(view.title, "Room A");
        assert_eq!(view.choices.len(), 3);
        assert!(matches!(
            &view.choices[0],
            Choice::Exit { to, locked: true, .. } if to == "room_b"
        ));
        assert!(matches!(&view.choices[1], Choice::Item { name } if name == "key"));
        assert!(matches!(&view.choices[2], Choice::Quit));
        assert!(view.inventory.is_empty());
    }

    #[test]
    fn view_reflects_unlocks_and_pickups() {
        let mut session = Session::start(test_world());
        session.choose("key");
        session.choose("room_b");
        session.choose("room_a");
        let view = session.view();

        assert!(matches!(
            &view.choices[0],
            Choice::Exit { locked: false, .. }
        ));
        assert_eq!(
            view.choices.len(),
            2,
            "the key is no longer a room choice"
        );
        assert!(view.inventory.is_empty(), "the key was spent on the door");
    }
}
