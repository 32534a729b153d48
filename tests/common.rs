//! Shared world fixtures for the integration tests.
//!
//! Each scenario exists as definition files written into a temp dir (for
//! tests that go through the loader) and, where useful, as an in-memory
//! world. Keep the two spellings in sync when editing.

use std::path::Path;

use roomkey::world::{Door, Item, Room, World};

/// Two rooms: `room_a` starts with a key on the floor and a locked door to
/// `room_b`; `room_b` has an open door back.
#[allow(dead_code)] // Each test binary compiles this module; not all use every fixture.
pub fn write_locked_pair(dir: &Path) {
    write(
        dir,
        "room_a.room.toml",
        r#"
link_id = "room_a"
title = "Room A"
description = "The first room."
starting = true

[[exits]]
link_id = "room_b"
locked = true

[[items]]
id = "key"
type = "key"
find_phrase = "You pocket the key."
"#,
    );
    write(
        dir,
        "room_b.room.toml",
        r#"
link_id = "room_b"
title = "Room B"
description = "The second room."

[[exits]]
link_id = "room_a"
"#,
    );
}

/// The locked-pair scenario built directly, for tests that skip the loader.
#[allow(dead_code)]
pub fn locked_pair_world() -> World {
    World::from_rooms(vec![
        Room::new("room_a", "Room A", "The first room.")
            .with_door(Door::to("room_b").requiring("key"))
            .with_item(Item::key("key").with_find_phrase("You pocket the key."))
            .as_starting(),
        Room::new("room_b", "Room B", "The second room.").with_door(Door::to("room_a")),
    ])
    .expect("locked pair world")
}

/// Three rooms: the vault door needs two keys found in different rooms.
#[allow(dead_code)]
pub fn write_manor(dir: &Path) {
    write(
        dir,
        "foyer.room.toml",
        r#"
link_id = "foyer"
title = "The Foyer"
description = "Coats nobody will reclaim."
starting = true

[[exits]]
link_id = "study"

[[exits]]
link_id = "vault"
requires = ["brass key", "iron key"]

[[items]]
id = "brass key"
type = "key"
"#,
    );
    write(
        dir,
        "study.room.toml",
        r#"
link_id = "study"
title = "The Study"
description = "Papers everywhere."

[[exits]]
link_id = "foyer"

[[items]]
id = "iron key"
type = "key"
"#,
    );
    write(
        dir,
        "vault.room.toml",
        r#"
link_id = "vault"
title = "The Vault"
description = "Empty shelves."
exits = []
"#,
    );
}

#[allow(dead_code)]
fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).expect("write definition");
}
