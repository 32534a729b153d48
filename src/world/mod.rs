//! The adventure core: room definitions on disk, the validated room graph,
//! and the session state machine that plays it.
//!
//! A world is loaded once at startup ([`load_world`]), then owned by a
//! [`Session`] for the whole run. Everything a player does goes through
//! [`Session::choose`]; the persistence and presentation layers only observe
//! the [`ChoiceOutcome`]s that fall out.

pub mod errors;
pub mod inventory;
pub mod loader;
pub mod parser;
pub mod session;
pub mod types;

pub use errors::{DefinitionError, WorldError};
pub use inventory::Inventory;
pub use loader::load_world;
pub use parser::{
    parse, ExitDefinition, ItemDefinition, RoomDefinition, WorldFormat, DEFAULT_KEY_ITEM,
};
pub use session::{Choice, ChoiceOutcome, RoomView, Session};
pub use types::{
    normalize_id, Door, Item, ItemKind, Room, UnlockOutcome, UnsatisfiableRequirement, World,
};
