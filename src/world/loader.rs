//! Directory loading: definition files in, validated [`World`] out.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::world::errors::WorldError;
use crate::world::parser::{self, WorldFormat};
use crate::world::types::World;

/// Load every room definition under `dir` carrying the format's file suffix
/// and assemble the world.
///
/// Files are visited in name order so failures are deterministic. Any
/// malformed definition aborts the whole load: a world missing one room turns
/// every door into it dangling, which is strictly worse than failing fast.
pub fn load_world(dir: impl AsRef<Path>, format: WorldFormat) -> Result<World, WorldError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| WorldError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        // A failed entry aborts the load; a silently skipped file would
        // surface later as dangling doors.
        let entry = entry.map_err(|source| WorldError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if is_definition(&path, format) {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(WorldError::EmptyWorld(dir.to_path_buf()));
    }

    let mut sources: HashMap<String, PathBuf> = HashMap::new();
    let mut rooms = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|source| WorldError::Io {
            path: path.clone(),
            source,
        })?;
        let room = parser::parse(&text, format)
            .and_then(|definition| definition.to_room())
            .map_err(|source| WorldError::MalformedDefinition {
                file: path.clone(),
                source,
            })?;
        if let Some(first) = sources.insert(room.id.clone(), path.clone()) {
            return Err(WorldError::DuplicateRoomId {
                id: room.id,
                first,
                second: path,
            });
        }
        debug!("loaded room '{}' from {}", room.id, path.display());
        rooms.push(room);
    }

    let world = World::from_rooms(rooms)?;
    debug!(
        "world ready: {} rooms, starting at '{}'",
        world.room_count(),
        world.starting_room()
    );
    Ok(world)
}

fn is_definition(path: &Path, format: WorldFormat) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.ends_with(format.file_suffix()))
            .unwrap_or(false)
}
