use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing a single room definition. Fatal to that file.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("bad value for field '{field}': {detail}")]
    BadField { field: &'static str, detail: String },

    /// An item declared a kind the registry does not recognize.
    #[error("unknown item kind '{0}'")]
    UnknownItemKind(String),

    /// The document could not be parsed at all.
    #[error("syntax error: {0}")]
    Syntax(#[from] toml::de::Error),
}

/// Errors from assembling a world out of definition files.
///
/// All of these are fatal at startup: a partially loaded world turns
/// authoring mistakes into dangling doors at play time.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed definition {}: {source}", file.display())]
    MalformedDefinition {
        file: PathBuf,
        #[source]
        source: DefinitionError,
    },

    #[error("duplicate room id '{id}': defined in {} and {}", first.display(), second.display())]
    DuplicateRoomId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("door in '{room}' leads to unknown room '{destination}'")]
    DanglingDoor { room: String, destination: String },

    #[error("no room is marked as starting")]
    NoStartingRoom,

    #[error("more than one room is marked as starting: '{first}' and '{second}'")]
    MultipleStartingRooms { first: String, second: String },

    #[error("no room definitions found in {}", .0.display())]
    EmptyWorld(PathBuf),

    #[error("room not found: {0}")]
    RoomNotFound(String),
}
