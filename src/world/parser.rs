//! Room definition parsing.
//!
//! Two file conventions are supported, and a world uses exactly one:
//!
//! **Line format** (`*.room.txt`) - three fixed-order prefixed rows, an
//! optional `STARTING:` row, then the description as free text:
//!
//! ```text
//! LINK_ID: foyer
//! TITLE: The Foyer
//! EXITS: library, cellar[LOCKED]
//! STARTING: yes
//!
//! Dust sheets cover the furniture.
//! ```
//!
//! A `[LOCKED]` tag on an exit marks the door as requiring the conventional
//! `key` item. The line format carries no item list; worlds that place items
//! use the TOML format.
//!
//! **TOML format** (`*.room.toml`) - explicit exit and item entries:
//!
//! ```text
//! link_id = "foyer"
//! title = "The Foyer"
//! description = "Dust sheets cover the furniture."
//! starting = true
//!
//! [[exits]]
//! link_id = "cellar"
//! requires = ["brass key"]
//!
//! [[items]]
//! id = "brass key"
//! type = "key"
//! find_phrase = "A brass key glints under the doormat."
//! ```
//!
//! In both formats identifiers are matched case-insensitively and description
//! whitespace is dedented, so authors may indent freely.

use serde::{Deserialize, Serialize};

use crate::world::errors::DefinitionError;
use crate::world::types::{normalize_id, Door, Item, ItemKind, Room};

/// Item id a bare `locked` flag (or line-format `[LOCKED]` tag) expands to.
pub const DEFAULT_KEY_ITEM: &str = "key";

/// Which definition file convention a world uses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorldFormat {
    /// Fixed-order `LINK_ID:`/`TITLE:`/`EXITS:` rows, description after.
    Line,
    /// TOML documents with explicit exit and item entries.
    #[default]
    Toml,
}

impl WorldFormat {
    /// File suffix a definition must carry to be picked up by the loader.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::Line => ".room.txt",
            Self::Toml => ".room.toml",
        }
    }
}

/// One room as authored on disk, before identifier normalization.
///
/// Serializable so that `init` can scaffold sample files and tests can round
/// trip definitions; parsing goes through [`parse`] instead of serde derive
/// so that missing fields are reported by name.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoomDefinition {
    pub link_id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub starting: bool,
    pub exits: Vec<ExitDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemDefinition>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExitDefinition {
    pub link_id: String,
    #[serde(skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_phrase: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Parse the raw text of one room definition in the given format.
pub fn parse(text: &str, format: WorldFormat) -> Result<RoomDefinition, DefinitionError> {
    match format {
        WorldFormat::Line => parse_line_format(text),
        WorldFormat::Toml => parse_toml_format(text),
    }
}

impl RoomDefinition {
    /// Convert into a validated [`Room`], normalizing identifiers, deriving
    /// door lock state, and resolving item kinds through the registry.
    pub fn to_room(&self) -> Result<Room, DefinitionError> {
        let mut room = Room::new(&self.link_id, &self.title, &self.description);
        room.starting = self.starting;
        for exit in &self.exits {
            room.doors.push(exit.to_door()?);
        }
        for item in &self.items {
            room.items.push(item.to_item()?);
        }
        Ok(room)
    }
}

impl ExitDefinition {
    fn to_door(&self) -> Result<Door, DefinitionError> {
        let destination = normalize_id(&self.link_id);
        if destination.is_empty() {
            return Err(DefinitionError::BadField {
                field: "exits",
                detail: "exit link_id must not be blank".to_string(),
            });
        }
        let mut requires = Vec::with_capacity(self.requires.len());
        for req in &self.requires {
            let id = normalize_id(req);
            if id.is_empty() {
                return Err(DefinitionError::BadField {
                    field: "exits",
                    detail: format!("exit '{}' lists a blank requirement", destination),
                });
            }
            requires.push(id);
        }
        // A bare locked flag means "needs the conventional key".
        if requires.is_empty() && self.locked {
            requires.push(DEFAULT_KEY_ITEM.to_string());
        }
        Ok(Door {
            destination,
            requires,
            unlocked: false,
        })
    }
}

impl ItemDefinition {
    fn to_item(&self) -> Result<Item, DefinitionError> {
        let kind = ItemKind::from_name(&self.kind)
            .ok_or_else(|| DefinitionError::UnknownItemKind(self.kind.clone()))?;
        let mut item = Item::new(&self.id, kind);
        if item.id.is_empty() {
            return Err(DefinitionError::BadField {
                field: "items",
                detail: "item id must not be blank".to_string(),
            });
        }
        if let Some(phrase) = &self.find_phrase {
            item = item.with_find_phrase(phrase);
        }
        Ok(item)
    }
}

impl From<&Room> for RoomDefinition {
    fn from(room: &Room) -> Self {
        Self {
            link_id: room.id.clone(),
            title: room.title.clone(),
            description: room.description.clone(),
            starting: room.starting,
            exits: room.doors.iter().map(ExitDefinition::from).collect(),
            items: room.items.iter().map(ItemDefinition::from).collect(),
        }
    }
}

impl From<&Door> for ExitDefinition {
    fn from(door: &Door) -> Self {
        Self {
            link_id: door.destination.clone(),
            locked: !door.requires.is_empty(),
            requires: door.requires.clone(),
        }
    }
}

impl From<&Item> for ItemDefinition {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind.name().to_string(),
            find_phrase: item.find_phrase.clone(),
        }
    }
}

// ============================================================================
// TOML format
// ============================================================================

/// Lenient mirror of [`RoomDefinition`]. Everything is optional here so that
/// presence can be validated by hand with field-naming errors instead of the
/// generic serde message.
#[derive(Debug, Deserialize)]
struct RawRoom {
    link_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    starting: bool,
    exits: Option<Vec<RawExit>>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawExit {
    link_id: Option<String>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    requires: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    find_phrase: Option<String>,
}

fn parse_toml_format(text: &str) -> Result<RoomDefinition, DefinitionError> {
    let raw: RawRoom = toml::from_str(text)?;
    raw.validate()
}

impl RawRoom {
    fn validate(self) -> Result<RoomDefinition, DefinitionError> {
        let link_id = require_text(self.link_id, "link_id")?;
        let title = require_text(self.title, "title")?;
        let description = require_description(self.description)?;
        let exits = self
            .exits
            .ok_or(DefinitionError::MissingField("exits"))?
            .into_iter()
            .map(RawExit::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let items = self
            .items
            .into_iter()
            .map(RawItem::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RoomDefinition {
            link_id,
            title,
            description,
            starting: self.starting,
            exits,
            items,
        })
    }
}

impl RawExit {
    fn validate(self) -> Result<ExitDefinition, DefinitionError> {
        let link_id = self
            .link_id
            .ok_or(DefinitionError::MissingField("exits.link_id"))?;
        Ok(ExitDefinition {
            link_id,
            locked: self.locked,
            requires: self.requires,
        })
    }
}

impl RawItem {
    fn validate(self) -> Result<ItemDefinition, DefinitionError> {
        let id = self.id.ok_or(DefinitionError::MissingField("items.id"))?;
        let kind = self
            .kind
            .ok_or(DefinitionError::MissingField("items.type"))?;
        Ok(ItemDefinition {
            id,
            kind,
            find_phrase: self.find_phrase,
        })
    }
}

fn require_text(value: Option<String>, field: &'static str) -> Result<String, DefinitionError> {
    let value = value.ok_or(DefinitionError::MissingField(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DefinitionError::BadField {
            field,
            detail: "must not be blank".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn require_description(value: Option<String>) -> Result<String, DefinitionError> {
    let value = value.ok_or(DefinitionError::MissingField("description"))?;
    let rows: Vec<&str> = value.lines().collect();
    let text = dedent(&rows);
    if text.is_empty() {
        return Err(DefinitionError::BadField {
            field: "description",
            detail: "must not be blank".to_string(),
        });
    }
    Ok(text)
}

// ============================================================================
// Line format
// ============================================================================

fn parse_line_format(text: &str) -> Result<RoomDefinition, DefinitionError> {
    let rows: Vec<&str> = text.lines().collect();
    let link_id = prefixed_field(&rows, 0, "link_id")?.to_string();
    let title = prefixed_field(&rows, 1, "title")?.to_string();
    let exits = parse_exit_list(prefixed_field(&rows, 2, "exits")?);

    let mut body_start = 3;
    let mut starting = false;
    if let Some(value) = rows.get(3).and_then(|row| row.strip_prefix("STARTING: ")) {
        starting = parse_bool(value.trim()).ok_or_else(|| DefinitionError::BadField {
            field: "starting",
            detail: format!("expected true/false, got '{}'", value.trim()),
        })?;
        body_start = 4;
    }

    if rows.len() <= body_start {
        return Err(DefinitionError::MissingField("description"));
    }
    let description = dedent(&rows[body_start..]);
    if description.is_empty() {
        return Err(DefinitionError::BadField {
            field: "description",
            detail: "must not be blank".to_string(),
        });
    }

    if link_id.is_empty() {
        return Err(DefinitionError::BadField {
            field: "link_id",
            detail: "must not be blank".to_string(),
        });
    }
    if title.is_empty() {
        return Err(DefinitionError::BadField {
            field: "title",
            detail: "must not be blank".to_string(),
        });
    }

    Ok(RoomDefinition {
        link_id,
        title,
        description,
        starting,
        exits,
        items: Vec::new(),
    })
}

/// Fetch row `index` and strip its `LABEL: ` prefix, where the label is the
/// uppercased field name. Exact prefixes are required; a misspelled label is
/// reported as a bad field, a missing row as a missing one.
fn prefixed_field<'a>(
    rows: &[&'a str],
    index: usize,
    field: &'static str,
) -> Result<&'a str, DefinitionError> {
    let prefix = format!("{}: ", field.to_ascii_uppercase());
    let row = rows.get(index).ok_or(DefinitionError::MissingField(field))?;
    let value = row
        .strip_prefix(&prefix)
        .ok_or_else(|| DefinitionError::BadField {
            field,
            detail: format!("line {} must start with '{}'", index + 1, prefix),
        })?;
    Ok(value.trim())
}

/// Split a comma-separated exit list, honoring `[LOCKED]` tags. Blank entries
/// are skipped, so an empty list is a valid dead end.
fn parse_exit_list(raw: &str) -> Vec<ExitDefinition> {
    let mut exits = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (link_id, locked) = strip_locked_tag(entry);
        exits.push(ExitDefinition {
            link_id: link_id.to_string(),
            locked,
            requires: Vec::new(),
        });
    }
    exits
}

fn strip_locked_tag(entry: &str) -> (&str, bool) {
    let lower = entry.to_ascii_lowercase();
    match lower.strip_suffix("[locked]") {
        // ASCII-only lowering keeps byte offsets aligned with `entry`.
        Some(kept) => (entry[..kept.len()].trim_end(), true),
        None => (entry, false),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Strip the common leading indentation and surrounding blank lines from a
/// description block, preserving interior blank lines. The indent is the
/// longest whitespace prefix shared by every non-blank row, matched per
/// character so multibyte whitespace never splits.
fn dedent(rows: &[&str]) -> String {
    let mut indent: Option<&str> = None;
    for row in rows.iter().filter(|row| !row.trim().is_empty()) {
        let lead = leading_whitespace(row);
        indent = Some(match indent {
            Some(prefix) => common_prefix(prefix, lead),
            None => lead,
        });
    }
    let indent = indent.unwrap_or("");
    let mut lines: Vec<&str> = rows
        .iter()
        .map(|&row| row.strip_prefix(indent).unwrap_or(row).trim_end())
        .collect();
    while lines.first().is_some_and(|row| row.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|row| row.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn leading_whitespace(row: &str) -> &str {
    let end = row
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map_or(row.len(), |(at, _)| at);
    &row[..end]
}

fn common_prefix<'a>(left: &'a str, right: &str) -> &'a str {
    let end = left
        .char_indices()
        .zip(right.chars())
        .take_while(|&((_, a), b)| a == b)
        .last()
        .map_or(0, |((at, ch), _)| at + ch.len_utf8());
    &left[..end]
}
