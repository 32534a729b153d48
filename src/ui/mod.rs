//! Terminal presentation: renders the current room and reads one choice per
//! turn.
//!
//! Every state change goes through [`Session::choose`]; this layer formats
//! the [`RoomView`], prompts, and relays outcomes. The room screen is rebuilt
//! from scratch each turn, so unlocks and pickups show up without any
//! incremental bookkeeping.

use std::collections::VecDeque;
use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[cfg(feature = "persistence")]
use crate::storage::GameStore;
use crate::world::{Choice, ChoiceOutcome, RoomView, Session};

/// Reserved choice that ends the run. Always rendered last on the screen and
/// handled here, never routed through the session.
pub const QUIT_CHOICE: &str = "quit";

/// One turn's worth of player intent.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    /// The player named an exit or an item.
    Choice(String),
    /// The player asked to stop (Ctrl-C or Ctrl-D at the prompt).
    Quit,
}

/// Where player choices come from. Swappable so tests can script a whole
/// run without a terminal.
pub trait ChoiceReader {
    fn read_choice(&mut self, prompt: &str) -> Result<PlayerInput>;
}

/// Interactive reader backed by a rustyline editor, history included.
pub struct LinePrompt {
    editor: DefaultEditor,
}

impl LinePrompt {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialize the line editor")?;
        Ok(Self { editor })
    }
}

impl ChoiceReader for LinePrompt {
    fn read_choice(&mut self, prompt: &str) -> Result<PlayerInput> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = self.editor.add_history_entry(&line);
                }
                Ok(PlayerInput::Choice(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(PlayerInput::Quit),
            Err(err) => Err(err).context("failed to read player input"),
        }
    }
}

/// Scripted reader for tests: yields the queued lines, then quits.
pub struct ScriptedReader {
    inputs: VecDeque<String>,
}

impl ScriptedReader {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }
}

impl ChoiceReader for ScriptedReader {
    fn read_choice(&mut self, _prompt: &str) -> Result<PlayerInput> {
        match self.inputs.pop_front() {
            Some(line) => Ok(PlayerInput::Choice(line)),
            None => Ok(PlayerInput::Quit),
        }
    }
}

/// Render one full turn screen: uppercased title, description, the choice
/// list (exits, then items, then quit), and the inventory line.
pub fn room_screen(view: &RoomView) -> String {
    let mut screen = String::new();
    screen.push_str(&view.title.to_uppercase());
    screen.push_str("\n\n");
    screen.push_str(&view.description);
    screen.push_str("\n\n");
    for choice in &view.choices {
        match choice {
            Choice::Exit {
                to,
                locked,
                requires,
            } => {
                screen.push_str("-> ");
                screen.push_str(to);
                if *locked {
                    screen.push_str(" [LOCKED]");
                    if !requires.is_empty() {
                        screen.push_str(&format!(" (needs: {})", requires.join(", ")));
                    }
                }
                screen.push('\n');
            }
            Choice::Item { name } => {
                screen.push_str("* ");
                screen.push_str(name);
                screen.push('\n');
            }
            Choice::Quit => {
                screen.push_str(QUIT_CHOICE);
                screen.push('\n');
            }
        }
    }
    screen.push('\n');
    if view.inventory.is_empty() {
        screen.push_str("Inventory: (empty)\n");
    } else {
        screen.push_str(&format!("Inventory: {}\n", view.inventory.join(", ")));
    }
    screen
}

/// The line printed after a choice, when the outcome warrants one. Plain
/// moves and no-ops stay silent; the re-rendered screen says everything.
fn outcome_message(outcome: &ChoiceOutcome) -> Option<String> {
    match outcome {
        ChoiceOutcome::Moved { .. } | ChoiceOutcome::Nothing => None,
        ChoiceOutcome::UnlockedAndMoved { consumed, .. } => {
            let used: Vec<&str> = consumed.iter().map(|item| item.id.as_str()).collect();
            Some(format!("The door unlocks. (used: {})", used.join(", ")))
        }
        ChoiceOutcome::DoorLocked { missing, .. } => {
            Some(format!("The door is locked. (needs: {})", missing.join(", ")))
        }
        ChoiceOutcome::PickedUp { item, .. } => Some(match &item.find_phrase {
            Some(phrase) => phrase.clone(),
            None => format!("Taken: {}.", item.id),
        }),
    }
}

/// Escape control characters so raw player input is safe to log.
fn escape_for_log(input: &str) -> String {
    input.chars().flat_map(char::escape_default).collect()
}

/// Run the prompt loop until the player quits, mirroring each mutation into
/// the store when one is attached. A persist failure is logged and shown,
/// never fatal: the in-memory session has already moved on.
#[cfg(feature = "persistence")]
pub fn run<R: ChoiceReader, W: Write>(
    session: &mut Session,
    store: Option<(&GameStore, &str)>,
    reader: &mut R,
    out: &mut W,
) -> Result<()> {
    run_loop(session, reader, out, |outcome| {
        let (store, slot) = store?;
        match store.record_outcome(slot, outcome) {
            Ok(()) => None,
            Err(err) => {
                warn!("failed to persist outcome for slot '{}': {}", slot, err);
                Some(format!("(progress not saved: {})", err))
            }
        }
    })
}

/// Run the prompt loop until the player quits.
#[cfg(not(feature = "persistence"))]
pub fn run<R: ChoiceReader, W: Write>(
    session: &mut Session,
    reader: &mut R,
    out: &mut W,
) -> Result<()> {
    run_loop(session, reader, out, |_| None)
}

fn run_loop<R: ChoiceReader, W: Write>(
    session: &mut Session,
    reader: &mut R,
    out: &mut W,
    mut record: impl FnMut(&ChoiceOutcome) -> Option<String>,
) -> Result<()> {
    loop {
        write!(out, "{}", room_screen(&session.view()))?;
        let line = match reader.read_choice("> ")? {
            PlayerInput::Quit => break,
            PlayerInput::Choice(line) => line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(QUIT_CHOICE) {
            break;
        }
        debug!("player chose '{}'", escape_for_log(line));
        let outcome = session.choose(line);
        if let Some(message) = outcome_message(&outcome) {
            writeln!(out, "{}", message)?;
        }
        if let Some(notice) = record(&outcome) {
            writeln!(out, "{}", notice)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Goodbye.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Door, Item, Room, World};

    fn test_session() -> Session {
        Session::start(
            World::from_rooms(vec![
                Room::new("room_a", "Room A", "First.")
                    .with_door(Door::to("room_b").requiring("key"))
                    .with_item(Item::key("key").with_find_phrase("A key glints in the dust."))
                    .as_starting(),
                Room::new("room_b", "Room B", "Second.").with_door(Door::to("room_a")),
            ])
            .expect("world"),
        )
    }

    fn run_scripted(session: &mut Session, inputs: &[&str]) -> String {
        let mut reader = ScriptedReader::new(inputs.iter().copied());
        let mut out = Vec::new();
        #[cfg(feature = "persistence")]
        run(session, None, &mut reader, &mut out).expect("run loop");
        #[cfg(not(feature = "persistence"))]
        run(session, &mut reader, &mut out).expect("run loop");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn screen_lists_exits_items_quit_and_inventory() {
        let session = test_session();
        let screen = room_screen(&session.view());

        assert!(screen.starts_with("ROOM A\n\nFirst.\n"));
        assert!(screen.contains("-> room_b [LOCKED] (needs: key)\n"));
        assert!(screen.contains("* key\n"));
        assert!(screen.contains("quit\n"));
        assert!(screen.ends_with("Inventory: (empty)\n"));
    }

    #[test]
    fn screen_reflects_held_items_and_sprung_locks() {
        let mut session = test_session();
        session.choose("key");
        let screen = room_screen(&session.view());
        assert!(screen.contains("Inventory: key\n"));

        session.choose("room_b");
        session.choose("room_a");
        let screen = room_screen(&session.view());
        assert!(screen.contains("-> room_b\n"), "no lock annotation remains");
    }

    #[test]
    fn scripted_run_plays_through_and_quits() {
        let mut session = test_session();
        let output = run_scripted(&mut session, &["key", "room_b"]);

        assert_eq!(session.current_room_id(), "room_b");
        assert!(output.contains("A key glints in the dust."));
        assert!(output.contains("The door unlocks. (used: key)"));
        assert!(output.contains("ROOM B"));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[test]
    fn locked_door_report_names_missing_items() {
        let mut session = test_session();
        let output = run_scripted(&mut session, &["room_b"]);

        assert!(output.contains("The door is locked. (needs: key)"));
        assert_eq!(session.current_room_id(), "room_a");
    }

    #[test]
    fn quit_literal_and_blank_lines_are_handled_by_the_loop() {
        let mut session = test_session();
        let output = run_scripted(&mut session, &["", "   ", "QUIT", "key"]);

        // The blanks re-prompt, QUIT ends the run, "key" is never consumed.
        assert!(session.inventory().is_empty());
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[test]
    fn unmatched_input_renders_silently() {
        let mut session = test_session();
        let output = run_scripted(&mut session, &["teleport"]);

        assert!(!output.contains("teleport"), "no error text for no-ops");
        assert_eq!(session.current_room_id(), "room_a");
    }

    #[test]
    fn control_characters_are_escaped_for_logs() {
        assert_eq!(escape_for_log("key\n"), "key\\n");
        assert_eq!(escape_for_log("\u{1b}[2J"), "\\u{1b}[2J");
    }
}
