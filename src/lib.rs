//! # Roomkey - A Tiny Text-Adventure Engine
//!
//! Rooms connected by one-directional doors, pickupable items, and locks that
//! consume keys. Worlds are authored as plain definition files, loaded into an
//! in-memory room graph at startup, and played through a line-oriented
//! terminal prompt. An optional sled-backed store persists world topology and
//! per-slot session state across runs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomkey::world::{load_world, Session, WorldFormat};
//!
//! fn main() -> anyhow::Result<()> {
//!     let world = load_world("rooms", WorldFormat::Toml)?;
//!     let mut session = Session::start(world);
//!
//!     // Pick up the key, then walk through the door it opens.
//!     session.choose("brass key");
//!     session.choose("cellar");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`world`] - The core: definition parsing, the validated room graph,
//!   inventory, and session state
//! - [`ui`] - Terminal rendering and the interactive play loop
//! - [`storage`] - Optional sled persistence (behind the `persistence`
//!   feature, on by default)
//! - [`config`] - TOML configuration for the binary

pub mod config;
#[cfg(feature = "persistence")]
pub mod storage;
pub mod ui;
pub mod world;
