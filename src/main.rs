//! Binary entrypoint for the roomkey CLI.
//!
//! Commands:
//! - `play [--slot <name>]` - load the world and start the prompt loop
//! - `init` - create a starter `roomkey.toml` and scaffold a sample world
//! - `validate` - load the world from definition files and report problems
//! - `status [--slot <name>]` - print the persisted session summary
//!
//! See the library crate docs for module-level details: `roomkey::`.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use roomkey::config::Config;
use roomkey::ui;
use roomkey::world::{load_world, ExitDefinition, ItemDefinition, RoomDefinition, Session};

#[derive(Parser)]
#[command(name = "roomkey")]
#[command(about = "A tiny text-adventure engine: rooms, one-way doors, and keys")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "roomkey.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the adventure
    Play {
        /// Session slot to resume or create (needs a [storage] section)
        #[arg(short, long)]
        slot: Option<String>,
    },
    /// Initialize a configuration file and a sample world
    Init,
    /// Load the world from its definition files and report problems
    Validate,
    /// Show the persisted session summary
    Status {
        /// Session slot to inspect
        #[arg(short, long)]
        slot: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init, which writes
    // the default file later).
    let pre_config = if matches!(cli.command, Commands::Init) {
        None
    } else {
        Config::load(&cli.config).ok()
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Play { slot } => play(pre_config, &cli.config, slot),
        Commands::Init => init(&cli.config),
        Commands::Validate => validate(pre_config, &cli.config),
        Commands::Status { slot } => status(pre_config, &cli.config, slot),
    }
}

/// Reuse the early-loaded config, or load it now so the failure surfaces
/// with its real cause.
fn require_config(pre_config: Option<Config>, path: &str) -> Result<Config> {
    match pre_config {
        Some(config) => Ok(config),
        None => Config::load(path),
    }
}

fn play(pre_config: Option<Config>, config_path: &str, slot: Option<String>) -> Result<()> {
    let config = require_config(pre_config, config_path)?;
    info!("Starting roomkey v{}", env!("CARGO_PKG_VERSION"));

    let world = load_world(&config.world.dir, config.world.format)?;
    info!("Loaded {} rooms from {}", world.room_count(), config.world.dir);
    for problem in world.unsatisfiable_requirements() {
        warn!(
            "door '{}' -> '{}' requires '{}', but no room contains it",
            problem.room, problem.destination, problem.item
        );
    }

    let mut reader = ui::LinePrompt::new()?;
    let mut out = std::io::stdout();

    #[cfg(feature = "persistence")]
    {
        use roomkey::storage::GameStore;

        if let Some(storage) = &config.storage {
            let store = GameStore::open(&storage.path)?;
            let slot = slot.unwrap_or_else(|| storage.slot.clone());
            let imported = store.import_world_if_empty(&world)?;
            if imported > 0 {
                info!("Imported {} rooms into {}", imported, storage.path);
            }
            let mut session = if store.has_session(&slot)? {
                info!("Resuming session slot '{}'", slot);
                store.restore(&slot)?
            } else {
                // The store's copy of the world is canonical once imported;
                // it carries lock state and item moves from earlier slots.
                let world = if imported > 0 { world } else { store.restore_world()? };
                store.create_session(&slot, &world)?;
                info!("Created session slot '{}'", slot);
                Session::start(world)
            };
            return ui::run(&mut session, Some((&store, slot.as_str())), &mut reader, &mut out);
        }
        if slot.is_some() {
            warn!("--slot given but no [storage] section is configured; playing in memory");
        }
        let mut session = Session::start(world);
        ui::run(&mut session, None, &mut reader, &mut out)
    }

    #[cfg(not(feature = "persistence"))]
    {
        if slot.is_some() {
            warn!("--slot requires the 'persistence' feature; playing in memory");
        }
        let mut session = Session::start(world);
        ui::run(&mut session, &mut reader, &mut out)
    }
}

fn init(config_path: &str) -> Result<()> {
    info!("Initializing a new roomkey setup");
    let config = Config::create_default(config_path)?;
    info!("Configuration file created at {}", config_path);
    scaffold_sample_world(&config.world.dir)?;
    info!(
        "Done. Try: roomkey validate && roomkey play --config {}",
        config_path
    );
    Ok(())
}

fn validate(pre_config: Option<Config>, config_path: &str) -> Result<()> {
    let config = require_config(pre_config, config_path)?;
    let world = load_world(&config.world.dir, config.world.format)?;

    let door_count: usize = world.rooms().map(|room| room.doors.len()).sum();
    let item_count: usize = world.rooms().map(|room| room.items.len()).sum();
    println!("World at {} is valid.", config.world.dir);
    println!("  rooms:         {}", world.room_count());
    println!("  doors:         {}", door_count);
    println!("  items:         {}", item_count);
    println!("  starting room: {}", world.starting_room());

    for problem in world.unsatisfiable_requirements() {
        warn!(
            "door '{}' -> '{}' requires '{}', but no room contains it",
            problem.room, problem.destination, problem.item
        );
    }
    Ok(())
}

#[cfg(feature = "persistence")]
fn status(pre_config: Option<Config>, config_path: &str, slot: Option<String>) -> Result<()> {
    use roomkey::storage::GameStore;

    let config = require_config(pre_config, config_path)?;
    let storage = config
        .storage
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no [storage] section configured; nothing to report"))?;
    let store = GameStore::open(&storage.path)?;
    let slot = slot.unwrap_or_else(|| storage.slot.clone());

    let record = store.session(&slot)?;
    let items = store.session_items(&slot)?;
    let names: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    println!("Session '{}'", record.slot);
    println!("  current room: {}", record.current_room);
    println!(
        "  inventory:    {}",
        if names.is_empty() {
            "(empty)".to_string()
        } else {
            names.join(", ")
        }
    );
    println!(
        "  saved at:     {}",
        record.saved_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!("  world rooms:  {}", store.room_count()?);
    Ok(())
}

#[cfg(not(feature = "persistence"))]
fn status(_pre_config: Option<Config>, _config_path: &str, _slot: Option<String>) -> Result<()> {
    eprintln!("Error: `status` requires the 'persistence' feature.");
    eprintln!("Rebuild with: cargo build --features persistence");
    std::process::exit(2);
}

/// Scaffold a three-room sample world: a foyer with a key under the mat, an
/// open library, and a cellar behind a locked door. Existing files are left
/// alone so re-running `init` never destroys authored rooms.
fn scaffold_sample_world(dir: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create world directory {}", dir))?;
    for (name, definition) in sample_rooms() {
        let path = std::path::Path::new(dir).join(name);
        if path.exists() {
            warn!("{} already exists; leaving it alone", path.display());
            continue;
        }
        let text = toml::to_string_pretty(&definition)
            .with_context(|| format!("failed to serialize {}", path.display()))?;
        std::fs::write(&path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn sample_rooms() -> Vec<(&'static str, RoomDefinition)> {
    let foyer = RoomDefinition {
        link_id: "foyer".to_string(),
        title: "The Foyer".to_string(),
        description: "Dust sheets cover the furniture. A cold draft slips up \
                      from under the cellar door."
            .to_string(),
        starting: true,
        exits: vec![
            ExitDefinition {
                link_id: "library".to_string(),
                locked: false,
                requires: Vec::new(),
            },
            ExitDefinition {
                link_id: "cellar".to_string(),
                locked: true,
                requires: vec!["brass key".to_string()],
            },
        ],
        items: vec![ItemDefinition {
            id: "brass key".to_string(),
            kind: "key".to_string(),
            find_phrase: Some("A brass key glints under the doormat.".to_string()),
        }],
    };
    let library = RoomDefinition {
        link_id: "library".to_string(),
        title: "The Library".to_string(),
        description: "Shelves sag under unread books. The door back to the \
                      foyer stands open."
            .to_string(),
        starting: false,
        exits: vec![ExitDefinition {
            link_id: "foyer".to_string(),
            locked: false,
            requires: Vec::new(),
        }],
        items: Vec::new(),
    };
    let cellar = RoomDefinition {
        link_id: "cellar".to_string(),
        title: "The Cellar".to_string(),
        description: "Stone steps end in darkness. Whatever lives down here \
                      does not keep a spare key."
            .to_string(),
        starting: false,
        exits: Vec::new(),
        items: Vec::new(),
    };
    vec![
        ("foyer.room.toml", foyer),
        ("library.room.toml", library),
        ("cellar.room.toml", cellar),
    ]
}

/// Configure env_logger with a UTC timestamp format. `-v` flags override the
/// configured level; an optional log file gets every line, echoed to the
/// console only when stdout is a TTY.
fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;

    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|cfg| cfg.logging.file.clone());
    match log_file
        .and_then(|file| std::fs::OpenOptions::new().create(true).append(true).open(file).ok())
    {
        Some(file) => {
            let sink = std::sync::Arc::new(std::sync::Mutex::new(file));
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = sink.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
