//! Pagesmith Application
//!
//! Command-line harness that replays scripted editor sessions against the
//! core canvas engine and prints every callback as a JSON line.

mod replay;

pub use replay::{AppError, AppResult, PayloadRef, Session, Step, parse_script, run};

use pagesmith_core::EditorConfig;
use pagesmith_core::storage::{KeyValueStore, MemoryStore, create_default_store};
use std::io::Write;
use std::path::Path;

/// Load the config file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> AppResult<EditorConfig> {
    match path {
        Some(path) => Ok(EditorConfig::load(path)?),
        None => Ok(EditorConfig::default()),
    }
}

/// The platform store, or an in-memory one when it cannot be opened.
pub fn open_store() -> Box<dyn KeyValueStore> {
    match create_default_store() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Falling back to in-memory storage: {}", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Replay the session at `session` with an optional config file.
pub fn replay_file(session: &Path, config: Option<&Path>, out: &mut dyn Write) -> AppResult<()> {
    let script = std::fs::read_to_string(session).map_err(|source| AppError::Read {
        path: session.display().to_string(),
        source,
    })?;
    let steps = parse_script(&script)?;
    let config = load_config(config)?;
    log::info!("Replaying {} steps from {}", steps.len(), session.display());
    run(&steps, config, open_store(), out)
}
