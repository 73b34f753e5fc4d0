use anyhow::{Context, Result};
use eventide_model::EntitySchema;
use eventide_types::Event;
use std::{fs, path::Path};
use tracing::info;

/// Reads a JSON array of events. A missing file is an empty log.
pub fn load_event_log(path: &Path) -> Result<Vec<Event>> {
    if !path.exists() {
        info!("No event log at {:?}, starting empty", path);
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event log {}", path.display()))?;
    let events: Vec<Event> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to decode event log {}", path.display()))?;
    info!("Loaded {} events from {:?}", events.len(), path);
    Ok(events)
}

/// Writes the event log as pretty JSON, replacing the file atomically.
pub fn write_event_log(path: &Path, events: &[Event]) -> Result<()> {
    let json = serde_json::to_string_pretty(events).context("Failed to encode event log")?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move event log into {}", path.display()))?;
    info!("Persisted {} events to {:?}", events.len(), path);
    Ok(())
}

/// The log a server starts from.
///
/// An existing `persist` file already holds every event of earlier runs,
/// seed events included, so it wins over `seed`. Without one the seed is
/// used, and with neither the log starts empty.
pub fn initial_event_log(seed: Option<&Path>, persist: Option<&Path>) -> Result<Vec<Event>> {
    if let Some(path) = persist.filter(|path| path.exists()) {
        if seed.is_some() {
            info!("Resuming from {:?}, seed ignored", path);
        }
        return load_event_log(path);
    }
    match seed {
        Some(path) => load_event_log(path),
        None => Ok(Vec::new()),
    }
}

/// Reads an [`EntitySchema`] from a JSON file.
pub fn load_schema(path: &Path) -> Result<EntitySchema> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to decode schema {}", path.display()))
}
