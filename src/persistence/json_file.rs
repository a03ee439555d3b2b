use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use serde_json::{from_reader, from_str, to_string};
use thiserror::Error;
use crate::domain::commands::Command;
use crate::domain::ExternalId;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a command log. Each line holds a JSON array of commands.
pub fn read_commands<P: AsRef<Path>>(path: P) -> Result<Vec<Command>, PersistenceError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut commands = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: Vec<Command> = from_str(&line)?;
        commands.extend(parsed);
    }

    Ok(commands)
}

/// Replaces the log at `path`. The commands go to a sibling temp file first,
/// so a failed write leaves the previous log in place.
pub fn write_commands<P: AsRef<Path>>(path: P, commands: &[Command]) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let json = to_string(commands)?;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Reads a JSON object of API key to external id.
pub fn read_api_keys<P: AsRef<Path>>(path: P) -> Result<HashMap<String, ExternalId>, PersistenceError> {
    let file = File::open(path)?;
    Ok(from_reader(BufReader::new(file))?)
}
