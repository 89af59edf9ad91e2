//! JSON backup/restore for a user's study data.
//! Saves errors and notions (with their review state) to a file and loads
//! them back.

use crate::models::{ErrorEntry, Notion};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};

#[derive(Serialize, Deserialize)]
pub struct StudyBackup {
    pub user_id: String,
    pub errors: Vec<ErrorEntry>,
    pub notions: Vec<Notion>,
}

/// Writes a backup to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_backup_to_path(
    backup: &StudyBackup,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_string = serde_json::to_string_pretty(backup)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Reads a backup from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_backup(filename: &str) -> Result<StudyBackup, Box<dyn std::error::Error>> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let backup: StudyBackup = serde_json::from_str(&contents)?;
    Ok(backup)
}
