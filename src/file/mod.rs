//! Project documents on the local filesystem.
//!
//! The persistence contract is deliberately small: write a document, read
//! a document. A failed read or parse returns an error and touches
//! nothing, so callers can keep their in-memory state.

use std::fs;
use std::path::Path;

use crate::model::Project;

/// Serialize and write the document. Returns the JSON that was written so
/// callers can track dirty state against it.
pub fn write_project(project: &Project, path: &Path) -> Result<String, String> {
    let json = project
        .to_json()
        .map_err(|e| format!("Serialize error: {}", e))?;
    fs::write(path, &json).map_err(|e| format!("Write error: {}", e))?;
    Ok(json)
}

pub fn read_project(path: &Path) -> Result<Project, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("Read error: {}", e))?;
    Project::from_json(&json).map_err(|e| format!("Parse error: {}", e))
}
