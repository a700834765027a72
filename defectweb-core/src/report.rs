//! Machine-readable export of the defect model
//!
//! Global invariants enforced:
//! - Output order is the extraction order
//! - Absent fields are omitted, not written as null

use crate::defect::Defect;
use std::path::{Path, PathBuf};

/// JSON export file name inside an export directory
pub const JSON_FILE: &str = "defects.json";

pub fn json_path(root: &Path) -> PathBuf {
    root.join(JSON_FILE)
}

/// Render defects as a pretty-printed JSON array
pub fn render_json(defects: &[Defect]) -> String {
    serde_json::to_string_pretty(defects).unwrap_or_else(|_| "[]".to_string())
}
