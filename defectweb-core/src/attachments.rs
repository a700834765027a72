//! Attachment renaming
//!
//! The exporter stores attachments under opaque names (`filespec`). This
//! module renames them back to their original names (`name`) in place.
//!
//! Global invariants enforced:
//! - Idempotent: a second run renames nothing
//! - Existing files are never overwritten
//! - A failed rename is reported, never fatal

use crate::manifest::elements;
use roxmltree::Document;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Counts from one resolver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOutcome {
    pub renamed: usize,
    /// Storage file absent (already renamed, or never exported)
    pub missing_source: usize,
    /// Original name already present on disk
    pub target_exists: usize,
    /// Attribute absent or path escaping the export root
    pub rejected: usize,
    /// The filesystem refused the rename
    pub failed: usize,
}

/// Storage name to original name for every referenced attachment
///
/// Paths are relative to the export root. A later reference to the same
/// storage file replaces an earlier one.
pub fn collect_renames(doc: &Document<'_>) -> (BTreeMap<PathBuf, PathBuf>, usize) {
    let mut renames = BTreeMap::new();
    let mut rejected = 0;

    let attachments = elements(doc.root(), "defect")
        .flat_map(|defect| elements(defect, "reported-by-record"))
        .flat_map(|record| elements(record, "attachment"));

    for attachment in attachments {
        let storage = attachment.attribute("filespec").and_then(relative_path);
        let original = attachment.attribute("name").and_then(relative_path);
        match (storage, original) {
            (Some(storage), Some(original)) => {
                renames.insert(storage, original);
            }
            _ => {
                warn!(
                    "skipping attachment with unusable paths: filespec={:?} name={:?}",
                    attachment.attribute("filespec"),
                    attachment.attribute("name")
                );
                rejected += 1;
            }
        }
    }

    (renames, rejected)
}

/// Rename every stored attachment under `root` to its original name
pub fn resolve_attachments(doc: &Document<'_>, root: &Path) -> RenameOutcome {
    let (renames, rejected) = collect_renames(doc);
    let mut outcome = RenameOutcome {
        rejected,
        ..RenameOutcome::default()
    };

    for (storage, original) in &renames {
        let from = root.join(storage);
        let to = root.join(original);

        if !from.exists() {
            debug!("{} doesn't exist - skipping", from.display());
            outcome.missing_source += 1;
            continue;
        }
        if to.exists() {
            debug!(
                "{} already exists - skipping rename from {}",
                to.display(),
                from.display()
            );
            outcome.target_exists += 1;
            continue;
        }

        match std::fs::rename(&from, &to) {
            Ok(()) => outcome.renamed += 1,
            Err(e) => {
                warn!(
                    "failed to rename {} to {}: {}",
                    from.display(),
                    to.display(),
                    e
                );
                outcome.failed += 1;
            }
        }
    }

    outcome
}

/// Accept only non-empty relative paths that stay inside the export root
fn relative_path(raw: &str) -> Option<PathBuf> {
    let path = Path::new(raw);
    let mut components = path.components().peekable();
    components.peek()?;
    if components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
        Some(path.to_path_buf())
    } else {
        None
    }
}
