//! defectweb core library - static HTML reports from defect tracker XML exports

#![deny(warnings)]

// Global invariants enforced in this crate:
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Each output file is written and closed before the next is opened
// - Identical input yields byte-for-byte identical pages

pub mod attachments;
pub mod defect;
pub mod extract;
pub mod fields;
pub mod html;
pub mod manifest;
pub mod report;

pub use attachments::{resolve_attachments, RenameOutcome};
pub use defect::{Attachment, Defect, Event, SeverityBucket, SeverityCounts};
pub use extract::{extract_defects, Extraction, SkipReason, SkippedDefect};
pub use html::{render_defect_page, render_index_page};
pub use report::render_json;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for one report run
pub struct ReportOptions {
    /// Rename stored attachments to their original names
    pub rename_attachments: bool,
    /// Also write the extracted defects as JSON
    pub json: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            rename_attachments: true,
            json: false,
        }
    }
}

/// What a run produced
#[derive(Debug)]
pub struct RunSummary {
    pub renames: RenameOutcome,
    pub pages_written: usize,
    pub skipped: Vec<SkippedDefect>,
    pub severity: SeverityCounts,
    pub index_path: PathBuf,
    pub json_path: Option<PathBuf>,
}

/// Build the full report for the export directory at `root`
pub fn generate_report(root: &Path, options: &ReportOptions) -> Result<RunSummary> {
    let text = manifest::read_manifest(root)?;
    let doc = manifest::parse_manifest(&text)
        .with_context(|| format!("in {}", manifest::manifest_path(root).display()))?;

    let renames = if options.rename_attachments {
        resolve_attachments(&doc, root)
    } else {
        RenameOutcome::default()
    };
    info!(
        renamed = renames.renamed,
        missing_source = renames.missing_source,
        target_exists = renames.target_exists,
        "attachments resolved"
    );

    let Extraction { defects, skipped } = extract_defects(&doc);
    for skip in &skipped {
        warn!("skipping defect: {}", skip);
    }

    for defect in &defects {
        let path = root.join(defect.page_name());
        debug!("writing {}", path.display());
        write_page(&path, &render_defect_page(defect))?;
    }

    let index_path = manifest::index_path(root);
    write_page(&index_path, &render_index_page(&defects))?;

    let json_path = if options.json {
        let path = report::json_path(root);
        write_page(&path, &render_json(&defects))?;
        Some(path)
    } else {
        None
    };

    Ok(RunSummary {
        renames,
        pages_written: defects.len(),
        skipped,
        severity: SeverityCounts::from_defects(&defects),
        index_path,
        json_path,
    })
}

fn write_page(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))
}
