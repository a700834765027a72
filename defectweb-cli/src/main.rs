//! defectweb CLI - render a defect tracker XML export as browsable HTML
//!
//! Export from the tracker with "Export file attachments" checked and
//! "Export formatting and images" unchecked, unzip the archive, then run
//! `defectweb <dir>` and open `<dir>/index.html` in a browser.

#![deny(warnings)]

use clap::Parser;
use defectweb_core::{generate_report, ReportOptions};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "defectweb")]
#[command(about = "Generate an HTML index and per-defect pages from an unzipped XML export")]
#[command(version)]
struct Cli {
    /// Path to the unzipped XML export
    export_dir: PathBuf,

    /// Leave attachments under their stored names
    #[arg(long)]
    no_rename: bool,

    /// Also write the extracted defects to defects.json
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ReportOptions {
        rename_attachments: !cli.no_rename,
        json: cli.json,
    };
    let summary = generate_report(&cli.export_dir, &options)?;

    if summary.renames.renamed > 0 {
        println!("Successfully renamed {} files", summary.renames.renamed);
    }
    if summary.renames.failed > 0 {
        eprintln!(
            "warning: {} attachment(s) could not be renamed",
            summary.renames.failed
        );
    }
    if !summary.skipped.is_empty() {
        eprintln!(
            "warning: skipped {} defect(s) without a usable id",
            summary.skipped.len()
        );
    }
    if summary.pages_written > 0 {
        println!(
            "Successfully generated {} defect pages",
            summary.pages_written
        );
    }
    println!("Successfully generated index page");
    if let Some(json_path) = &summary.json_path {
        println!("Wrote {}", json_path.display());
    }
    println!("Open your browser at {}", summary.index_path.display());

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
