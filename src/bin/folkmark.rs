//! Folkmark CLI: inspect and convert folk-tale annotation documents.
//!
//! Usage:
//!   folkmark detect <file>
//!   folkmark convert <file> [--to v1|v2|v3] [--out path]
//!   folkmark sections <file>
//!   folkmark migrate-ids <file> [--out path] [--stamp-date]
//!   folkmark sync <source_dir> <name> [--root dir]

use clap::{Parser, Subcommand};
use folkmark::normalize::stale_summary_keys;
use folkmark::{
    derive_sections, migrate, schema, AnnotationDocument, AnnotationRepository, FolkmarkConfig,
    FsBlobStore, LayoutConfig, SchemaVersion,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "folkmark",
    version,
    about = "Versioned annotation documents for folk-tale texts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to config file (default: <config_dir>/folkmark/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema version of a document
    Detect {
        file: PathBuf,
    },
    /// Rewrite a document in another schema version
    Convert {
        file: PathBuf,
        /// Target version (default from config)
        #[arg(long)]
        to: Option<SchemaVersion>,
        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the text sections derived from a document's event spans
    Sections {
        file: PathBuf,
    },
    /// Assign ids to events that have none, keeping the document's version
    MigrateIds {
        file: PathBuf,
        /// Output file (default: overwrite the input)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also set a blank annotation date to today
        #[arg(long)]
        stamp_date: bool,
    },
    /// Rewrite every version of a story from its newest stored version
    Sync {
        /// Directory of source texts, relative to the root
        source_dir: String,
        /// Story file name without version suffix or extension
        name: String,
        /// Directory that holds the source and version directories
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(path: &Path) -> Result<(AnnotationDocument, SchemaVersion), String> {
    let body = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let value: Value = serde_json::from_str(&body)
        .map_err(|e| format!("'{}' is not valid JSON: {}", path.display(), e))?;
    schema::read_value(value).map_err(|e| format!("'{}': {}", path.display(), e))
}

fn emit(value: &Value, out: Option<&Path>) -> Result<(), String> {
    let mut body = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    body.push('\n');
    match out {
        Some(path) => std::fs::write(path, body)
            .map_err(|e| format!("cannot write '{}': {}", path.display(), e)),
        None => {
            print!("{}", body);
            Ok(())
        }
    }
}

fn cmd_detect(file: &Path) -> i32 {
    match read_document(file) {
        Ok((_, version)) => {
            println!("{}", version);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_convert(file: &Path, to: SchemaVersion, out: Option<&Path>) -> i32 {
    let (doc, from) = match read_document(file) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    tracing::info!(%from, %to, "converting document");
    match emit(schema::write(&doc, to).as_value(), out) {
        Ok(()) => {
            if let Some(path) = out {
                eprintln!("Wrote {} ({} -> {})", path.display(), from, to);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_sections(file: &Path) -> i32 {
    let (doc, _) = match read_document(file) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let sections = derive_sections(&doc.narrative_events, &doc.source.text);
    if sections.is_empty() {
        println!("No sections (no event has a usable text span).");
    } else {
        println!(
            "{:<14}  {:<12}  {:>6}  {}",
            "KEY", "EVENTS", "CHARS", "SUMMARY"
        );
        println!("{}", "-".repeat(72));
    }
    for section in &sections {
        let key = section.key();
        println!(
            "{:<14}  {:<12}  {:>6}  {}",
            key,
            section.display_label,
            section.char_len(),
            doc.summaries.for_section(&key).unwrap_or("-")
        );
    }

    let stale = stale_summary_keys(&sections, &doc.summaries);
    if !stale.is_empty() {
        println!();
        println!("Summaries without a matching section: {}", stale.join(", "));
    }
    let unknown = doc.unknown_participants();
    if !unknown.is_empty() {
        println!();
        println!(
            "Participants without a character profile: {}",
            unknown.join(", ")
        );
    }
    0
}

fn cmd_migrate_ids(file: &Path, out: Option<&Path>, stamp_date: bool) -> i32 {
    let (mut doc, version) = match read_document(file) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let assigned = migrate::backfill_event_ids(&mut doc);
    let today = chrono::Local::now().date_naive();
    let stamped = stamp_date && migrate::stamp_missing_date(&mut doc, today);
    if assigned == 0 && !stamped && out.is_none() {
        println!("All events already have ids.");
        return 0;
    }
    let target = out.unwrap_or(file);
    match emit(schema::write(&doc, version).as_value(), Some(target)) {
        Ok(()) => {
            println!(
                "Assigned {} event id(s), wrote {}",
                assigned,
                target.display()
            );
            if stamped {
                println!("Stamped annotation date {}", doc.metadata.date_annotated);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_sync(root: &Path, source_dir: &str, name: &str, layout: LayoutConfig) -> i32 {
    let repo = AnnotationRepository::new(Arc::new(FsBlobStore::new(root)))
        .with_layout(layout);
    let (doc, version) = match repo.load_latest(source_dir, name) {
        Ok(Some(found)) => found,
        Ok(None) => {
            eprintln!(
                "Error: no stored document for '{}' under {}",
                name,
                root.display()
            );
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    tracing::info!(name, %version, "syncing versions from newest document");
    match repo.save_all_versions(source_dir, name, &doc) {
        Ok(written) => {
            println!("Synced from {}:", version);
            for path in written {
                println!("  {}", path);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.unwrap_or_else(FolkmarkConfig::default_path);
    let config = match FolkmarkConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Detect { file } => cmd_detect(&file),
        Commands::Convert { file, to, out } => {
            cmd_convert(&file, to.unwrap_or(config.default_version), out.as_deref())
        }
        Commands::Sections { file } => cmd_sections(&file),
        Commands::MigrateIds {
            file,
            out,
            stamp_date,
        } => cmd_migrate_ids(&file, out.as_deref(), stamp_date),
        Commands::Sync {
            source_dir,
            name,
            root,
        } => cmd_sync(&root, &source_dir, &name, config.layout),
    };
    std::process::exit(code);
}
