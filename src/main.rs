//! fswalk - Lazy directory enumeration from the command line.
//!
//! Usage:
//!   fswalk list [PATH] [-p PATTERN] [-r]   List entries under PATH
//!   fswalk stat PATH                       Show metadata for one path
//!   fswalk size PATH                       Print the size of one path
//!   fswalk types FOLDER                    List a folder with type names
//!   fswalk --help                          Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use fswalk_cache::{FileSystemCache, FileSystemItem, ListFlags};
use fswalk_core::{DepthMode, EnumerationOptions, FileAttributes, FileMetadata};
use fswalk_scan::{enumerate, file_metadata, file_size};

#[derive(Parser)]
#[command(
    name = "fswalk",
    version,
    about = "Lazy, cross-platform directory enumeration",
    long_about = "fswalk lists directory contents through the platform's native \
                  directory APIs, one entry at a time.\n\n\
                  Set RUST_LOG or pass -v to see skipped directories."
)]
struct Cli {
    /// Log skipped directories and cache activity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List entries under a directory
    List {
        /// Directory to enumerate
        #[arg(default_value = ".")]
        path: PathBuf,

        /// File name pattern (`*` and `?` wildcards, case-insensitive)
        #[arg(short, long, default_value = "*")]
        pattern: String,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Print traversal counters to stderr when done
        #[arg(long)]
        stats: bool,
    },

    /// Show metadata for a single path
    Stat {
        /// Path to inspect
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the size of a single path in bytes
    Size {
        /// Path to inspect
        path: PathBuf,
    },

    /// List a folder the way a file dialog shows it
    Types {
        /// Folder to list
        #[arg(default_value = ".")]
        folder: PathBuf,

        /// Show files only
        #[arg(long, conflicts_with = "folders_only")]
        files_only: bool,

        /// Show folders only
        #[arg(long)]
        folders_only: bool,

        /// Include hidden entries
        #[arg(long)]
        hidden: bool,

        /// Only show files with this extension (repeatable)
        #[arg(short, long = "extension")]
        extensions: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::List {
            path,
            pattern,
            recursive,
            format,
            stats,
        } => {
            let depth = if recursive {
                DepthMode::AllDirectories
            } else {
                DepthMode::TopOnly
            };
            run_list(path, pattern, depth, format, stats)?;
        }
        Command::Stat { path, format } => {
            run_stat(&path, format)?;
        }
        Command::Size { path } => {
            let size = file_size(&path).with_context(|| format!("Cannot read {}", path.display()))?;
            println!("{}", size);
        }
        Command::Types {
            folder,
            files_only,
            folders_only,
            hidden,
            extensions,
        } => {
            let mut flags = if files_only {
                ListFlags::FILES
            } else if folders_only {
                ListFlags::FOLDERS
            } else {
                ListFlags::default()
            };
            flags.set(ListFlags::HIDDEN, hidden);
            run_types(&folder, flags, &extensions);
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("fswalk=debug,warn")
        } else {
            EnvFilter::new("fswalk=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Stream entries as they are enumerated.
fn run_list(
    path: PathBuf,
    pattern: String,
    depth: DepthMode,
    format: OutputFormat,
    show_stats: bool,
) -> Result<()> {
    let options = EnumerationOptions::builder()
        .root(path)
        .pattern(pattern)
        .depth(depth)
        .build()
        .context("Invalid enumeration options")?;

    let mut entries = enumerate(&options);

    match format {
        OutputFormat::Text => {
            for metadata in entries.by_ref() {
                println!("{}", format_entry(&metadata));
            }
        }
        OutputFormat::Json => {
            let all: Vec<FileMetadata> = entries.by_ref().collect();
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    if show_stats {
        let stats = entries.stats();
        eprintln!();
        eprintln!(
            " {} entries, {} directories opened, {} skipped, {} filtered",
            stats.entries_yielded,
            stats.directories_opened,
            stats.directories_skipped,
            stats.entries_filtered
        );
    }

    Ok(())
}

fn run_stat(path: &Path, format: OutputFormat) -> Result<()> {
    let metadata =
        file_metadata(path).with_context(|| format!("Cannot read {}", path.display()))?;

    match format {
        OutputFormat::Text => {
            println!("{}", "─".repeat(60));
            println!(" {}", metadata.path.display());
            println!("{}", "─".repeat(60));
            println!(" Kind:       {}", kind(metadata.attributes).1);
            println!(" Size:       {} ({} bytes)", format_size(metadata.size), metadata.size);
            println!(" Attributes: {}", attribute_names(metadata.attributes));
            println!(" Created:    {}", format_time(&metadata.timestamps.created));
            println!(" Accessed:   {}", format_time(&metadata.timestamps.accessed));
            println!(" Modified:   {}", format_time(&metadata.timestamps.modified));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
    }

    Ok(())
}

/// Folders first, then case-insensitive by name.
fn run_types(folder: &Path, flags: ListFlags, extensions: &[String]) {
    let cache = FileSystemCache::new();
    let allowed = extensions.iter().map(String::as_str).collect_vec();

    let items = cache
        .file_system_entries(folder, flags, &allowed)
        .into_iter()
        .sorted_by_cached_key(|item| (!item.is_dir(), item.name.to_lowercase()))
        .collect_vec();

    for item in &items {
        println!("{}", format_item(item));
    }

    if items.is_empty() {
        eprintln!("No entries in {}", folder.display());
    }
}

fn format_entry(metadata: &FileMetadata) -> String {
    format!(
        "{} {:>10}  {}  {}",
        kind(metadata.attributes).0,
        if metadata.is_dir() {
            String::from("-")
        } else {
            format_size(metadata.size)
        },
        format_time(&metadata.timestamps.modified),
        metadata.path.display()
    )
}

fn format_item(item: &FileSystemItem) -> String {
    format!(
        "{:<40} {:<24} {:>10}  {}",
        truncate(&item.name, 40),
        item.type_name,
        if item.is_dir() {
            String::new()
        } else {
            format_size(item.metadata.size)
        },
        format_time(&item.metadata.timestamps.modified)
    )
}

/// Short marker and long name for the entry's primary kind.
fn kind(attributes: FileAttributes) -> (char, &'static str) {
    let primary = attributes.primary();
    if primary == FileAttributes::REPARSE_POINT {
        ('l', "link")
    } else if primary == FileAttributes::DIRECTORY {
        ('d', "directory")
    } else if primary == FileAttributes::DEVICE {
        ('c', "device")
    } else {
        ('-', "file")
    }
}

fn attribute_names(attributes: FileAttributes) -> String {
    attributes
        .iter_names()
        .map(|(name, _)| name.to_lowercase())
        .join(", ")
}

fn format_time(time: &chrono::DateTime<chrono::Local>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}
