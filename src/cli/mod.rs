//! # CLI Module
//!
//! Command-line interface for the duplicate image resolver.
//!
//! ## Usage
//! ```bash
//! # Report duplicates without touching anything
//! imagedupe ~/Photos --action list
//!
//! # Relocate duplicates, mirroring their relative paths
//! imagedupe ~/Photos --action move --destination ~/Duplicates
//!
//! # Delete duplicates, matching re-encoded copies too
//! imagedupe ~/Photos --action delete --fingerprint perceptual
//!
//! # JSON output for scripting
//! imagedupe ~/Photos --action list --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use imagedupe::core::fingerprint::FingerprintKind;
use imagedupe::core::pipeline::{Pipeline, PipelineResult};
use imagedupe::core::resolver::{ActionExecutor, DuplicateAction, KeepPolicy, ResolveReport};
use imagedupe::error::{ImageDupeError, Result};
use imagedupe::events::{Event, EventChannel, FingerprintEvent, PipelineEvent, ResolveEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;

/// imagedupe - find duplicate images and list, move, or delete them
#[derive(Parser, Debug)]
#[command(name = "imagedupe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base directory to scan
    directory: PathBuf,

    /// What to do with the duplicates
    #[arg(short, long, value_enum)]
    action: Action,

    /// Destination root for relocated duplicates (move action)
    #[arg(short, long, required_if_eq("action", "move"))]
    destination: Option<PathBuf>,

    /// How files are compared
    #[arg(short, long, value_enum, default_value_t = Fingerprint::Exact)]
    fingerprint: Fingerprint,

    /// Which member of a duplicate group to keep
    #[arg(short, long, value_enum, default_value_t = Keep::PathOrder)]
    keep: Keep,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// List files that were skipped as unreadable or corrupt
    #[arg(long)]
    report_corrupt: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    /// Report duplicates; no filesystem mutation
    List,
    /// Relocate duplicates under the destination, preserving relative paths
    Move,
    /// Remove duplicates from disk
    Delete,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fingerprint {
    /// Byte-exact content hash (safe default)
    Exact,
    /// Perceptual image hash; matches re-encoded copies
    Perceptual,
}

impl From<Fingerprint> for FingerprintKind {
    fn from(value: Fingerprint) -> Self {
        match value {
            Fingerprint::Exact => FingerprintKind::Exact,
            Fingerprint::Perceptual => FingerprintKind::Perceptual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Keep {
    /// Keep the lexicographically first path
    PathOrder,
    /// Keep the member with the most pixels
    HighestResolution,
}

impl From<Keep> for KeepPolicy {
    fn from(value: Keep) -> Self {
        match value {
            Keep::PathOrder => KeepPolicy::PathOrder,
            Keep::HighestResolution => KeepPolicy::HighestResolution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (duplicate paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.directory.is_dir() {
        return Err(ImageDupeError::Invocation(format!(
            "base directory does not exist or is not a directory: {}",
            cli.directory.display()
        )));
    }

    let action = match cli.action {
        Action::List => DuplicateAction::List,
        Action::Move => DuplicateAction::Move {
            // clap enforces presence for the move action
            destination: cli.destination.clone().unwrap_or_default(),
        },
        Action::Delete => DuplicateAction::Delete,
    };

    let pipeline = Pipeline::builder(&cli.directory)
        .fingerprint(cli.fingerprint.into())
        .keep(cli.keep.into())
        .include_hidden(cli.include_hidden)
        .follow_symlinks(cli.follow_symlinks)
        .build();

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if cli.output == OutputFormat::Pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Render events on a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Fingerprint(FingerprintEvent::Started { total_files }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_files as u64);
                    }
                }
                Event::Fingerprint(FingerprintEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                        if verbose {
                            pb.set_message(
                                p.current_path
                                    .file_name()
                                    .unwrap_or_default()
                                    .to_string_lossy()
                                    .to_string(),
                            );
                        }
                    }
                }
                Event::Resolve(ResolveEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }

        if let Some(pb) = progress_clone {
            pb.finish_and_clear();
        }
    });

    // Detection, then the sequential action phase
    let result = pipeline.run_with_events(&sender);
    let outcome = result.map(|result| {
        let report = ActionExecutor::execute(&result.groups, &action, &sender);
        (result, report)
    });

    drop(sender);
    event_thread.join().ok();

    let (result, report) = outcome?;

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&cli, &result, &report),
        OutputFormat::Json => print_json_results(&cli, &result, &report),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    // Per-file problems are warnings; completing the run is success
    Ok(())
}

fn action_name(action: Action) -> &'static str {
    match action {
        Action::List => "list",
        Action::Move => "move",
        Action::Delete => "delete",
    }
}

fn print_pretty_results(cli: &Cli, result: &PipelineResult, report: &ResolveReport) {
    let term = Term::stderr();

    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(result.total_files).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate groups found",
        style(result.groups.len()).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate images ({})",
        style(result.duplicate_count()).cyan(),
        format_bytes(result.duplicate_size_bytes())
    ))
    .ok();

    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} files skipped with warnings",
            style(result.skipped.len()).yellow()
        ))
        .ok();
    }

    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line("  No duplicates found.").ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, group) in result.groups.iter().enumerate() {
            term.write_line(&format!(
                "  {} {} images, {}",
                style(format!("Group {}:", i + 1)).bold(),
                group.entries.len(),
                format_bytes(group.duplicate_size_bytes())
            ))
            .ok();

            for entry in &group.entries {
                let marker = if entry.path == group.canonical {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!("    {} {}", marker, entry.path.display()))
                    .ok();
            }

            term.write_line("").ok();
        }
    }

    // Action summary
    match cli.action {
        Action::List => {
            term.write_line(&format!(
                "{}",
                style("No files were modified. Review the groups above before moving or deleting.")
                    .dim()
            ))
            .ok();
        }
        Action::Move => {
            term.write_line(&format!(
                "  {} duplicates moved ({})",
                style(report.moved.len()).green(),
                format_bytes(report.bytes_affected)
            ))
            .ok();
        }
        Action::Delete => {
            term.write_line(&format!(
                "  {} duplicates deleted ({} reclaimed)",
                style(report.deleted.len()).green(),
                format_bytes(report.bytes_affected)
            ))
            .ok();
        }
    }

    if !report.skipped.is_empty() {
        term.write_line(&format!(
            "  {} duplicates skipped:",
            style(report.skipped.len()).yellow()
        ))
        .ok();
        for (path, reason) in &report.skipped {
            term.write_line(&format!("    {} {} ({})", style("!").yellow(), path.display(), reason))
                .ok();
        }
    }

    if cli.report_corrupt && !result.skipped.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Skipped files (unreadable or corrupt):").bold()
        ))
        .ok();
        for (path, reason) in &result.skipped {
            term.write_line(&format!("  - {} ({})", path.display(), reason))
                .ok();
        }
    }
}

fn print_json_results(cli: &Cli, result: &PipelineResult, report: &ResolveReport) {
    let output = serde_json::json!({
        "base": cli.directory,
        "action": action_name(cli.action),
        "total_files": result.total_files,
        "duplicate_groups": result.groups.len(),
        "duplicate_count": result.duplicate_count(),
        "duplicate_size_bytes": result.duplicate_size_bytes(),
        "duration_ms": result.duration_ms,
        "groups": result.groups.iter().map(|g| {
            serde_json::json!({
                "fingerprint": g.fingerprint.to_hex(),
                "canonical": g.canonical,
                "duplicates": g.duplicates().map(|e| &e.path).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>(),
        "moved": report.moved.iter().map(|(from, to)| {
            serde_json::json!({ "from": from, "to": to })
        }).collect::<Vec<_>>(),
        "deleted": report.deleted,
        "action_skipped": report.skipped.iter().map(|(path, reason)| {
            serde_json::json!({ "path": path, "reason": reason })
        }).collect::<Vec<_>>(),
        "corrupt": result.skipped.iter().map(|(path, reason)| {
            serde_json::json!({ "path": path, "reason": reason })
        }).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(result: &PipelineResult) {
    for group in &result.groups {
        for entry in group.duplicates() {
            println!("{}", entry.path.display());
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn move_requires_destination() {
        let result = Cli::try_parse_from(["imagedupe", "/photos", "--action", "move"]);
        assert!(result.is_err());
    }

    #[test]
    fn list_does_not_require_destination() {
        let result = Cli::try_parse_from(["imagedupe", "/photos", "--action", "list"]);
        assert!(result.is_ok());
    }

    #[test]
    fn action_is_required() {
        let result = Cli::try_parse_from(["imagedupe", "/photos"]);
        assert!(result.is_err());
    }

    #[test]
    fn fingerprint_defaults_to_exact() {
        let cli = Cli::try_parse_from(["imagedupe", "/photos", "--action", "list"]).unwrap();
        assert!(matches!(cli.fingerprint, Fingerprint::Exact));
    }

    #[test]
    fn format_bytes_humanizes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
